//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the robot core and the face MUST NOT call
//! sleep methods. Frames are paced by `tokio::time::interval` in the tick
//! driver; speech and webhooks wait on I/O.
//! **Exceptions**: test code (everything after `#[cfg(test)]`, and the
//! `tests/` directories, which are not scanned).

use architectural_enforcement::{code_part, production_sources, SourceFile};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations: Vec<String> = production_sources()
        .iter()
        .flat_map(find_sleep_violations)
        .collect();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - tokio::time::interval() for periodic work (the tick driver)");
        eprintln!("  - tokio::time::timeout() around I/O");
        eprintln!("  - Test code");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");
        eprintln!("  - std::thread::sleep anywhere near the runtime");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_sleep_violations(file: &SourceFile) -> Vec<String> {
    file.lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_sleep_call(code_part(line)))
        .map(|(idx, _)| file.describe(idx, "Sleep call"))
        .collect()
}

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("    std::thread::sleep(FRAME);"));
    assert!(is_sleep_call("    tokio::time::sleep_until(deadline).await;"));
    assert!(!is_sleep_call("    let mut ticker = tokio::time::interval(frame);"));
    assert!(!is_sleep_call(code_part("    ticker.tick().await; // no sleep() here")));
}
