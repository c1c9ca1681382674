//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async code in the robot core and the face MUST NOT block.
//! **Required**: `tokio::fs`, `tokio::net`, `tokio::process`, async `reqwest`.
//! Blocking file access is fine in plain functions that run before the
//! runtime is busy (config loading, log file setup).
//!
//! The render path gets a stricter rule: it runs once per tick on the driver
//! task and must never wait on anything.

use architectural_enforcement::{
    code_part, is_in_async_context, production_sources, SourceFile, RENDER_PATH_FILES,
};

/// Test that production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_production_code() {
    let violations: Vec<String> = production_sources()
        .iter()
        .flat_map(find_blocking_io_violations)
        .collect();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n❌ FORBIDDEN blocking I/O:");
        eprintln!("  - std::fs::* inside async functions or blocks");
        eprintln!("  - std::net::TcpStream, std::net::TcpListener");
        eprintln!("  - std::process::Command (use tokio::process::Command)");
        eprintln!("  - std::io::Write::write_all and friends (use tokio::fs / AsyncWriteExt)");
        eprintln!("  - reqwest::blocking::*");
        eprintln!("\n✅ ACCEPTABLE blocking I/O:");
        eprintln!("  - Non-async functions (config loading, logging setup)");
        eprintln!("  - Test code");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Test that nothing in the render path awaits or talks to the outside world
#[test]
fn test_render_path_never_waits() {
    let mut violations = Vec::new();

    for path in RENDER_PATH_FILES {
        let file = SourceFile::load(std::path::Path::new(path));
        for (idx, line) in file.lines.iter().enumerate() {
            let code = code_part(line);
            if code.contains(".await") || code.contains("async fn") {
                violations.push(file.describe(idx, "Async code in render path"));
            }
            if code.contains("reqwest") || code.contains("tokio::process") {
                violations.push(file.describe(idx, "External I/O in render path"));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "\nThe render path must stay synchronous:\n  {}",
        violations.join("\n  ")
    );
}

fn find_blocking_io_violations(file: &SourceFile) -> Vec<String> {
    let mut violations = Vec::new();

    for (idx, line) in file.lines.iter().enumerate() {
        let code = code_part(line);
        if code.trim_start().starts_with("use ") {
            continue;
        }

        if let Some(what) = always_blocking(code) {
            violations.push(file.describe(idx, what));
        }

        if is_blocking_fs(code) && is_in_async_context(&file.lines, idx) {
            violations.push(file.describe(idx, "Blocking file I/O in async code"));
        }
    }

    violations
}

/// Calls that block no matter where they appear
fn always_blocking(code: &str) -> Option<&'static str> {
    if code.contains("std::net::") {
        Some("Blocking network I/O")
    } else if code.contains("std::process::Command") {
        Some("Blocking process I/O")
    } else if code.contains("reqwest::blocking") {
        Some("Blocking HTTP client")
    } else if is_sync_stream_io(code) {
        Some("Blocking std::io read/write")
    } else {
        None
    }
}

/// `std::io::Read`/`Write` calls; the tokio equivalents are awaited
fn is_sync_stream_io(code: &str) -> bool {
    let io_call = [".write_all(", ".read_to_end(", ".read_exact(", ".flush()"]
        .iter()
        .any(|call| code.contains(call));
    io_call && !code.contains(".await")
}

fn is_blocking_fs(code: &str) -> bool {
    code.contains("std::fs::") || code.contains(" fs::") || code.contains("(fs::")
}

#[test]
fn test_blocking_detection() {
    assert_eq!(
        always_blocking("let out = std::process::Command::new(\"mpg123\").output();"),
        Some("Blocking process I/O")
    );
    assert_eq!(
        always_blocking("let body = reqwest::blocking::get(url)?;"),
        Some("Blocking HTTP client")
    );
    assert_eq!(
        always_blocking("let mut child = tokio::process::Command::new(program);"),
        None
    );
    assert_eq!(
        always_blocking("        scratch.write_all(audio)?;"),
        Some("Blocking std::io read/write")
    );
    assert_eq!(always_blocking("    file.write_all(&bytes).await?;"), None);
    assert!(is_blocking_fs("    let text = std::fs::read_to_string(path)?;"));
    assert!(is_blocking_fs("    fs::create_dir_all(parent)?;"));
    assert!(!is_blocking_fs("    tokio::fs::create_dir_all(&dir).await?;"));
}
