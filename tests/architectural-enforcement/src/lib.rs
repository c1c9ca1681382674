//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code (ticks come from `tokio::time::interval`)
//! - No blocking I/O inside async code
//! - The render path never waits on I/O
//!
//! The helpers here read production sources of the workspace crates. Anything
//! from the first `#[cfg(test)]` line of a file onwards is test code and is
//! not scanned.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["robot/core/src", "face/src"];

/// Files that make up the per-frame render path
pub const RENDER_PATH_FILES: &[&str] = &[
    "robot/core/src/animation.rs",
    "robot/core/src/display.rs",
    "face/src/animator.rs",
    "face/src/scene.rs",
    "face/src/surface.rs",
    "face/src/theme.rs",
];

/// One production source file
#[derive(Debug)]
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Lines before the first `#[cfg(test)]`
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Read `path` (relative to the workspace root)
    ///
    /// # Panics
    ///
    /// If the file cannot be read.
    pub fn load(relative: &Path) -> Self {
        let full = workspace_root().join(relative);
        let content = fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", full.display()));
        Self {
            path: relative.to_path_buf(),
            lines: production_lines(&content),
        }
    }

    /// `path:line - text` for a violation report
    pub fn describe(&self, idx: usize, what: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            idx + 1,
            what,
            self.lines[idx].trim()
        )
    }
}

/// The workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under the production directories
///
/// # Panics
///
/// If a production directory is missing; a renamed crate must not make the
/// checks pass silently.
pub fn production_sources() -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        assert!(path.is_dir(), "production directory {dir} not found");

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                let relative = entry
                    .path()
                    .strip_prefix(&root)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                files.push(SourceFile::load(&relative));
            }
        }
    }

    files
}

/// Lines of `content` up to the first `#[cfg(test)]`
pub fn production_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(str::to_string)
        .collect()
}

/// The code part of a line (comments stripped)
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether a trimmed line opens a function
fn is_fn_signature(line: &str) -> bool {
    let mut rest = line;
    for prefix in ["pub(crate) ", "pub(super) ", "pub "] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }
    rest.starts_with("fn ") || rest.starts_with("async fn ") || rest.starts_with("const fn ")
}

/// Whether line `idx` runs in async context
///
/// Scans backwards for the nearest enclosing `fn` signature or async block.
pub fn is_in_async_context(lines: &[String], idx: usize) -> bool {
    for line in lines[..=idx].iter().rev() {
        let line = line.trim();
        if line.contains("async move") || line.contains("async {") {
            return true;
        }
        if is_fn_signature(line) {
            return line.contains("async fn ");
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(code: &[&str]) -> Vec<String> {
        code.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n#[cfg(test)]\nmod tests {}\n";
        assert_eq!(production_lines(content), vec!["fn a() {}".to_string()]);
    }

    #[test]
    fn test_async_fn_detection() {
        let code = lines(&[
            "pub async fn speak(&self) {",
            "    let bytes = std::fs::read(path)?;",
            "}",
        ]);
        assert!(is_in_async_context(&code, 1));
    }

    #[test]
    fn test_sync_fn_detection() {
        let code = lines(&[
            "pub fn load_config() -> Result<(), Error> {",
            "    let text = std::fs::read_to_string(path)?;",
            "}",
        ]);
        assert!(!is_in_async_context(&code, 1));
    }

    #[test]
    fn test_async_block_in_sync_fn() {
        let code = lines(&[
            "pub fn spawn_worker() -> JoinHandle<()> {",
            "    tokio::spawn(async move {",
            "        let text = std::fs::read_to_string(path);",
            "    })",
            "}",
        ]);
        assert!(is_in_async_context(&code, 2));
    }

    #[test]
    fn test_code_part_drops_comments() {
        assert_eq!(code_part("let a = 1; // sleep(1)"), "let a = 1; ");
    }

    #[test]
    fn test_workspace_root_holds_the_crates() {
        for dir in PRODUCTION_DIRS {
            assert!(workspace_root().join(dir).is_dir(), "{dir} missing");
        }
    }
}
