//! Shared test utilities for the docs-wiki test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let tree = scan_directory(tmp.path(), "docs", &md()).unwrap();
//!
//! let (_, warnings) = count_warnings(|| rewrite_url("../../x.md", "docs", &ctx));
//! assert_eq!(warnings, 1);
//! ```

use crate::git::CommandRunner;
use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The default page extension list.
pub fn md() -> Vec<String> {
    vec![".md".to_string()]
}

// =========================================================================
// Warning capture
// =========================================================================

struct WarningCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` and count the `WARN` events it emits on this thread.
pub fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarningCounter(Arc::clone(&count)));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, count.load(Ordering::SeqCst))
}

// =========================================================================
// Command recording
// =========================================================================

/// A [`CommandRunner`] that records every command line instead of running it.
///
/// Commands whose first argument is in `fail_on` report failure.
pub struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    fail_on: Vec<String>,
}

impl RecordingRunner {
    pub fn succeeding() -> Self {
        Self::failing(&[])
    }

    pub fn failing(subcommands: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: subcommands.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Recorded command lines, program and arguments joined by spaces.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String], _cwd: Option<&Path>) -> std::io::Result<bool> {
        let mut line = vec![program.to_string()];
        line.extend(args.iter().cloned());
        self.calls.borrow_mut().push(line.join(" "));
        let failed = args.first().is_some_and(|a| self.fail_on.contains(a));
        Ok(!failed)
    }
}
