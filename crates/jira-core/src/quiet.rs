// crates/jira-core/src/quiet.rs - Process-wide "quiet output" flag
//
// One flag is shared by the HTTP client and every command that prints status
// lines. The client forces it on while it logs in behind the user's back;
// `QuietGuard` puts the previous value back when it goes out of scope, on
// success, on error and on unwinding alike.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared handle to the quiet flag; clones observe the same value
#[derive(Debug, Clone, Default)]
pub struct QuietFlag(Arc<AtomicBool>);

impl QuietFlag {
    pub fn new(quiet: bool) -> Self {
        Self(Arc::new(AtomicBool::new(quiet)))
    }

    /// Whether normal status output should be suppressed
    pub fn is_quiet(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, quiet: bool) {
        self.0.store(quiet, Ordering::SeqCst);
    }

    /// Force quiet on until the returned guard is dropped
    pub fn suppress(&self) -> QuietGuard {
        let previous = self.0.swap(true, Ordering::SeqCst);
        QuietGuard {
            flag: self.clone(),
            previous,
        }
    }
}

/// Restores the quiet flag to the value it had before `QuietFlag::suppress`
#[derive(Debug)]
#[must_use = "the flag is restored as soon as the guard is dropped"]
pub struct QuietGuard {
    flag: QuietFlag,
    previous: bool,
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
