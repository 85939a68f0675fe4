// crates/jira-core/src/flow.rs - Command completion result
//
// A user declining to continue is not an error: nothing failed, the user chose
// to stop. Commands therefore return `Result<Flow, _>` and the binary turns
// `Flow::Exit` into the process status without printing anything.

/// Terminal state of an interactive command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    /// The command ran to completion
    Done,
    /// The user asked to stop; the process should exit with this status
    Exit(Exit),
}

/// Requested process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub code: u8,
}

impl Exit {
    /// Status used when the user declines a "try again?" confirmation
    pub const ABORTED: Exit = Exit { code: 1 };
}

impl Flow {
    /// The flow produced by a declined confirmation
    pub fn aborted() -> Self {
        Flow::Exit(Exit::ABORTED)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Flow::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_carries_status_one() {
        assert_eq!(Flow::aborted(), Flow::Exit(Exit { code: 1 }));
        assert!(!Flow::aborted().is_done());
        assert!(Flow::Done.is_done());
    }
}
