//! Why an expansion produced no output.

use std::time::Duration;

/// Every way [`ProcMacroExpander`](crate::ProcMacroExpander) can fail.
///
/// Transport and protocol failures are all folded into one of these before
/// they reach the caller.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExpansionError {
    #[error("proc-macro expander executable not found")]
    ExecutableNotFound,
    #[error("proc-macro expansion is disabled")]
    ExpansionDisabled,
    #[error("proc-macro expansion timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to run proc-macro expander")]
    CantRunExpander,
    #[error("proc-macro expander process aborted (exit code {})", describe_exit(*.0))]
    ProcessAborted(Option<i32>),
    #[error("i/o error while communicating with proc-macro expander")]
    IoError,
    #[error("proc-macro expander does not support protocol version {0}")]
    UnsupportedExpanderVersion(u32),
    /// The macro ran and failed, or its output could not be decoded.
    #[error("proc macro failed: {0}")]
    ServerSideError(String),
    #[error("expansion cancelled")]
    Cancelled,
}

impl ExpansionError {
    /// Outcomes that happen routinely and are not tool errors.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ExpansionError::ExpansionDisabled
                | ExpansionError::ServerSideError(_)
                | ExpansionError::Cancelled
        )
    }
}

fn describe_exit(exit_code: Option<i32>) -> String {
    exit_code.map_or_else(|| "unknown".to_owned(), |code| code.to_string())
}
