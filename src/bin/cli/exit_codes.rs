//! Exit codes for the CLI tool.

use treesnap::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings or partial failures
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Container format or integrity error
pub const BAD_CONTAINER: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadContainer,
    IoError,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadContainer => BAD_CONTAINER,
            Self::IoError => IO_ERROR,
        }
    }
}

/// Converts a treesnap error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidFormat(_) | Error::Integrity(_) => ExitCode::BadContainer,
        Error::InvalidPath(_) => ExitCode::BadContainer,
        _ => ExitCode::FatalError,
    }
}
