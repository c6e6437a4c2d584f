/// Exit codes for snipcheck, following Ruff's convention
///
/// These exit codes allow users and CI/CD systems to distinguish between
/// snippets that fail to compile and a check that could not run.
/// Success - Every snippet compiled cleanly
pub const SUCCESS: i32 = 0;

/// Diagnostics found - One or more snippets produced compiler diagnostics
pub const DIAGNOSTICS_FOUND: i32 = 1;

/// Tool error - Configuration error, file access error, or the compiler could not be run
pub const TOOL_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{DIAGNOSTICS_FOUND, SUCCESS, TOOL_ERROR};

    /// Exit with success code (0)
    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    /// Exit with diagnostics found code (1)
    pub fn diagnostics_found() -> ! {
        std::process::exit(DIAGNOSTICS_FOUND);
    }

    /// Exit with tool error code (2)
    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
