//! Exit code constants for CLI commands
//!
//! - 0: Success
//! - 1: General failure, including a tool call that returned success=false
//! - 2: Configuration or validation failure

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General failure
pub const EXIT_FAILURE: i32 = 1;

/// Configuration or validation failure
pub const EXIT_CONFIG_ERROR: i32 = 2;
