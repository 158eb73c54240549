//! Error handling and exit codes.

use numkit_core::constants::exit_codes;
use numkit_core::error::NumError;

/// Map a computation error to its process exit code.
#[must_use]
pub fn handle_error(err: &NumError) -> i32 {
    match err {
        NumError::Timeout { .. } => exit_codes::ERROR_TIMEOUT,
        NumError::TaskFailure { .. } => exit_codes::ERROR_TASK_FAILURE,
        NumError::InvalidInterval(_) | NumError::Config(_) => exit_codes::ERROR_CONFIG,
        NumError::Cancelled => exit_codes::ERROR_CANCELED,
    }
}

/// Exit code for any application error; non-numeric errors are generic.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<NumError>()
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}
