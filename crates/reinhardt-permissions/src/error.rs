//! Permission error types.

use thiserror::Error;

/// Message used when a denying permission carries none of its own.
pub const DEFAULT_PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action.";

/// Result type for permission checks.
pub type PermissionResult<T> = Result<T, PermissionError>;

/// Errors raised while checking permissions.
///
/// A permission check itself only ever answers `true` or `false`. These
/// errors are produced by the callers turning a `false` into a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PermissionError {
	/// The request is not permitted.
	#[error("{}", .message.as_deref().unwrap_or(DEFAULT_PERMISSION_DENIED_MESSAGE))]
	PermissionDenied {
		/// Message of the permission that denied the request.
		message: Option<String>,
	},
}

impl PermissionError {
	pub fn denied(message: Option<String>) -> Self {
		Self::PermissionDenied { message }
	}

	/// Message carried by the denying permission, if any.
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::PermissionDenied { message } => message.as_deref(),
		}
	}
}
