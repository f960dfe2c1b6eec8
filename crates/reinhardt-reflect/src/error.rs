//! Reflect error types.

use thiserror::Error;

/// Result type for metadata operations.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Errors raised by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ReflectError {
	/// Metadata was defined without a target.
	#[error("`target` is not a valid type")]
	InvalidTarget,

	/// The target has never had metadata defined on it.
	#[error("no metadata defined for target: {0}")]
	TargetNotFound(String),

	/// The target exists but carries no value under the key.
	#[error("metadata key '{key}' not defined for target: {target}")]
	KeyNotFound {
		/// Requested metadata key.
		key: String,
		/// Display form of the resolved target.
		target: String,
	},

	/// Generic lookup failure of the strict accessor.
	#[error("MetaData Key not Found: {0}")]
	MetadataKeyNotFound(String),
}

impl ReflectError {
	/// Returns `true` for the lookup-style failures (`TargetNotFound`, `KeyNotFound`).
	pub fn is_lookup_error(&self) -> bool {
		matches!(self, Self::TargetNotFound(_) | Self::KeyNotFound { .. })
	}
}
