//! Controller error types.

use reinhardt_reflect::ReflectError;
use thiserror::Error;

/// Result type for controller wiring.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors raised while wiring controllers and routes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
	/// The target was never passed through `api_controller`.
	#[error("{0} is not an api controller")]
	MissingController(String),

	/// A route declared a method outside `ROUTE_METHODS`.
	#[error("invalid route method: {0}")]
	InvalidRouteMethod(String),

	/// No permission class is registered under this name.
	#[error("unknown permission class: {0}")]
	UnknownPermission(String),

	/// No throttle rate is configured for this scope.
	#[error("unknown throttle scope: {0}")]
	UnknownThrottleScope(String),

	/// A throttle rate does not match `<count>/<period>`.
	#[error("invalid throttle rate for scope '{scope}': {rate}")]
	InvalidThrottleRate { scope: String, rate: String },

	/// Settings could not be parsed.
	#[error("failed to parse settings: {0}")]
	Settings(#[from] toml::de::Error),

	#[error(transparent)]
	Reflect(#[from] ReflectError),
}
