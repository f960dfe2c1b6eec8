//! Controllers module.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "controllers")]
//! use reinhardt_extra::controllers::{ApiController, api_controller, http_get, route};
//! ```

#[cfg(feature = "controllers")]
pub use reinhardt_controllers::*;
