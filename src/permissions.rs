//! Permission classes module.
//!
//! Built-in permission classes, the `&`, `|` and `!` operators, and the
//! checking helpers used by controllers.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "permissions")]
//! use reinhardt_extra::permissions::{IsAuthenticated, PermissionClass};
//! ```

#[cfg(feature = "permissions")]
pub use reinhardt_permissions::*;
