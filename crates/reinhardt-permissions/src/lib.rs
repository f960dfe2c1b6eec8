//! # Reinhardt Permissions
//!
//! Composable permission classes for Reinhardt controllers.
//!
//! ## Features
//!
//! - **Built-in classes**: `AllowAny`, `IsAuthenticated`, `IsAdminUser`,
//!   `IsAuthenticatedOrReadOnly`
//! - **Boolean algebra**: combine permissions with `&`, `|` and `!`, evaluated
//!   left to right with short-circuiting
//! - **Class composition**: compose permission classes before instantiating
//!   them, then build the whole expression with one set of arguments
//! - **Checking mixin**: turn the first denial into a `PermissionDenied` error
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use reinhardt_permissions::{IsAdminUser, IsAuthenticatedOrReadOnly, Permission, PermissionContext};
//!
//! #[tokio::main]
//! async fn main() {
//!     let permission = IsAdminUser | IsAuthenticatedOrReadOnly;
//!
//!     let read = PermissionContext::new(Method::GET, "/articles");
//!     let write = PermissionContext::new(Method::POST, "/articles");
//!
//!     assert!(permission.has_permission(&read).await);
//!     assert!(!permission.has_permission(&write).await);
//! }
//! ```

pub mod classes;
pub mod common;
pub mod core;
pub mod error;
pub mod mixin;
pub mod permission_operators;

pub use crate::classes::{PermissionArgs, PermissionClass, PermissionExpr};
pub use crate::common::{AllowAny, IsAdminUser, IsAuthenticated, IsAuthenticatedOrReadOnly};
pub use crate::core::{DynPermission, Permission, PermissionContext, SAFE_METHODS, is_safe_method};
pub use crate::error::{DEFAULT_PERMISSION_DENIED_MESSAGE, PermissionError, PermissionResult};
pub use crate::mixin::{PermissionCheckMixin, check_object_permissions, check_permissions, permission_denied};
pub use crate::permission_operators::{AndPermission, NotPermission, OrPermission, and, not, or};
