//! # Reinhardt Extra
//!
//! Metadata reflection, controller wiring and permission composition for Reinhardt.
//!
//! Declarations made with this crate never change the items they describe.
//! They are recorded as metadata in a process-wide registry and looked up
//! again when routes are collected or requests are checked.
//!
//! ## Feature Flags
//!
//! The metadata registry is always available.
//!
//! - `permissions` - Permission classes and the `&`, `|`, `!` operators
//! - `controllers` - API controllers, routes and throttling (implies `permissions`)
//! - `full` (default) - Everything above
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_extra::prelude::*;
//!
//! struct ArticlesController;
//! fn list_articles() {}
//! fn delete_article() {}
//!
//! let _ctx = reflect().context();
//! let controller = api_controller(
//!     Target::of::<ArticlesController>(),
//!     ApiController::new("/articles")
//!         .permission(PermissionClass::of::<IsAuthenticated>() | PermissionClass::of::<IsAdminUser>()),
//! )
//! .unwrap();
//!
//! route(&controller, Target::function(list_articles as usize), http_get("/")).unwrap();
//! route(
//!     &controller,
//!     Target::function(delete_article as usize),
//!     http_delete("/{int:id}").permissions([PermissionClass::of::<IsAdminUser>()]),
//! )
//! .unwrap();
//!
//! let routes = get_route_functions(&controller);
//! assert_eq!(routes.len(), 2);
//! assert_eq!(
//!     routes[0].permission_classes().unwrap()[0].to_string(),
//!     "IsAuthenticated | IsAdminUser"
//! );
//! ```

pub mod controllers;
pub mod permissions;
pub mod reflect;

// Re-export the metadata registry
pub use reinhardt_reflect::{
	AsTarget, MetadataMap, MetadataValue, Reflect, ReflectContext, ReflectError, ReflectResult, Target,
};

/// The process-wide metadata store.
///
/// Same store as [`reinhardt_reflect::reflect()`]; the facade's `reflect`
/// module keeps the rest of that crate.
pub fn reflect() -> &'static Reflect {
	reinhardt_reflect::reflect()
}

#[cfg(feature = "permissions")]
pub use reinhardt_permissions::{
	AllowAny, IsAdminUser, IsAuthenticated, IsAuthenticatedOrReadOnly, Permission, PermissionClass,
	PermissionContext, PermissionError, PermissionExpr,
};

#[cfg(feature = "controllers")]
pub use reinhardt_controllers::{
	ApiController, ControllerError, ControllerRegistry, ControllerResult, ExtraSettings, Route, RouteFunction,
	api_controller, get_route_functions, route,
};

/// Prelude module for convenient imports
pub mod prelude {
	// Metadata registry - always available
	pub use crate::{AsTarget, MetadataValue, Target, reflect};

	// External
	pub use async_trait::async_trait;

	#[cfg(feature = "permissions")]
	pub use crate::{
		AllowAny, IsAdminUser, IsAuthenticated, IsAuthenticatedOrReadOnly, Permission, PermissionClass,
		PermissionContext, PermissionError, PermissionExpr,
	};

	#[cfg(feature = "controllers")]
	pub use crate::{ApiController, Route, api_controller, get_route_functions, route};
	#[cfg(feature = "controllers")]
	pub use reinhardt_controllers::{http_delete, http_get, http_patch, http_post, http_put, throttle};
}
