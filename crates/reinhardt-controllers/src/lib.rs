//! # Reinhardt Controllers
//!
//! Controller and route wiring on top of the metadata registry.
//!
//! A controller is a type carrying an [`ApiController`] configuration.
//! Handlers declared with [`route`] are attached to it and carry their own
//! [`RouteFunction`]. Everything is stored as metadata in
//! [`reinhardt_reflect::reflect`], so a test can wrap its declarations in a
//! `reflect().context()` to roll them back.
//!
//! [`ControllerRegistry::global`] is not part of the metadata store: a
//! context does not undo registrations made by [`api_controller`]. Call
//! [`ControllerRegistry::clear_controllers`] (or `remove_controller`) to
//! reset it.
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_controllers::{ApiController, api_controller, get_route_functions, http_get, http_post, route};
//! use reinhardt_permissions::{IsAuthenticated, PermissionClass};
//! use reinhardt_reflect::{Target, reflect};
//!
//! struct UsersController;
//! fn list_users() {}
//! fn create_user() {}
//!
//! let _ctx = reflect().context();
//! let controller = api_controller(
//!     Target::of::<UsersController>(),
//!     ApiController::new("/users").permission(PermissionClass::of::<IsAuthenticated>()),
//! )
//! .unwrap();
//!
//! route(&controller, Target::function(list_users as usize), http_get("/")).unwrap();
//! route(&controller, Target::function(create_user as usize), http_post("/")).unwrap();
//!
//! let routes = get_route_functions(&controller);
//! assert_eq!(routes.len(), 2);
//! assert_eq!(routes[1].route.methods(), ["POST"]);
//! ```

pub mod constants;
pub mod controller;
pub mod error;
pub mod registry;
pub mod route;
pub mod settings;

pub use controller::{ApiController, api_controller, get_api_controller, get_api_controller_strict, get_permission_classes};
pub use error::{ControllerError, ControllerResult};
pub use registry::ControllerRegistry;
pub use route::{
	Route, RouteFunction, get_route_function, get_route_functions, get_throttle_rate, http_delete, http_get,
	http_patch, http_post, http_put, route, throttle,
};
pub use settings::{
	ExtraSettings, PermissionRegistry, ThrottleRate, default_permission_classes, permission_registry,
	reload_settings, settings,
};
