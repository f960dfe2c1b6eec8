//! API controllers
//!
//! A controller is any target carrying an [`ApiController`] under
//! [`API_CONTROLLER_INSTANCE`]. Its routes are collected from the handlers
//! declared on it (see [`crate::route`]).

use crate::constants::{API_CONTROLLER_INSTANCE, PERMISSION_CLASSES};
use crate::error::{ControllerError, ControllerResult};
use crate::registry::ControllerRegistry;
use crate::settings::{default_permission_classes, settings};
use reinhardt_permissions::PermissionExpr;
use reinhardt_reflect::{AsTarget, MetadataValue, Target, reflect};
use std::sync::Arc;

/// Configuration of an API controller.
///
/// # Examples
///
/// ```
/// use reinhardt_controllers::ApiController;
/// use reinhardt_permissions::{IsAuthenticated, PermissionClass};
///
/// let config = ApiController::new("/users/{int:user_id}")
///     .tag("users")
///     .permission(PermissionClass::of::<IsAuthenticated>())
///     .auto_import(false);
///
/// assert_eq!(config.prefix(), "/users/{int:user_id}");
/// assert_eq!(
///     config.prefix_route_params(),
///     vec![("user_id".to_string(), Some("int".to_string()))]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ApiController {
	prefix: String,
	tags: Vec<String>,
	permissions: Vec<PermissionExpr>,
	auto_import: bool,
	name: String,
}

impl ApiController {
	/// Controller mounted at `prefix`. `auto_import` follows the settings.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			tags: Vec::new(),
			permissions: Vec::new(),
			auto_import: settings().auto_import,
			name: String::new(),
		}
	}

	pub fn tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.push(tag.into());
		self
	}

	pub fn tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags.extend(tags.into_iter().map(Into::into));
		self
	}

	pub fn permission(mut self, permission: impl Into<PermissionExpr>) -> Self {
		self.permissions.push(permission.into());
		self
	}

	pub fn permissions<I, P>(mut self, permissions: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PermissionExpr>,
	{
		self.permissions.extend(permissions.into_iter().map(Into::into));
		self
	}

	/// Set to `false` to keep the controller out of the registry.
	pub fn auto_import(mut self, auto_import: bool) -> Self {
		self.auto_import = auto_import;
		self
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn get_tags(&self) -> &[String] {
		&self.tags
	}

	pub fn is_auto_import(&self) -> bool {
		self.auto_import
	}

	/// Name of the controller this configuration was applied to.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared permissions, or the settings defaults when none are declared.
	pub fn permission_classes(&self) -> ControllerResult<Vec<PermissionExpr>> {
		if self.permissions.is_empty() {
			default_permission_classes()
		} else {
			Ok(self.permissions.clone())
		}
	}

	/// `{converter:name}` parameters of the prefix, in order.
	pub fn prefix_route_params(&self) -> Vec<(String, Option<String>)> {
		let mut params = Vec::new();
		let mut rest = self.prefix.as_str();
		while let Some(start) = rest.find('{') {
			let Some(len) = rest[start..].find('}') else {
				break;
			};
			let inner = &rest[start + 1..start + len];
			match inner.split_once(':') {
				Some((converter, name)) => params.push((name.to_string(), Some(converter.to_string()))),
				None => params.push((inner.to_string(), None)),
			}
			rest = &rest[start + len + 1..];
		}
		params
	}

	pub fn has_prefix_route_params(&self) -> bool {
		!self.prefix_route_params().is_empty()
	}
}

/// Short controller name of `target`: the last path segment of its display.
fn controller_name(target: &Target) -> String {
	let display = target.to_string();
	let base = display.split('<').next().unwrap_or(&display);
	base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Turn `target` into an API controller.
///
/// Stores `config` under [`API_CONTROLLER_INSTANCE`] and the resolved
/// permission classes under [`PERMISSION_CLASSES`], then registers the
/// controller unless `auto_import` is off. Without explicit tags the
/// controller is tagged with its lowercased name minus `controller`.
/// Returns the target unchanged.
///
/// The registration outlives any `reflect().context()`; only the metadata
/// is rolled back.
///
/// # Errors
///
/// Fails when `target` is `None` or when a default permission name is unknown.
///
/// # Examples
///
/// ```
/// use reinhardt_controllers::{ApiController, api_controller, get_api_controller};
/// use reinhardt_reflect::{Target, reflect};
///
/// struct UsersController;
///
/// let _ctx = reflect().context();
/// let target = api_controller(Target::of::<UsersController>(), ApiController::new("/users")).unwrap();
///
/// let config = get_api_controller(&target).unwrap();
/// assert_eq!(config.name(), "UsersController");
/// assert_eq!(config.get_tags(), ["users"]);
/// ```
pub fn api_controller<T: AsTarget>(target: T, mut config: ApiController) -> ControllerResult<T> {
	let resolved = target.as_target().ok_or(reinhardt_reflect::ReflectError::InvalidTarget)?;
	config.name = controller_name(&resolved);
	if config.tags.is_empty() {
		config.tags.push(config.name.to_lowercase().replace("controller", ""));
	}

	let permissions = config.permission_classes()?;
	let config = Arc::new(config);
	let store = reflect();
	store.define_metadata(API_CONTROLLER_INSTANCE, MetadataValue::Object(config.clone()), &resolved)?;
	store.define_metadata(PERMISSION_CLASSES, MetadataValue::object(permissions), &resolved)?;

	ControllerRegistry::global().add_controller(resolved, &config);
	Ok(target)
}

/// Configuration stored on `target`, if it is a controller.
pub fn get_api_controller(target: impl AsTarget) -> Option<Arc<ApiController>> {
	reflect()
		.get_metadata(API_CONTROLLER_INSTANCE, target)
		.and_then(|value| value.downcast::<ApiController>())
}

/// Like [`get_api_controller`], but a missing configuration is an error.
pub fn get_api_controller_strict(target: impl AsTarget) -> ControllerResult<Arc<ApiController>> {
	let display = target
		.as_target()
		.map(|t| t.to_string())
		.unwrap_or_else(|| "None".to_string());
	get_api_controller(target).ok_or(ControllerError::MissingController(display))
}

/// Permission classes stored on `target` under [`PERMISSION_CLASSES`].
pub fn get_permission_classes(target: impl AsTarget) -> Option<Vec<PermissionExpr>> {
	reflect()
		.get_metadata(PERMISSION_CLASSES, target)
		.and_then(|value| value.downcast::<Vec<PermissionExpr>>())
		.map(|classes| classes.as_ref().clone())
}
