//! Route declarations
//!
//! [`route`] attaches a [`RouteFunction`] to a handler under
//! [`ROUTE_FUNCTION`] and appends it to the controller's
//! [`CONTROLLER_ROUTES`] list. Redefining that list concatenates, so the
//! controller accumulates its routes in declaration order.

use crate::constants::{
	CONTROLLER_ROUTES, DELETE, GET, PATCH, PERMISSION_CLASSES, POST, PUT, ROUTE_FUNCTION, THROTTLED_FUNCTION,
	is_route_method,
};
use crate::controller::get_permission_classes;
use crate::error::{ControllerError, ControllerResult};
use crate::settings::{ThrottleRate, default_permission_classes, settings};
use reinhardt_permissions::{
	DynPermission, PermissionArgs, PermissionContext, PermissionExpr, PermissionResult, check_object_permissions,
	check_permissions,
};
use reinhardt_reflect::{AsTarget, MetadataValue, ReflectError, Target, reflect};
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// Path, methods and options of a route.
///
/// # Examples
///
/// ```
/// use reinhardt_controllers::{Route, http_get};
///
/// let route = http_get("/{int:id}").url_name("user-detail");
/// assert_eq!(route.methods(), ["GET"]);
///
/// let route = Route::new("/", ["get", "post"]);
/// assert_eq!(route.methods(), ["GET", "POST"]);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
	path: String,
	methods: Vec<String>,
	permissions: Option<Vec<PermissionExpr>>,
	url_name: Option<String>,
}

impl Route {
	/// Route for `methods` on `path`. Methods are upper-cased.
	pub fn new<I, S>(path: impl Into<String>, methods: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			path: path.into(),
			methods: methods.into_iter().map(|m| m.as_ref().to_uppercase()).collect(),
			permissions: None,
			url_name: None,
		}
	}

	/// Permissions of this route, overriding the controller's.
	pub fn permissions<I, P>(mut self, permissions: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PermissionExpr>,
	{
		self.permissions = Some(permissions.into_iter().map(Into::into).collect());
		self
	}

	pub fn url_name(mut self, url_name: impl Into<String>) -> Self {
		self.url_name = Some(url_name.into());
		self
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn methods(&self) -> &[String] {
		&self.methods
	}

	pub fn get_url_name(&self) -> Option<&str> {
		self.url_name.as_deref()
	}

	fn validate(&self) -> ControllerResult<()> {
		match self.methods.iter().find(|method| !is_route_method(method)) {
			Some(method) => Err(ControllerError::InvalidRouteMethod(method.clone())),
			None => Ok(()),
		}
	}

	/// Identity used to drop duplicate declarations.
	fn signature(&self) -> (String, Vec<String>) {
		let mut methods = self.methods.clone();
		methods.sort();
		(self.path.clone(), methods)
	}
}

pub fn http_get(path: impl Into<String>) -> Route {
	Route::new(path, [GET])
}

pub fn http_post(path: impl Into<String>) -> Route {
	Route::new(path, [POST])
}

pub fn http_put(path: impl Into<String>) -> Route {
	Route::new(path, [PUT])
}

pub fn http_patch(path: impl Into<String>) -> Route {
	Route::new(path, [PATCH])
}

pub fn http_delete(path: impl Into<String>) -> Route {
	Route::new(path, [DELETE])
}

/// A route bound to its handler and controller.
#[derive(Debug, Clone)]
pub struct RouteFunction {
	pub route: Route,
	pub handler: Target,
	pub controller: Target,
}

impl RouteFunction {
	/// Permission classes in effect: the handler's own, else the
	/// controller's, else the settings defaults.
	pub fn permission_classes(&self) -> ControllerResult<Vec<PermissionExpr>> {
		if let Some(classes) = get_permission_classes(&self.handler) {
			return Ok(classes);
		}
		if let Some(classes) = get_permission_classes(&self.controller) {
			return Ok(classes);
		}
		default_permission_classes()
	}

	/// Instantiate the permission classes in effect.
	pub fn get_permissions(&self, args: &PermissionArgs) -> ControllerResult<Vec<DynPermission>> {
		Ok(self
			.permission_classes()?
			.iter()
			.map(|expr| expr.instantiate(args))
			.collect())
	}

	/// Check the request against this route's permissions.
	pub async fn check_permissions(&self, context: &PermissionContext<'_>) -> ControllerResult<PermissionResult<()>> {
		let permissions = self.get_permissions(&PermissionArgs::default())?;
		Ok(check_permissions(&permissions, context).await)
	}

	/// Check the request against this route's permissions for `obj`.
	pub async fn check_object_permissions(
		&self,
		context: &PermissionContext<'_>,
		obj: &(dyn Any + Send + Sync),
	) -> ControllerResult<PermissionResult<()>> {
		let permissions = self.get_permissions(&PermissionArgs::default())?;
		Ok(check_object_permissions(&permissions, context, obj).await)
	}
}

/// Declare `handler` as a route of `controller`.
///
/// # Errors
///
/// Fails on a method outside `ROUTE_METHODS` or when either target is `None`.
///
/// # Examples
///
/// ```
/// use reinhardt_controllers::{get_route_function, http_get, route};
/// use reinhardt_reflect::{Target, reflect};
///
/// struct UsersController;
/// fn list_users() {}
///
/// let _ctx = reflect().context();
/// let handler = Target::function(list_users as usize);
/// route(Target::of::<UsersController>(), &handler, http_get("/")).unwrap();
///
/// assert_eq!(get_route_function(&handler).unwrap().route.path(), "/");
/// ```
pub fn route(controller: impl AsTarget, handler: impl AsTarget, route: Route) -> ControllerResult<Arc<RouteFunction>> {
	route.validate()?;
	let controller = controller.as_target().ok_or(ReflectError::InvalidTarget)?;
	let handler = handler.as_target().ok_or(ReflectError::InvalidTarget)?;

	let store = reflect();
	if let Some(permissions) = &route.permissions {
		store.define_metadata(PERMISSION_CLASSES, MetadataValue::object(permissions.clone()), &handler)?;
	}

	let route_function = Arc::new(RouteFunction {
		route,
		handler: handler.clone(),
		controller: controller.clone(),
	});
	store.define_metadata(ROUTE_FUNCTION, MetadataValue::Object(route_function.clone()), &handler)?;
	store.define_metadata(
		CONTROLLER_ROUTES,
		MetadataValue::List(vec![MetadataValue::Object(route_function.clone())]),
		&controller,
	)?;
	tracing::trace!(
		path = route_function.route.path(),
		methods = ?route_function.route.methods(),
		controller = %controller,
		"declared route"
	);
	Ok(route_function)
}

/// Route declared on `handler`, if any.
pub fn get_route_function(handler: impl AsTarget) -> Option<Arc<RouteFunction>> {
	reflect()
		.get_metadata(ROUTE_FUNCTION, handler)
		.and_then(|value| value.downcast::<RouteFunction>())
}

/// Routes of `controller` in declaration order.
///
/// A later declaration with the same path and methods as an earlier one is
/// dropped.
pub fn get_route_functions(controller: impl AsTarget) -> Vec<Arc<RouteFunction>> {
	let Some(MetadataValue::List(items)) = reflect().get_metadata(CONTROLLER_ROUTES, controller) else {
		return Vec::new();
	};

	let mut seen = HashSet::new();
	items
		.iter()
		.filter_map(|item| item.downcast::<RouteFunction>())
		.filter(|route_function| seen.insert(route_function.route.signature()))
		.collect()
}

/// Throttle `handler` under `scope`.
///
/// # Errors
///
/// Fails when `scope` has no entry in the settings' throttle rates.
pub fn throttle(handler: impl AsTarget, scope: &str) -> ControllerResult<()> {
	settings().throttle_rate(scope)?;
	reflect().define_metadata(THROTTLED_FUNCTION, scope, handler)?;
	Ok(())
}

/// Throttle rate applying to `handler`; `Ok(None)` when it is not
/// throttled or its scope has no rate.
pub fn get_throttle_rate(handler: impl AsTarget) -> ControllerResult<Option<ThrottleRate>> {
	let Some(scope) = reflect().get_metadata(THROTTLED_FUNCTION, handler) else {
		return Ok(None);
	};
	match scope.as_str() {
		Some(scope) => settings().throttle_rate(scope),
		None => Ok(None),
	}
}
