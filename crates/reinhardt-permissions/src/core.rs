//! Permission trait and evaluation context

use async_trait::async_trait;
use http::Method;
use std::any::Any;
use std::sync::Arc;

/// Methods that never modify state.
pub const SAFE_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::OPTIONS];

/// Whether `method` is one of [`SAFE_METHODS`].
pub fn is_safe_method(method: &Method) -> bool {
	SAFE_METHODS.contains(method)
}

/// Everything a permission may look at when deciding.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use reinhardt_permissions::PermissionContext;
///
/// let context = PermissionContext::new(Method::POST, "/articles")
///     .authenticated(true)
///     .active(true);
///
/// assert!(context.is_authenticated);
/// assert!(!context.is_admin);
/// assert!(!context.is_safe_method());
/// ```
#[derive(Clone)]
pub struct PermissionContext<'a> {
	pub method: Method,
	pub path: &'a str,
	pub is_authenticated: bool,
	pub is_admin: bool,
	pub is_active: bool,
	/// Controller handling the request, if any.
	pub controller: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> PermissionContext<'a> {
	/// Anonymous context for `method` on `path`.
	pub fn new(method: Method, path: &'a str) -> Self {
		Self {
			method,
			path,
			is_authenticated: false,
			is_admin: false,
			is_active: false,
			controller: None,
		}
	}

	pub fn authenticated(mut self, is_authenticated: bool) -> Self {
		self.is_authenticated = is_authenticated;
		self
	}

	pub fn admin(mut self, is_admin: bool) -> Self {
		self.is_admin = is_admin;
		self
	}

	pub fn active(mut self, is_active: bool) -> Self {
		self.is_active = is_active;
		self
	}

	pub fn with_controller(mut self, controller: &'a (dyn Any + Send + Sync)) -> Self {
		self.controller = Some(controller);
		self
	}

	pub fn is_safe_method(&self) -> bool {
		is_safe_method(&self.method)
	}

	/// Downcast the controller to `T`.
	pub fn controller<T: Any>(&self) -> Option<&T> {
		self.controller.and_then(|controller| controller.downcast_ref::<T>())
	}
}

impl std::fmt::Debug for PermissionContext<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionContext")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("is_authenticated", &self.is_authenticated)
			.field("is_admin", &self.is_admin)
			.field("is_active", &self.is_active)
			.field("controller", &self.controller.is_some())
			.finish()
	}
}

/// A permission check.
///
/// Checks answer `true` or `false`; they never fail. Turning a denial into
/// an error is left to [`crate::check_permissions`].
#[async_trait]
pub trait Permission: Send + Sync {
	/// Whether the request may perform its action at all.
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool;

	/// Whether the request may perform its action on `obj`.
	async fn has_object_permission(
		&self,
		_context: &PermissionContext<'_>,
		_obj: &(dyn Any + Send + Sync),
	) -> bool {
		true
	}

	/// Message reported when this permission denies a request.
	fn message(&self) -> Option<String> {
		None
	}
}

/// Type-erased, shareable permission.
pub type DynPermission = Arc<dyn Permission>;

#[async_trait]
impl<P: Permission + ?Sized> Permission for Arc<P> {
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		(**self).has_permission(context).await
	}

	async fn has_object_permission(&self, context: &PermissionContext<'_>, obj: &(dyn Any + Send + Sync)) -> bool {
		(**self).has_object_permission(context, obj).await
	}

	fn message(&self) -> Option<String> {
		(**self).message()
	}
}

#[async_trait]
impl<P: Permission + ?Sized> Permission for Box<P> {
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		(**self).has_permission(context).await
	}

	async fn has_object_permission(&self, context: &PermissionContext<'_>, obj: &(dyn Any + Send + Sync)) -> bool {
		(**self).has_object_permission(context, obj).await
	}

	fn message(&self) -> Option<String> {
		(**self).message()
	}
}
