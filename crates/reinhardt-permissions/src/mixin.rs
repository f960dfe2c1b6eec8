//! Permission checking for controllers
//!
//! Evaluates a list of permissions in order and turns the first denial into
//! a [`PermissionError::PermissionDenied`] carrying that permission's message.

use crate::classes::{PermissionArgs, PermissionExpr};
use crate::core::{DynPermission, Permission, PermissionContext};
use crate::error::{PermissionError, PermissionResult};
use async_trait::async_trait;
use std::any::Any;

/// Build the rejection for `permission`.
pub fn permission_denied(permission: &dyn Permission) -> PermissionError {
	PermissionError::denied(permission.message())
}

/// Check every permission, failing on the first that denies.
pub async fn check_permissions(
	permissions: &[DynPermission],
	context: &PermissionContext<'_>,
) -> PermissionResult<()> {
	for permission in permissions {
		if !permission.has_permission(context).await {
			tracing::debug!(
				method = %context.method,
				path = context.path,
				"permission denied"
			);
			return Err(permission_denied(permission.as_ref()));
		}
	}
	Ok(())
}

/// Check every permission against `obj`, failing on the first that denies.
pub async fn check_object_permissions(
	permissions: &[DynPermission],
	context: &PermissionContext<'_>,
	obj: &(dyn Any + Send + Sync),
) -> PermissionResult<()> {
	for permission in permissions {
		if !permission.has_object_permission(context, obj).await {
			tracing::debug!(
				method = %context.method,
				path = context.path,
				"object permission denied"
			);
			return Err(permission_denied(permission.as_ref()));
		}
	}
	Ok(())
}

/// Permission checking for anything that declares permission classes.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use reinhardt_permissions::{
///     IsAuthenticated, PermissionCheckMixin, PermissionClass, PermissionContext, PermissionExpr,
/// };
///
/// struct ArticlesController;
///
/// impl PermissionCheckMixin for ArticlesController {
///     fn permission_classes(&self) -> Vec<PermissionExpr> {
///         vec![PermissionClass::of::<IsAuthenticated>().into()]
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let controller = ArticlesController;
///     let context = PermissionContext::new(Method::GET, "/articles");
///     assert!(controller.check_permissions(&context).await.is_err());
/// }
/// ```
#[async_trait]
pub trait PermissionCheckMixin: Send + Sync {
	/// Permission classes this controller requires.
	fn permission_classes(&self) -> Vec<PermissionExpr>;

	/// Arguments permission classes are instantiated with.
	fn permission_args(&self) -> PermissionArgs {
		PermissionArgs::default()
	}

	/// Instantiate the permission classes.
	fn get_permissions(&self) -> Vec<DynPermission> {
		let args = self.permission_args();
		self.permission_classes()
			.iter()
			.map(|expr| expr.instantiate(&args))
			.collect()
	}

	async fn check_permissions(&self, context: &PermissionContext<'_>) -> PermissionResult<()> {
		check_permissions(&self.get_permissions(), context).await
	}

	async fn check_object_permissions(
		&self,
		context: &PermissionContext<'_>,
		obj: &(dyn Any + Send + Sync),
	) -> PermissionResult<()> {
		check_object_permissions(&self.get_permissions(), context, obj).await
	}
}
