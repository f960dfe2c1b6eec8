//! Built-in permission classes

use crate::core::{Permission, PermissionContext};
use async_trait::async_trait;

/// Allow any access.
///
/// Equivalent to declaring no permissions at all, but states the intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllowAny;

#[async_trait]
impl Permission for AllowAny {
	async fn has_permission(&self, _context: &PermissionContext<'_>) -> bool {
		true
	}
}

/// Allows access only to authenticated users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsAuthenticated;

#[async_trait]
impl Permission for IsAuthenticated {
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		context.is_authenticated
	}
}

/// Allows access only to admin users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsAdminUser;

impl IsAdminUser {
	pub const MESSAGE: &'static str = "You must be an admin user to access this resource.";
}

#[async_trait]
impl Permission for IsAdminUser {
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		context.is_authenticated && context.is_admin
	}

	fn message(&self) -> Option<String> {
		Some(Self::MESSAGE.to_string())
	}
}

/// The request is authenticated, or is a read-only request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsAuthenticatedOrReadOnly;

#[async_trait]
impl Permission for IsAuthenticatedOrReadOnly {
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		context.is_safe_method() || context.is_authenticated
	}
}
