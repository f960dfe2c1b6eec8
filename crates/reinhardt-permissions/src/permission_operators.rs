//! Permission Operators
//!
//! Provides logical operators (AND, OR, NOT) for composing permissions.
//! Supports builder-style composition (`AndPermission::new()`), the named
//! combinators [`and`], [`or`] and [`not`], and operator-based composition
//! (`&`, `|`, `!`).
//!
//! Operands are evaluated left to right and short-circuit: the right operand
//! of an AND is never consulted once the left one denied, and the right
//! operand of an OR is never consulted once the left one granted.
//!
//! `!` is the unary operator, so it binds tighter than `&`, which binds
//! tighter than `|`: `!a & b | c` reads `((!a) & b) | c`.

use crate::common::{AllowAny, IsAdminUser, IsAuthenticated, IsAuthenticatedOrReadOnly};
use crate::core::{Permission, PermissionContext};
use async_trait::async_trait;
use std::any::Any;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::atomic::{AtomicBool, Ordering};

/// AND permission operator
///
/// Combines two permissions with logical AND. Both permissions must be satisfied.
///
/// Until the right operand has been consulted, [`Permission::message`]
/// reports the left operand's message; afterwards it reports the right one's.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use reinhardt_permissions::permission_operators::AndPermission;
/// use reinhardt_permissions::{IsAdminUser, IsAuthenticated, Permission, PermissionContext};
///
/// #[tokio::main]
/// async fn main() {
///     let permission = AndPermission::new(IsAuthenticated, IsAdminUser);
///
///     // Both authenticated AND admin required
///     let context = PermissionContext::new(Method::GET, "/")
///         .authenticated(true)
///         .admin(true);
///     assert!(permission.has_permission(&context).await);
///
///     // Not admin - fails
///     let context = PermissionContext::new(Method::GET, "/").authenticated(true);
///     assert!(!permission.has_permission(&context).await);
/// }
/// ```
pub struct AndPermission<A, B> {
	left: A,
	right: B,
	reached_right: AtomicBool,
}

impl<A, B> AndPermission<A, B> {
	/// Create a new AND permission
	pub fn new(left: A, right: B) -> Self {
		Self {
			left,
			right,
			reached_right: AtomicBool::new(false),
		}
	}

	pub fn left(&self) -> &A {
		&self.left
	}

	pub fn right(&self) -> &B {
		&self.right
	}
}

#[async_trait]
impl<A, B> Permission for AndPermission<A, B>
where
	A: Permission,
	B: Permission,
{
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		// The message follows the latest evaluation only.
		self.reached_right.store(false, Ordering::Relaxed);
		if !self.left.has_permission(context).await {
			return false;
		}
		self.reached_right.store(true, Ordering::Relaxed);
		self.right.has_permission(context).await
	}

	async fn has_object_permission(&self, context: &PermissionContext<'_>, obj: &(dyn Any + Send + Sync)) -> bool {
		self.left.has_object_permission(context, obj).await && self.right.has_object_permission(context, obj).await
	}

	fn message(&self) -> Option<String> {
		if self.reached_right.load(Ordering::Relaxed) {
			self.right.message()
		} else {
			self.left.message()
		}
	}
}

/// OR permission operator
///
/// Combines two permissions with logical OR. Either permission can be satisfied.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use reinhardt_permissions::permission_operators::OrPermission;
/// use reinhardt_permissions::{AllowAny, IsAuthenticated, Permission, PermissionContext};
///
/// #[tokio::main]
/// async fn main() {
///     let permission = OrPermission::new(IsAuthenticated, AllowAny);
///
///     // Either authenticated OR allow any
///     let context = PermissionContext::new(Method::GET, "/");
///     assert!(permission.has_permission(&context).await);
/// }
/// ```
pub struct OrPermission<A, B> {
	left: A,
	right: B,
	reached_right: AtomicBool,
}

impl<A, B> OrPermission<A, B> {
	/// Create a new OR permission
	pub fn new(left: A, right: B) -> Self {
		Self {
			left,
			right,
			reached_right: AtomicBool::new(false),
		}
	}

	pub fn left(&self) -> &A {
		&self.left
	}

	pub fn right(&self) -> &B {
		&self.right
	}
}

#[async_trait]
impl<A, B> Permission for OrPermission<A, B>
where
	A: Permission,
	B: Permission,
{
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		self.reached_right.store(false, Ordering::Relaxed);
		if self.left.has_permission(context).await {
			return true;
		}
		self.reached_right.store(true, Ordering::Relaxed);
		self.right.has_permission(context).await
	}

	async fn has_object_permission(&self, context: &PermissionContext<'_>, obj: &(dyn Any + Send + Sync)) -> bool {
		self.left.has_object_permission(context, obj).await || self.right.has_object_permission(context, obj).await
	}

	fn message(&self) -> Option<String> {
		if self.reached_right.load(Ordering::Relaxed) {
			self.right.message()
		} else {
			self.left.message()
		}
	}
}

/// NOT permission operator
///
/// Negates a permission. Both the plain and the object check are inverted.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use reinhardt_permissions::permission_operators::NotPermission;
/// use reinhardt_permissions::{IsAuthenticated, Permission, PermissionContext};
///
/// #[tokio::main]
/// async fn main() {
///     let permission = NotPermission::new(IsAuthenticated);
///
///     // NOT authenticated - only allows unauthenticated users
///     let context = PermissionContext::new(Method::GET, "/");
///     assert!(permission.has_permission(&context).await);
///
///     // Authenticated - denies
///     let context = PermissionContext::new(Method::GET, "/").authenticated(true);
///     assert!(!permission.has_permission(&context).await);
/// }
/// ```
pub struct NotPermission<P> {
	inner: P,
}

impl<P> NotPermission<P> {
	/// Create a new NOT permission
	pub fn new(inner: P) -> Self {
		Self { inner }
	}

	pub fn inner(&self) -> &P {
		&self.inner
	}
}

#[async_trait]
impl<P> Permission for NotPermission<P>
where
	P: Permission,
{
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		!self.inner.has_permission(context).await
	}

	async fn has_object_permission(&self, context: &PermissionContext<'_>, obj: &(dyn Any + Send + Sync)) -> bool {
		!self.inner.has_object_permission(context, obj).await
	}

	fn message(&self) -> Option<String> {
		self.inner.message()
	}
}

/// `left AND right`, without operator syntax.
pub fn and<A: Permission, B: Permission>(left: A, right: B) -> AndPermission<A, B> {
	AndPermission::new(left, right)
}

/// `left OR right`, without operator syntax.
pub fn or<A: Permission, B: Permission>(left: A, right: B) -> OrPermission<A, B> {
	OrPermission::new(left, right)
}

/// `NOT inner`, without operator syntax.
pub fn not<P: Permission>(inner: P) -> NotPermission<P> {
	NotPermission::new(inner)
}

// Operator overloading implementations using macros
//
// Due to Rust's orphan rules, we need to implement operators for each concrete permission type.
// This macro makes it easy to add operator support for new permission types.

/// Implement `&`, `|` and `!` for a permission type.
///
/// ```ignore
/// struct IsOwner;
/// // impl Permission for IsOwner { ... }
/// impl_permission_operators!(IsOwner);
///
/// let permission = IsOwner | IsAdminUser;
/// ```
#[macro_export]
macro_rules! impl_permission_operators {
	($type:ty) => {
		impl<B: $crate::Permission> ::std::ops::BitAnd<B> for $type {
			type Output = $crate::permission_operators::AndPermission<Self, B>;

			fn bitand(self, rhs: B) -> Self::Output {
				$crate::permission_operators::AndPermission::new(self, rhs)
			}
		}

		impl<B: $crate::Permission> ::std::ops::BitOr<B> for $type {
			type Output = $crate::permission_operators::OrPermission<Self, B>;

			fn bitor(self, rhs: B) -> Self::Output {
				$crate::permission_operators::OrPermission::new(self, rhs)
			}
		}

		impl ::std::ops::Not for $type {
			type Output = $crate::permission_operators::NotPermission<Self>;

			fn not(self) -> Self::Output {
				$crate::permission_operators::NotPermission::new(self)
			}
		}
	};
}

// Apply operators to all built-in permission types
impl_permission_operators!(AllowAny);
impl_permission_operators!(IsAuthenticated);
impl_permission_operators!(IsAdminUser);
impl_permission_operators!(IsAuthenticatedOrReadOnly);

// Apply operators to composite permission types to allow chaining
impl<A, B, C> BitAnd<C> for AndPermission<A, B>
where
	A: Permission,
	B: Permission,
	C: Permission,
{
	type Output = AndPermission<Self, C>;

	fn bitand(self, rhs: C) -> Self::Output {
		AndPermission::new(self, rhs)
	}
}

impl<A, B, C> BitOr<C> for AndPermission<A, B>
where
	A: Permission,
	B: Permission,
	C: Permission,
{
	type Output = OrPermission<Self, C>;

	fn bitor(self, rhs: C) -> Self::Output {
		OrPermission::new(self, rhs)
	}
}

impl<A, B> Not for AndPermission<A, B>
where
	A: Permission,
	B: Permission,
{
	type Output = NotPermission<Self>;

	fn not(self) -> Self::Output {
		NotPermission::new(self)
	}
}

impl<A, B, C> BitAnd<C> for OrPermission<A, B>
where
	A: Permission,
	B: Permission,
	C: Permission,
{
	type Output = AndPermission<Self, C>;

	fn bitand(self, rhs: C) -> Self::Output {
		AndPermission::new(self, rhs)
	}
}

impl<A, B, C> BitOr<C> for OrPermission<A, B>
where
	A: Permission,
	B: Permission,
	C: Permission,
{
	type Output = OrPermission<Self, C>;

	fn bitor(self, rhs: C) -> Self::Output {
		OrPermission::new(self, rhs)
	}
}

impl<A, B> Not for OrPermission<A, B>
where
	A: Permission,
	B: Permission,
{
	type Output = NotPermission<Self>;

	fn not(self) -> Self::Output {
		NotPermission::new(self)
	}
}

impl<P, B> BitAnd<B> for NotPermission<P>
where
	P: Permission,
	B: Permission,
{
	type Output = AndPermission<Self, B>;

	fn bitand(self, rhs: B) -> Self::Output {
		AndPermission::new(self, rhs)
	}
}

impl<P, B> BitOr<B> for NotPermission<P>
where
	P: Permission,
	B: Permission,
{
	type Output = OrPermission<Self, B>;

	fn bitor(self, rhs: B) -> Self::Output {
		OrPermission::new(self, rhs)
	}
}

impl<P> Not for NotPermission<P>
where
	P: Permission,
{
	type Output = NotPermission<Self>;

	fn not(self) -> Self::Output {
		NotPermission::new(self)
	}
}
