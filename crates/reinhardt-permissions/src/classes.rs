//! Permission classes and class-level composition
//!
//! A [`PermissionClass`] is a named factory: it describes a permission
//! without building it. Classes and live instances combine with `&`, `|`
//! and `!` into a [`PermissionExpr`], which builds the composite permission
//! on [`PermissionExpr::instantiate`]. Every class operand is constructed
//! with the arguments passed to `instantiate`; instance operands are
//! shared as they are.

use crate::core::{DynPermission, Permission};
use crate::permission_operators::{AndPermission, NotPermission, OrPermission};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

/// Constructor arguments handed to permission factories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionArgs {
	positional: Vec<Value>,
	keyword: Map<String, Value>,
}

impl PermissionArgs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a positional argument.
	pub fn arg(mut self, value: impl Into<Value>) -> Self {
		self.positional.push(value.into());
		self
	}

	/// Set a keyword argument.
	pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.keyword.insert(name.into(), value.into());
		self
	}

	pub fn positional(&self) -> &[Value] {
		&self.positional
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.keyword.get(name)
	}

	pub fn is_empty(&self) -> bool {
		self.positional.is_empty() && self.keyword.is_empty()
	}
}

type PermissionFactory = dyn Fn(&PermissionArgs) -> DynPermission + Send + Sync;

/// A named, not yet instantiated permission.
///
/// # Examples
///
/// ```
/// use reinhardt_permissions::{IsAuthenticated, PermissionArgs, PermissionClass};
///
/// let class = PermissionClass::of::<IsAuthenticated>();
/// assert_eq!(class.name(), "IsAuthenticated");
///
/// let _permission = class.instantiate(&PermissionArgs::new());
/// ```
#[derive(Clone)]
pub struct PermissionClass {
	name: String,
	factory: Arc<PermissionFactory>,
}

impl PermissionClass {
	/// Class built by `factory` from the arguments it is instantiated with.
	pub fn new<F, P>(name: impl Into<String>, factory: F) -> Self
	where
		F: Fn(&PermissionArgs) -> P + Send + Sync + 'static,
		P: Permission + 'static,
	{
		Self {
			name: name.into(),
			factory: Arc::new(move |args: &PermissionArgs| Arc::new(factory(args)) as DynPermission),
		}
	}

	/// Class of a permission type without constructor arguments.
	pub fn of<P: Permission + Default + 'static>() -> Self {
		let full = std::any::type_name::<P>();
		let name = full.rsplit("::").next().unwrap_or(full);
		Self::new(name, |_| P::default())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Build a permission from `args`.
	pub fn instantiate(&self, args: &PermissionArgs) -> DynPermission {
		(self.factory)(args)
	}
}

impl fmt::Debug for PermissionClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("PermissionClass").field(&self.name).finish()
	}
}

/// Composition of permission classes and instances.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use reinhardt_permissions::{
///     IsAdminUser, IsAuthenticated, Permission, PermissionArgs, PermissionClass,
///     PermissionContext,
/// };
///
/// #[tokio::main]
/// async fn main() {
///     let expr = PermissionClass::of::<IsAuthenticated>() & !PermissionClass::of::<IsAdminUser>();
///     assert_eq!(expr.to_string(), "IsAuthenticated & !IsAdminUser");
///
///     let permission = expr.instantiate(&PermissionArgs::new());
///     let context = PermissionContext::new(Method::GET, "/").authenticated(true);
///     assert!(permission.has_permission(&context).await);
/// }
/// ```
#[derive(Clone)]
pub enum PermissionExpr {
	Class(PermissionClass),
	Instance(DynPermission),
	And(Box<PermissionExpr>, Box<PermissionExpr>),
	Or(Box<PermissionExpr>, Box<PermissionExpr>),
	Not(Box<PermissionExpr>),
}

impl PermissionExpr {
	/// Wrap a live permission instance.
	pub fn instance<P: Permission + 'static>(permission: P) -> Self {
		Self::Instance(Arc::new(permission))
	}

	/// Build the permission this expression describes.
	pub fn instantiate(&self, args: &PermissionArgs) -> DynPermission {
		match self {
			Self::Class(class) => class.instantiate(args),
			Self::Instance(permission) => Arc::clone(permission),
			Self::And(left, right) => Arc::new(AndPermission::new(left.instantiate(args), right.instantiate(args))),
			Self::Or(left, right) => Arc::new(OrPermission::new(left.instantiate(args), right.instantiate(args))),
			Self::Not(inner) => Arc::new(NotPermission::new(inner.instantiate(args))),
		}
	}

	fn precedence(&self) -> u8 {
		match self {
			Self::Or(..) => 1,
			Self::And(..) => 2,
			Self::Not(_) | Self::Class(_) | Self::Instance(_) => 3,
		}
	}

	fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
		if self.precedence() < min_precedence {
			write!(f, "({self})")
		} else {
			write!(f, "{self}")
		}
	}
}

impl fmt::Display for PermissionExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class(class) => f.write_str(class.name()),
			Self::Instance(_) => f.write_str("<instance>"),
			Self::And(left, right) => {
				left.fmt_operand(f, 2)?;
				f.write_str(" & ")?;
				right.fmt_operand(f, 3)
			}
			Self::Or(left, right) => {
				left.fmt_operand(f, 1)?;
				f.write_str(" | ")?;
				right.fmt_operand(f, 2)
			}
			Self::Not(inner) => {
				f.write_str("!")?;
				inner.fmt_operand(f, 3)
			}
		}
	}
}

impl fmt::Debug for PermissionExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PermissionExpr({self})")
	}
}

impl From<PermissionClass> for PermissionExpr {
	fn from(class: PermissionClass) -> Self {
		Self::Class(class)
	}
}

impl From<DynPermission> for PermissionExpr {
	fn from(permission: DynPermission) -> Self {
		Self::Instance(permission)
	}
}

impl<R: Into<PermissionExpr>> BitAnd<R> for PermissionExpr {
	type Output = PermissionExpr;

	fn bitand(self, rhs: R) -> Self::Output {
		PermissionExpr::And(Box::new(self), Box::new(rhs.into()))
	}
}

impl<R: Into<PermissionExpr>> BitOr<R> for PermissionExpr {
	type Output = PermissionExpr;

	fn bitor(self, rhs: R) -> Self::Output {
		PermissionExpr::Or(Box::new(self), Box::new(rhs.into()))
	}
}

impl Not for PermissionExpr {
	type Output = PermissionExpr;

	fn not(self) -> Self::Output {
		PermissionExpr::Not(Box::new(self))
	}
}

impl<R: Into<PermissionExpr>> BitAnd<R> for PermissionClass {
	type Output = PermissionExpr;

	fn bitand(self, rhs: R) -> Self::Output {
		PermissionExpr::from(self) & rhs
	}
}

impl<R: Into<PermissionExpr>> BitOr<R> for PermissionClass {
	type Output = PermissionExpr;

	fn bitor(self, rhs: R) -> Self::Output {
		PermissionExpr::from(self) | rhs
	}
}

impl Not for PermissionClass {
	type Output = PermissionExpr;

	fn not(self) -> Self::Output {
		!PermissionExpr::from(self)
	}
}
