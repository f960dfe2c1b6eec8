//! Metadata targets
//!
//! A target is anything metadata can be attached to. Targets are identified,
//! never owned: shared objects are held through a [`Weak`] reference so their
//! metadata goes away together with them.

use crate::hashing::Hashable;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::{Arc, Weak};

/// A Rust type used as a target.
#[derive(Debug, Clone, Copy)]
pub struct TypeTarget {
	id: TypeId,
	name: &'static str,
}

impl TypeTarget {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

/// A function identified by its address.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTarget {
	addr: usize,
	name: Option<&'static str>,
}

impl FunctionTarget {
	pub fn addr(&self) -> usize {
		self.addr
	}

	pub fn name(&self) -> Option<&'static str> {
		self.name
	}
}

/// A shared object, held weakly.
#[derive(Clone)]
pub struct ObjectTarget {
	addr: usize,
	weak: Weak<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl ObjectTarget {
	pub fn addr(&self) -> usize {
		self.addr
	}

	/// Whether the object is still alive.
	pub fn is_alive(&self) -> bool {
		self.weak.strong_count() > 0
	}

	/// Upgrade to a strong reference if the object is still alive.
	pub fn upgrade(&self) -> Option<Arc<dyn Any + Send + Sync>> {
		self.weak.upgrade()
	}

	pub(crate) fn weak(&self) -> Weak<dyn Any + Send + Sync> {
		self.weak.clone()
	}
}

impl fmt::Debug for ObjectTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectTarget")
			.field("addr", &format_args!("{:#x}", self.addr))
			.field("type_name", &self.type_name)
			.field("alive", &self.is_alive())
			.finish()
	}
}

/// A value that cannot be weakly referenced. Stored through a surrogate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTarget {
	id: usize,
	repr: String,
}

impl ValueTarget {
	pub fn id(&self) -> usize {
		self.id
	}

	pub fn repr(&self) -> &str {
		&self.repr
	}
}

/// A function bound to a receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMethod {
	pub receiver: Target,
	pub function: Target,
}

/// Anything metadata can be attached to.
#[derive(Clone)]
pub enum Target {
	Type(TypeTarget),
	Function(FunctionTarget),
	Object(ObjectTarget),
	Value(ValueTarget),
	/// Bound method. Resolves to its function.
	Method(Box<BoundMethod>),
	/// Partial application. Resolves to the underlying function.
	Partial(Box<Target>),
	/// Wrapper keeping a back-reference to what it wraps.
	Wraps(Box<Target>),
	/// Surrogate standing in for an unhashable value.
	Surrogate(Arc<Hashable>),
}

impl Target {
	/// Target for the type `T`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reflect::Target;
	///
	/// struct UsersController;
	///
	/// assert_eq!(Target::of::<UsersController>(), Target::of::<UsersController>());
	/// assert_ne!(Target::of::<UsersController>(), Target::of::<String>());
	/// ```
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self::Type(TypeTarget::of::<T>())
	}

	/// Target for a function pointer, e.g. `Target::function(list_users as usize)`.
	pub fn function(addr: usize) -> Self {
		Self::Function(FunctionTarget { addr, name: None })
	}

	/// Target for a function pointer carrying a readable name.
	pub fn named_function(name: &'static str, addr: usize) -> Self {
		Self::Function(FunctionTarget {
			addr,
			name: Some(name),
		})
	}

	/// Target for a shared object. Only a weak reference is kept.
	pub fn object<T: Any + Send + Sync>(value: &Arc<T>) -> Self {
		let weak: Weak<T> = Arc::downgrade(value);
		let weak: Weak<dyn Any + Send + Sync> = weak;
		Self::Object(ObjectTarget {
			addr: Arc::as_ptr(value) as *const () as usize,
			weak,
			type_name: type_name::<T>(),
		})
	}

	/// Target for an already type-erased shared object.
	pub fn object_dyn(value: &Arc<dyn Any + Send + Sync>) -> Self {
		Self::Object(ObjectTarget {
			addr: Arc::as_ptr(value) as *const () as usize,
			weak: Arc::downgrade(value),
			type_name: "dyn Any",
		})
	}

	/// Target for a plain value, identified by its address and `Debug` output
	/// at the time of the call.
	pub fn value<T: fmt::Debug>(value: &T) -> Self {
		Self::Value(ValueTarget {
			id: value as *const T as *const () as usize,
			repr: format!("{value:?}"),
		})
	}

	/// Target for an unhashable item given its identity and representation.
	pub fn unhashable(id: usize, repr: impl Into<String>) -> Self {
		Self::Value(ValueTarget {
			id,
			repr: repr.into(),
		})
	}

	/// A method bound to `receiver`, implemented by `function`.
	pub fn method(receiver: Target, function: Target) -> Self {
		Self::Method(Box::new(BoundMethod { receiver, function }))
	}

	/// A partial application of `function`.
	pub fn partial(function: Target) -> Self {
		Self::Partial(Box::new(function))
	}

	/// A wrapper of `wrapped` that remembers what it wraps.
	pub fn wraps(wrapped: Target) -> Self {
		Self::Wraps(Box::new(wrapped))
	}

	/// Whether this target is a wrapper shape the resolver unwraps.
	pub fn is_wrapper(&self) -> bool {
		matches!(self, Self::Method(_) | Self::Partial(_) | Self::Wraps(_))
	}

	/// Whether the target (or, for wrappers, what it wraps) is still alive.
	pub fn is_alive(&self) -> bool {
		match self {
			Self::Object(obj) => obj.is_alive(),
			Self::Method(method) => method.function.is_alive(),
			Self::Partial(inner) | Self::Wraps(inner) => inner.is_alive(),
			_ => true,
		}
	}
}

impl PartialEq for Target {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Type(a), Self::Type(b)) => a.id == b.id,
			(Self::Function(a), Self::Function(b)) => a.addr == b.addr,
			(Self::Object(a), Self::Object(b)) => a.addr == b.addr,
			(Self::Value(a), Self::Value(b)) => a == b,
			(Self::Method(a), Self::Method(b)) => a == b,
			(Self::Partial(a), Self::Partial(b)) | (Self::Wraps(a), Self::Wraps(b)) => a == b,
			(Self::Surrogate(a), Self::Surrogate(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Type(t) => f.debug_tuple("Type").field(&t.name).finish(),
			Self::Function(func) => f.debug_tuple("Function").field(func).finish(),
			Self::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Method(method) => f.debug_tuple("Method").field(method).finish(),
			Self::Partial(inner) => f.debug_tuple("Partial").field(inner).finish(),
			Self::Wraps(inner) => f.debug_tuple("Wraps").field(inner).finish(),
			Self::Surrogate(hashable) => f.debug_tuple("Surrogate").field(hashable).finish(),
		}
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Type(t) => f.write_str(t.name),
			Self::Function(func) => match func.name {
				Some(name) => write!(f, "<function {name}>"),
				None => write!(f, "<function at {:#x}>", func.addr),
			},
			Self::Object(obj) => write!(f, "<{} object at {:#x}>", obj.type_name, obj.addr),
			Self::Value(value) => f.write_str(&value.repr),
			Self::Method(method) => write!(f, "<bound method {} of {}>", method.function, method.receiver),
			Self::Partial(inner) => write!(f, "partial({inner})"),
			Self::Wraps(inner) => write!(f, "wrapper({inner})"),
			Self::Surrogate(hashable) => write!(f, "{hashable}"),
		}
	}
}

/// Conversion into a metadata target.
///
/// `Option<T>` converts to `None` when empty, which the store rejects on
/// definition and treats as "absent" on lookup.
pub trait AsTarget {
	fn as_target(&self) -> Option<Target>;
}

impl AsTarget for Target {
	fn as_target(&self) -> Option<Target> {
		Some(self.clone())
	}
}

impl AsTarget for TypeTarget {
	fn as_target(&self) -> Option<Target> {
		Some(Target::Type(*self))
	}
}

impl<T: Any + Send + Sync> AsTarget for Arc<T> {
	fn as_target(&self) -> Option<Target> {
		Some(Target::object(self))
	}
}

impl<T: AsTarget> AsTarget for Option<T> {
	fn as_target(&self) -> Option<Target> {
		self.as_ref().and_then(AsTarget::as_target)
	}
}

impl<T: AsTarget + ?Sized> AsTarget for &T {
	fn as_target(&self) -> Option<Target> {
		(**self).as_target()
	}
}
