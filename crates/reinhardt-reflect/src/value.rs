//! Metadata values
//!
//! Values stored in the registry form a closed tagged union. Four of the
//! variants are structural (`List`, `Tuple`, `Set`, `Map`) and merge with an
//! existing value of a compatible kind when redefined; every other variant is
//! replaced outright.

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Ordered mapping used for `Map` values and per-target metadata.
pub type MetadataMap = IndexMap<String, MetadataValue>;

/// Discriminant of a [`MetadataValue`], used to look up update callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Bool,
	Int,
	Float,
	Str,
	List,
	Tuple,
	Set,
	Map,
	Object,
}

impl ValueKind {
	/// Whether values of this kind are copied defensively on read.
	pub fn is_structural(self) -> bool {
		matches!(self, Self::List | Self::Tuple | Self::Set | Self::Map)
	}
}

/// A value attached to a target under a metadata key.
#[derive(Clone)]
pub enum MetadataValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	/// Growable ordered sequence.
	List(Vec<MetadataValue>),
	/// Fixed ordered sequence. Merges like `List` but keeps its own kind.
	Tuple(Vec<MetadataValue>),
	/// Unordered collection without duplicates.
	Set(Vec<MetadataValue>),
	/// String-keyed mapping preserving insertion order.
	Map(MetadataMap),
	/// Opaque shared value (a controller config, a permission expression, ...).
	Object(Arc<dyn Any + Send + Sync>),
}

impl MetadataValue {
	/// Build a `Tuple` value.
	pub fn tuple<I, V>(items: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<MetadataValue>,
	{
		Self::Tuple(items.into_iter().map(Into::into).collect())
	}

	/// Build a `List` value.
	pub fn list<I, V>(items: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<MetadataValue>,
	{
		Self::List(items.into_iter().map(Into::into).collect())
	}

	/// Build a `Set` value, dropping duplicates.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reflect::MetadataValue;
	///
	/// let set = MetadataValue::set(["a", "b", "a"]);
	/// assert_eq!(set.len(), Some(2));
	/// assert_eq!(set, MetadataValue::set(["b", "a"]));
	/// ```
	pub fn set<I, V>(items: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<MetadataValue>,
	{
		let mut out: Vec<MetadataValue> = Vec::new();
		for item in items.into_iter().map(Into::into) {
			if !out.contains(&item) {
				out.push(item);
			}
		}
		Self::Set(out)
	}

	/// Build a `Map` value.
	pub fn map<I, K, V>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<MetadataValue>,
	{
		Self::Map(
			entries
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}

	/// Wrap an arbitrary shared value.
	pub fn object<T: Any + Send + Sync>(value: T) -> Self {
		Self::Object(Arc::new(value))
	}

	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Bool(_) => ValueKind::Bool,
			Self::Int(_) => ValueKind::Int,
			Self::Float(_) => ValueKind::Float,
			Self::Str(_) => ValueKind::Str,
			Self::List(_) => ValueKind::List,
			Self::Tuple(_) => ValueKind::Tuple,
			Self::Set(_) => ValueKind::Set,
			Self::Map(_) => ValueKind::Map,
			Self::Object(_) => ValueKind::Object,
		}
	}

	pub fn is_structural(&self) -> bool {
		self.kind().is_structural()
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(f) => Some(*f),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Items of a `List`, `Tuple` or `Set`.
	pub fn as_slice(&self) -> Option<&[MetadataValue]> {
		match self {
			Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&MetadataMap> {
		match self {
			Self::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Downcast an `Object` value to a concrete shared type.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reflect::MetadataValue;
	///
	/// let value = MetadataValue::object(42u32);
	/// assert_eq!(*value.downcast::<u32>().unwrap(), 42);
	/// assert!(value.downcast::<String>().is_none());
	/// ```
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		match self {
			Self::Object(obj) => obj.clone().downcast::<T>().ok(),
			_ => None,
		}
	}

	/// Number of items held by a structural value.
	pub fn len(&self) -> Option<usize> {
		match self {
			Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items.len()),
			Self::Map(map) => Some(map.len()),
			_ => None,
		}
	}

	/// Whether the value is an empty structural value.
	pub fn is_empty(&self) -> bool {
		self.len() == Some(0)
	}

	/// Membership test for `List`, `Tuple` and `Set` values.
	pub fn contains(&self, item: &MetadataValue) -> bool {
		self.as_slice().is_some_and(|items| items.contains(item))
	}
}

impl PartialEq for MetadataValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Tuple(a), Self::Tuple(b)) => a == b,
			(Self::Set(a), Self::Set(b)) => {
				a.len() == b.len() && a.iter().all(|item| b.contains(item))
			}
			// Maps compare as dicts do: same entries, any order.
			(Self::Map(a), Self::Map(b)) => {
				a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
			}
			(Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for MetadataValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b:?}"),
			Self::Int(i) => write!(f, "{i:?}"),
			Self::Float(x) => write!(f, "{x:?}"),
			Self::Str(s) => write!(f, "{s:?}"),
			Self::List(items) => f.debug_list().entries(items).finish(),
			Self::Tuple(items) => {
				let mut tuple = f.debug_tuple("");
				for item in items {
					tuple.field(item);
				}
				tuple.finish()
			}
			Self::Set(items) => f.debug_set().entries(items).finish(),
			Self::Map(map) => f.debug_map().entries(map.iter()).finish(),
			Self::Object(_) => f.write_str("<object>"),
		}
	}
}

impl From<bool> for MetadataValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for MetadataValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for MetadataValue {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u32> for MetadataValue {
	fn from(value: u32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<f64> for MetadataValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for MetadataValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for MetadataValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl<V: Into<MetadataValue>> From<Vec<V>> for MetadataValue {
	fn from(value: Vec<V>) -> Self {
		Self::list(value)
	}
}

impl From<MetadataMap> for MetadataValue {
	fn from(value: MetadataMap) -> Self {
		Self::Map(value)
	}
}

impl From<Arc<dyn Any + Send + Sync>> for MetadataValue {
	fn from(value: Arc<dyn Any + Send + Sync>) -> Self {
		Self::Object(value)
	}
}

/// JSON arrays become lists, objects become maps. `null` has no metadata
/// counterpart and is stored as the string `"null"`.
impl From<serde_json::Value> for MetadataValue {
	fn from(value: serde_json::Value) -> Self {
		use serde_json::Value;

		match value {
			Value::Null => Self::Str("null".to_string()),
			Value::Bool(b) => Self::Bool(b),
			Value::Number(n) => match n.as_i64() {
				Some(i) => Self::Int(i),
				None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
			},
			Value::String(s) => Self::Str(s),
			Value::Array(items) => Self::list(items),
			Value::Object(map) => Self::map(map),
		}
	}
}
