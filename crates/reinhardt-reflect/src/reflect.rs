//! Metadata store

use crate::error::{ReflectError, ReflectResult};
use crate::resolver::{actual_target, transfer_metadata};
use crate::target::{AsTarget, Target};
use crate::update::{dict_update, list_update, replace_update, set_update};
use crate::value::{MetadataMap, MetadataValue, ValueKind};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Merge function applied when a key is redefined: `(existing, new) -> stored`.
pub type UpdateCallback = Arc<dyn Fn(MetadataValue, MetadataValue) -> MetadataValue + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TargetKey {
	Type(TypeId),
	Function(usize),
	Object(usize),
	Surrogate(usize),
}

/// What keeps an entry alive.
#[derive(Clone)]
pub(crate) enum Anchor {
	/// Types, functions and surrogates live for the whole process. Surrogates
	/// are owned by the hashing side table.
	Static,
	Weak(Weak<dyn Any + Send + Sync>),
}

impl Anchor {
	fn is_alive(&self) -> bool {
		match self {
			Self::Static => true,
			Self::Weak(weak) => weak.strong_count() > 0,
		}
	}
}

#[derive(Clone)]
pub(crate) struct TargetMetadata {
	anchor: Anchor,
	values: MetadataMap,
}

impl TargetMetadata {
	pub(crate) fn is_alive(&self) -> bool {
		self.anchor.is_alive()
	}
}

pub(crate) type MetadataTable = HashMap<TargetKey, TargetMetadata>;

/// Drop the entries of collected objects, releasing their values.
pub(crate) fn purge_dead(meta_data: &mut MetadataTable) -> usize {
	let before = meta_data.len();
	meta_data.retain(|_, entry| entry.is_alive());
	let purged = before - meta_data.len();
	if purged > 0 {
		tracing::debug!(purged, "purged metadata of collected targets");
	}
	purged
}

struct Resolved {
	key: TargetKey,
	anchor: Anchor,
	display: String,
}

fn resolve(target: impl AsTarget) -> Option<Resolved> {
	let target = actual_target(target.as_target()?);
	let display = target.to_string();
	let (key, anchor) = match target {
		Target::Type(t) => (TargetKey::Type(t.type_id()), Anchor::Static),
		Target::Function(func) => (TargetKey::Function(func.addr()), Anchor::Static),
		Target::Object(obj) => (TargetKey::Object(obj.addr()), Anchor::Weak(obj.weak())),
		Target::Surrogate(hashable) => (TargetKey::Surrogate(Arc::as_ptr(&hashable) as usize), Anchor::Static),
		// `actual_target` never yields a raw value or a wrapper.
		Target::Value(_) | Target::Method(_) | Target::Partial(_) | Target::Wraps(_) => return None,
	};
	Some(Resolved {
		key,
		anchor,
		display,
	})
}

/// Metadata manager for types, functions and shared objects.
///
/// Each target owns an insertion-ordered map of metadata keys to values.
/// Redefining a key merges structural values through the update callback
/// registered for the existing value's kind (see [`crate::update`]).
///
/// Use [`crate::reflect()`] for the process-wide instance, or construct an
/// isolated store with [`Reflect::new`].
///
/// # Examples
///
/// ```
/// use reinhardt_reflect::{MetadataValue, Reflect, Target};
///
/// struct UsersController;
///
/// let reflect = Reflect::new();
/// let target = Target::of::<UsersController>();
///
/// reflect.define_metadata("tags", MetadataValue::tuple(["users"]), &target).unwrap();
/// reflect.define_metadata("tags", MetadataValue::tuple(["admin"]), &target).unwrap();
///
/// assert_eq!(
///     reflect.get_metadata("tags", &target),
///     Some(MetadataValue::tuple(["users", "admin"]))
/// );
/// ```
pub struct Reflect {
	pub(crate) meta_data: RwLock<MetadataTable>,
	callbacks: RwLock<HashMap<ValueKind, UpdateCallback>>,
}

impl Reflect {
	/// Create an empty store with the built-in update callbacks registered.
	pub fn new() -> Self {
		let reflect = Self {
			meta_data: RwLock::new(HashMap::new()),
			callbacks: RwLock::new(HashMap::new()),
		};
		reflect.add_type_update_callback(ValueKind::Tuple, list_update);
		reflect.add_type_update_callback(ValueKind::List, list_update);
		reflect.add_type_update_callback(ValueKind::Set, set_update);
		reflect.add_type_update_callback(ValueKind::Map, dict_update);
		reflect
	}

	/// Register or override the update callback for values of `kind`.
	///
	/// Callbacks run while the store is locked and must not call back into it.
	pub fn add_type_update_callback<F>(&self, kind: ValueKind, callback: F)
	where
		F: Fn(MetadataValue, MetadataValue) -> MetadataValue + Send + Sync + 'static,
	{
		self.callbacks.write().insert(kind, Arc::new(callback));
	}

	fn update_callback(&self, kind: ValueKind) -> Option<UpdateCallback> {
		self.callbacks.read().get(&kind).cloned()
	}

	/// Define `value` under `key` for `target`.
	///
	/// An existing value is merged with the new one by the callback registered
	/// for its kind; kinds without a callback are replaced.
	///
	/// # Errors
	///
	/// Returns [`ReflectError::InvalidTarget`] when `target` is `None`.
	pub fn define_metadata(
		&self,
		key: &str,
		value: impl Into<MetadataValue>,
		target: impl AsTarget,
	) -> ReflectResult<()> {
		let resolved = resolve(target).ok_or(ReflectError::InvalidTarget)?;
		let value = value.into();

		let mut meta_data = self.meta_data.write();
		// Also clears an entry whose object died and whose address got reused.
		purge_dead(&mut meta_data);
		let entry = meta_data
			.entry(resolved.key)
			.or_insert_with(|| TargetMetadata {
				anchor: resolved.anchor,
				values: MetadataMap::new(),
			});

		match entry.values.get_mut(key) {
			Some(slot) => {
				let existing = std::mem::replace(slot, MetadataValue::Bool(false));
				*slot = match self.update_callback(existing.kind()) {
					Some(callback) => callback(existing, value),
					None => replace_update(existing, value),
				};
			}
			None => {
				entry.values.insert(key.to_string(), value);
			}
		}
		tracing::trace!(key, target = %resolved.display, "defined metadata");
		Ok(())
	}

	/// Decorator-style definition: the returned [`MetadataDecorator`] defines
	/// the metadata when applied and hands the target back unchanged.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reflect::{Reflect, Target};
	///
	/// fn list_users() {}
	///
	/// let reflect = Reflect::new();
	/// let target = reflect
	///     .metadata("permissions", "IsAuthenticated")
	///     .apply(Target::function(list_users as usize))
	///     .unwrap();
	///
	/// assert!(reflect.has_metadata("permissions", &target));
	/// ```
	pub fn metadata(&self, key: impl Into<String>, value: impl Into<MetadataValue>) -> MetadataDecorator<'_> {
		MetadataDecorator {
			reflect: self,
			key: key.into(),
			value: value.into(),
		}
	}

	/// Run `f` against the live metadata of `target`, if any.
	///
	/// Purges the store first when it holds entries of collected objects.
	fn with_metadata<R>(&self, target: impl AsTarget, f: impl FnOnce(&MetadataMap) -> R) -> Option<R> {
		let resolved = resolve(target)?;
		if self.meta_data.read().values().any(|entry| !entry.is_alive()) {
			self.purge();
		}
		let meta_data = self.meta_data.read();
		meta_data
			.get(&resolved.key)
			.filter(|entry| entry.is_alive())
			.map(|entry| f(&entry.values))
	}

	pub fn has_metadata(&self, key: &str, target: impl AsTarget) -> bool {
		self.with_metadata(target, |values| values.contains_key(key))
			.unwrap_or(false)
	}

	/// Value under `key`, or `None` when the target or the key is unknown.
	///
	/// The returned value is a copy; mutating it never affects the store.
	pub fn get_metadata(&self, key: &str, target: impl AsTarget) -> Option<MetadataValue> {
		self.with_metadata(target, |values| values.get(key).cloned())
			.flatten()
	}

	/// Like [`Reflect::get_metadata`], but absence is an error.
	///
	/// # Errors
	///
	/// [`ReflectError::TargetNotFound`] when the target carries no metadata,
	/// [`ReflectError::KeyNotFound`] when the key is missing.
	pub fn get_metadata_search_safe(&self, key: &str, target: impl AsTarget) -> ReflectResult<MetadataValue> {
		let display = target
			.as_target()
			.map(|t| t.to_string())
			.unwrap_or_else(|| "None".to_string());
		match self.with_metadata(target, |values| values.get(key).cloned()) {
			None => Err(ReflectError::TargetNotFound(display)),
			Some(None) => Err(ReflectError::KeyNotFound {
				key: key.to_string(),
				target: display,
			}),
			Some(Some(value)) => Ok(value),
		}
	}

	/// Value under `key`, failing with [`ReflectError::MetadataKeyNotFound`]
	/// when it is absent.
	pub fn get_metadata_or_raise_exception(&self, key: &str, target: impl AsTarget) -> ReflectResult<MetadataValue> {
		self.get_metadata(key, target)
			.ok_or_else(|| ReflectError::MetadataKeyNotFound(key.to_string()))
	}

	/// Keys defined for `target`, in definition order.
	pub fn get_metadata_keys(&self, target: impl AsTarget) -> Vec<String> {
		self.with_metadata(target, |values| values.keys().cloned().collect())
			.unwrap_or_default()
	}

	/// Copy of every entry defined for `target`.
	pub fn get_all_metadata(&self, target: impl AsTarget) -> MetadataMap {
		self.with_metadata(target, MetadataMap::clone)
			.unwrap_or_default()
	}

	/// Remove `key` from `target`, returning the removed value.
	pub fn delete_metadata(&self, key: &str, target: impl AsTarget) -> Option<MetadataValue> {
		let resolved = resolve(target)?;
		let mut meta_data = self.meta_data.write();
		purge_dead(&mut meta_data);
		let removed = meta_data
			.get_mut(&resolved.key)
			.and_then(|entry| entry.values.shift_remove(key));
		if removed.is_some() {
			tracing::trace!(key, target = %resolved.display, "deleted metadata");
		}
		removed
	}

	/// Remove every entry of `target`. No-op for unknown targets.
	pub fn delete_all_metadata(&self, target: impl AsTarget) {
		let Some(resolved) = resolve(target) else {
			return;
		};
		let mut meta_data = self.meta_data.write();
		purge_dead(&mut meta_data);
		if meta_data.remove(&resolved.key).is_some() {
			tracing::trace!(target = %resolved.display, "deleted all metadata");
		}
	}

	/// Copy the metadata of `old_target` onto `new_target`.
	///
	/// See [`crate::transfer_metadata`].
	pub fn transfer_metadata(
		&self,
		old_target: impl AsTarget,
		new_target: impl AsTarget,
		clean_up: bool,
	) -> ReflectResult<()> {
		transfer_metadata(self, old_target, new_target, clean_up)
	}

	/// Drop the entries of collected objects, returning how many were removed.
	///
	/// Every other store operation does this on its own; calling it directly
	/// only matters for a store that is otherwise left untouched.
	pub fn purge(&self) -> usize {
		purge_dead(&mut self.meta_data.write())
	}

	/// Number of live targets carrying metadata.
	pub fn len(&self) -> usize {
		let mut meta_data = self.meta_data.write();
		purge_dead(&mut meta_data);
		meta_data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Remove all metadata of all targets.
	pub fn clear(&self) {
		self.meta_data.write().clear();
	}
}

impl Default for Reflect {
	fn default() -> Self {
		Self::new()
	}
}

/// Pending metadata definition returned by [`Reflect::metadata`].
#[must_use = "metadata is only defined once the decorator is applied"]
pub struct MetadataDecorator<'a> {
	reflect: &'a Reflect,
	key: String,
	value: MetadataValue,
}

impl MetadataDecorator<'_> {
	/// Define the metadata on `target` and return `target` itself.
	///
	/// # Errors
	///
	/// Returns [`ReflectError::InvalidTarget`] when `target` converts to `None`.
	pub fn apply<T: AsTarget>(self, target: T) -> ReflectResult<T> {
		self.reflect.define_metadata(&self.key, self.value, &target)?;
		Ok(target)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	struct Controller;

	#[fixture]
	fn reflect() -> Reflect {
		Reflect::new()
	}

	#[rstest]
	fn test_collected_object_metadata_disappears(reflect: Reflect) {
		// Arrange
		let handler = Arc::new(Controller);
		reflect.define_metadata("k", "v", &handler).unwrap();
		assert_eq!(reflect.len(), 1);

		// Act
		drop(handler);

		// Assert
		assert_eq!(reflect.len(), 0);
		assert!(reflect.meta_data.read().is_empty());
		assert_eq!(reflect.purge(), 0);
	}

	#[rstest]
	#[case::define_elsewhere(|reflect: &Reflect| reflect.define_metadata("other", 1, Target::of::<Controller>()).unwrap())]
	#[case::lookup_elsewhere(|reflect: &Reflect| assert!(!reflect.has_metadata("other", Target::of::<Controller>())))]
	#[case::delete_elsewhere(|reflect: &Reflect| assert!(reflect.delete_metadata("other", Target::of::<Controller>()).is_none()))]
	#[case::snapshot(|reflect: &Reflect| drop(reflect.snapshot()))]
	fn test_collected_object_values_are_released(reflect: Reflect, #[case] touch: fn(&Reflect)) {
		// Arrange
		struct Payload;
		let payload = Arc::new(Payload);
		let handler = Arc::new(Controller);
		reflect
			.define_metadata("payload", MetadataValue::Object(payload.clone()), &handler)
			.unwrap();
		assert_eq!(Arc::strong_count(&payload), 2);

		// Act
		drop(handler);
		touch(&reflect);

		// Assert
		assert_eq!(Arc::strong_count(&payload), 1);
		assert!(
			!reflect
				.meta_data
				.read()
				.values()
				.any(|entry| !entry.is_alive())
		);
	}

	#[rstest]
	fn test_lookup_of_collected_object_purges() {
		// Arrange
		let reflect = Reflect::new();
		let handler = Arc::new(Controller);
		let target = Target::object(&handler);
		reflect.define_metadata("k", "v", &target).unwrap();

		// Act
		drop(handler);
		let found = reflect.get_metadata("k", &target);

		// Assert
		assert_eq!(found, None);
		assert!(reflect.meta_data.read().is_empty());
	}

	#[rstest]
	fn test_custom_update_callback_overrides_builtin(reflect: Reflect) {
		// Arrange
		let target = Target::of::<Controller>();
		reflect.add_type_update_callback(ValueKind::List, |_, new| new);

		// Act
		reflect.define_metadata("k", MetadataValue::list(["a"]), &target).unwrap();
		reflect.define_metadata("k", MetadataValue::list(["b"]), &target).unwrap();

		// Assert
		assert_eq!(reflect.get_metadata("k", &target), Some(MetadataValue::list(["b"])));
	}

	#[rstest]
	fn test_callback_for_scalar_kind(reflect: Reflect) {
		// Arrange
		let target = Target::of::<Controller>();
		reflect.add_type_update_callback(ValueKind::Int, |existing, new| {
			match (existing.as_int(), new.as_int()) {
				(Some(a), Some(b)) => MetadataValue::Int(a + b),
				_ => new,
			}
		});

		// Act
		reflect.define_metadata("count", 2, &target).unwrap();
		reflect.define_metadata("count", 3, &target).unwrap();

		// Assert
		assert_eq!(reflect.get_metadata("count", &target), Some(MetadataValue::Int(5)));
	}

	#[rstest]
	fn test_redefinition_keeps_key_position(reflect: Reflect) {
		// Arrange
		let target = Target::of::<Controller>();
		reflect.define_metadata("first", 1, &target).unwrap();
		reflect.define_metadata("second", 2, &target).unwrap();

		// Act
		reflect.define_metadata("first", 10, &target).unwrap();

		// Assert
		assert_eq!(reflect.get_metadata_keys(&target), vec!["first", "second"]);
	}
}
