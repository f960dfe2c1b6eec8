//! Hashing adapter
//!
//! Makes every target usable as a store key. Types, functions and shared
//! objects key the store by identity; plain values, which cannot be weakly
//! referenced, are replaced by a [`Hashable`] surrogate capturing their
//! identity and representation at wrap time.

use crate::target::Target;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Process-wide side table of surrogates, keyed by `hash((id, repr))`.
static UN_HASHABLE: Lazy<Mutex<HashMap<u64, Arc<Hashable>>>> =
	Lazy::new(|| Mutex::new(HashMap::new()));

/// Surrogate identity for an unhashable item.
///
/// Equality looks at the captured identity only, while the hash covers both
/// identity and representation.
pub struct Hashable {
	item_id: usize,
	item_repr: String,
}

impl Hashable {
	fn new(item_id: usize, item_repr: String) -> Self {
		Self { item_id, item_repr }
	}

	pub fn item_id(&self) -> usize {
		self.item_id
	}

	pub fn item_repr(&self) -> &str {
		&self.item_repr
	}

	fn table_hash(&self) -> u64 {
		surrogate_hash(self.item_id, &self.item_repr)
	}
}

impl Hash for Hashable {
	fn hash<H: Hasher>(&self, state: &mut H) {
		(self.item_id, &self.item_repr).hash(state);
	}
}

impl PartialEq for Hashable {
	fn eq(&self, other: &Self) -> bool {
		self.item_id == other.item_id
	}
}

impl Eq for Hashable {}

impl fmt::Debug for Hashable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.item_repr)
	}
}

impl fmt::Display for Hashable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.item_repr)
	}
}

fn surrogate_hash(item_id: usize, item_repr: &str) -> u64 {
	let mut hasher = DefaultHasher::new();
	(item_id, item_repr).hash(&mut hasher);
	hasher.finish()
}

/// Whether the target can key the store directly (it is hashable and can be
/// weakly referenced, or is never collected at all).
fn try_hash(item: &Target) -> bool {
	!matches!(item, Target::Value(_))
}

/// Return `item` unchanged when it can key the store, otherwise the surrogate
/// registered for its `(id, repr)` pair, creating one if none exists yet.
///
/// The lookup uses the representation captured *now*. An item whose `Debug`
/// output changed since it was first wrapped therefore gets a second,
/// distinct surrogate.
///
/// # Examples
///
/// ```
/// use reinhardt_reflect::{Target, force_hash};
///
/// let item = vec![1, 2, 3];
/// let first = force_hash(Target::value(&item));
/// let second = force_hash(Target::value(&item));
/// assert_eq!(first, second);
/// ```
pub fn force_hash(item: Target) -> Target {
	if try_hash(&item) {
		return item;
	}
	let Target::Value(value) = &item else {
		return item;
	};

	let key = surrogate_hash(value.id(), value.repr());
	let mut table = UN_HASHABLE.lock();
	if let Some(existing) = table.get(&key) {
		return Target::Surrogate(Arc::clone(existing));
	}

	let hashable = Arc::new(Hashable::new(value.id(), value.repr().to_string()));
	tracing::debug!(
		item_id = value.id(),
		item_repr = %value.repr(),
		"registered surrogate for unhashable target"
	);
	table.insert(hashable.table_hash(), Arc::clone(&hashable));
	Target::Surrogate(hashable)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_hashable_targets_pass_through() {
		// Arrange
		struct Controller;
		let target = Target::of::<Controller>();

		// Act
		let hashed = force_hash(target.clone());

		// Assert
		assert_eq!(hashed, target);
	}

	#[rstest]
	fn test_rewrap_returns_same_surrogate() {
		// Arrange
		let item = String::from("rewrap");

		// Act
		let first = force_hash(Target::value(&item));
		let second = force_hash(Target::value(&item));

		// Assert
		match (&first, &second) {
			(Target::Surrogate(a), Target::Surrogate(b)) => assert!(Arc::ptr_eq(a, b)),
			other => panic!("expected surrogates, got {other:?}"),
		}
	}

	#[rstest]
	fn test_changed_repr_creates_distinct_surrogate() {
		// Arrange
		let id = 0xdead_0001;

		// Act
		let before = force_hash(Target::unhashable(id, "state=1"));
		let after = force_hash(Target::unhashable(id, "state=2"));

		// Assert
		assert_ne!(before, after);
		match (&before, &after) {
			// Same identity, so the surrogates themselves compare equal.
			(Target::Surrogate(a), Target::Surrogate(b)) => assert_eq!(**a, **b),
			other => panic!("expected surrogates, got {other:?}"),
		}
	}

	#[rstest]
	fn test_surrogate_display_uses_repr() {
		// Act
		let hashed = force_hash(Target::unhashable(0xdead_0002, "Ellar"));

		// Assert
		assert_eq!(hashed.to_string(), "Ellar");
	}
}
