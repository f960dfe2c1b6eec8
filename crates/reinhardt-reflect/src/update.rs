//! Built-in update callbacks
//!
//! Each callback receives the existing value and the newly defined one and
//! returns what gets stored. When the two values are not of compatible
//! kinds, the new value wins.

use crate::value::MetadataValue;

/// Concatenate two sequences, keeping the existing value's kind.
///
/// Lists and tuples mix freely: a tuple extended with a list stays a tuple.
pub fn list_update(existing: MetadataValue, new: MetadataValue) -> MetadataValue {
	match (existing, new) {
		(MetadataValue::List(mut items), MetadataValue::List(more) | MetadataValue::Tuple(more)) => {
			items.extend(more);
			MetadataValue::List(items)
		}
		(MetadataValue::Tuple(mut items), MetadataValue::List(more) | MetadataValue::Tuple(more)) => {
			items.extend(more);
			MetadataValue::Tuple(items)
		}
		(_, new) => new,
	}
}

/// Union of two sets. Existing items keep their position.
pub fn set_update(existing: MetadataValue, new: MetadataValue) -> MetadataValue {
	match (existing, new) {
		(MetadataValue::Set(mut items), MetadataValue::Set(more)) => {
			for item in more {
				if !items.contains(&item) {
					items.push(item);
				}
			}
			MetadataValue::Set(items)
		}
		(_, new) => new,
	}
}

/// Update the existing mapping with the new one; new values win on
/// colliding keys.
pub fn dict_update(existing: MetadataValue, new: MetadataValue) -> MetadataValue {
	match (existing, new) {
		(MetadataValue::Map(mut map), MetadataValue::Map(more)) => {
			map.extend(more);
			MetadataValue::Map(map)
		}
		(_, new) => new,
	}
}

/// Fallback for kinds without a registered callback.
pub fn replace_update(_existing: MetadataValue, new: MetadataValue) -> MetadataValue {
	new
}
