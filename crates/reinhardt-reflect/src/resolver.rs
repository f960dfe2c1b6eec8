//! Target resolution
//!
//! Metadata attached through a wrapper must land on, and be readable from,
//! the original function. The helpers here peel wrappers off a [`Target`]
//! before the store sees it.

use crate::error::ReflectResult;
use crate::hashing::force_hash;
use crate::reflect::Reflect;
use crate::target::{AsTarget, Target};
use std::fmt::Display;

/// Replace a bound method with the function implementing it.
///
/// # Examples
///
/// ```
/// use reinhardt_reflect::{Target, ensure_target};
///
/// struct UsersController;
/// fn list_users() {}
///
/// let function = Target::function(list_users as usize);
/// let method = Target::method(Target::of::<UsersController>(), function.clone());
/// assert_eq!(ensure_target(method), function);
/// ```
pub fn ensure_target(target: Target) -> Target {
	match target {
		Target::Method(method) => method.function,
		other => other,
	}
}

pub fn is_decorated_with_partial(target: &Target) -> bool {
	matches!(target, Target::Partial(_))
}

pub fn is_decorated_with_wraps(target: &Target) -> bool {
	matches!(target, Target::Wraps(_))
}

/// Unwrap partial applications and back-referencing wrappers until neither
/// applies, returning the innermost target.
pub fn get_original_target(mut target: Target) -> Target {
	loop {
		target = match target {
			Target::Partial(inner) | Target::Wraps(inner) => *inner,
			other => return other,
		};
	}
}

/// The key form of `target`: unwrapped, method-resolved, then forced hashable.
///
/// A bound method wrapping a partial (or any other nesting) is peeled
/// repeatedly, so no wrapper shape ever keys the store.
pub(crate) fn actual_target(target: Target) -> Target {
	let mut target = target;
	loop {
		target = ensure_target(get_original_target(target));
		if !target.is_wrapper() {
			return force_hash(target);
		}
	}
}

/// Copy every metadata entry of `old_target` onto `new_target`.
///
/// Entries go through [`Reflect::define_metadata`], so structural values
/// merge with what `new_target` already holds. With `clean_up`, the old
/// target's metadata is deleted afterwards.
pub fn transfer_metadata(
	reflect: &Reflect,
	old_target: impl AsTarget,
	new_target: impl AsTarget,
	clean_up: bool,
) -> ReflectResult<()> {
	let old_target = old_target.as_target();
	let new_target = new_target.as_target();

	for (key, value) in reflect.get_all_metadata(&old_target) {
		reflect.define_metadata(&key, value, &new_target)?;
	}

	if clean_up {
		reflect.delete_all_metadata(&old_target);
	}
	Ok(())
}

/// Run `func`, turning any error into `None`.
///
/// The failure is logged at debug level.
///
/// # Examples
///
/// ```
/// use reinhardt_reflect::fail_silently;
///
/// assert_eq!(fail_silently(|| "42".parse::<u32>()), Some(42));
/// assert_eq!(fail_silently(|| "forty-two".parse::<u32>()), None);
/// ```
pub fn fail_silently<T, E, F>(func: F) -> Option<T>
where
	F: FnOnce() -> Result<T, E>,
	E: Display,
{
	match func() {
		Ok(value) => Some(value),
		Err(err) => {
			tracing::debug!(
				func = std::any::type_name::<F>(),
				error = %err,
				"calling {} failed",
				std::any::type_name::<F>()
			);
			None
		}
	}
}
