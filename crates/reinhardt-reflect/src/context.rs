//! Transactional metadata contexts
//!
//! A context snapshots the whole store on entry and puts the snapshot back
//! on exit, discarding every mutation made in between. The restore is a
//! whole-store replace, not a per-key diff, and it also runs while unwinding
//! from a panic.

use crate::reflect::{MetadataTable, Reflect, purge_dead};
use std::future::Future;

/// Shallow copy of every live target's metadata.
pub struct MetadataSnapshot {
	table: MetadataTable,
}

impl MetadataSnapshot {
	/// Number of targets captured.
	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}
}

impl Reflect {
	/// Copy the current contents of the store.
	pub fn snapshot(&self) -> MetadataSnapshot {
		let mut meta_data = self.meta_data.write();
		purge_dead(&mut meta_data);
		MetadataSnapshot {
			table: meta_data.clone(),
		}
	}

	/// Replace the store's contents with `snapshot`.
	pub fn restore(&self, snapshot: MetadataSnapshot) {
		let mut meta_data = self.meta_data.write();
		*meta_data = snapshot.table;
		// Objects captured by the snapshot may have died since.
		purge_dead(&mut meta_data);
	}

	/// Enter a metadata context. Mutations made while the returned guard is
	/// alive are rolled back when it drops.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reflect::{Reflect, Target};
	///
	/// struct UsersController;
	///
	/// let reflect = Reflect::new();
	/// let target = Target::of::<UsersController>();
	/// reflect.define_metadata("kept", true, &target).unwrap();
	///
	/// {
	///     let _ctx = reflect.context();
	///     reflect.define_metadata("discarded", true, &target).unwrap();
	///     assert!(reflect.has_metadata("discarded", &target));
	/// }
	///
	/// assert!(reflect.has_metadata("kept", &target));
	/// assert!(!reflect.has_metadata("discarded", &target));
	/// ```
	pub fn context(&self) -> ReflectContext<'_> {
		let snapshot = self.snapshot();
		tracing::debug!(targets = snapshot.len(), "entered metadata context");
		ReflectContext {
			reflect: self,
			snapshot: Some(snapshot),
		}
	}

	/// Run `body` inside a metadata context.
	///
	/// The store is restored once `body` completes, or if it is dropped
	/// before completing.
	pub async fn async_context<F>(&self, body: F) -> F::Output
	where
		F: Future,
	{
		let _ctx = self.context();
		body.await
	}
}

/// Guard returned by [`Reflect::context`].
#[must_use = "the context is exited as soon as the guard is dropped"]
pub struct ReflectContext<'a> {
	reflect: &'a Reflect,
	snapshot: Option<MetadataSnapshot>,
}

impl ReflectContext<'_> {
	/// Exit the context now.
	pub fn exit(mut self) {
		self.rollback();
	}

	fn rollback(&mut self) {
		if let Some(snapshot) = self.snapshot.take() {
			tracing::debug!(targets = snapshot.len(), "exiting metadata context");
			self.reflect.restore(snapshot);
		}
	}
}

impl Drop for ReflectContext<'_> {
	fn drop(&mut self) {
		self.rollback();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Target;
	use rstest::rstest;
	use std::panic::{AssertUnwindSafe, catch_unwind};

	struct Controller;

	#[rstest]
	fn test_rollback_on_panic() {
		// Arrange
		let reflect = Reflect::new();
		let target = Target::of::<Controller>();

		// Act
		let result = catch_unwind(AssertUnwindSafe(|| {
			let _ctx = reflect.context();
			reflect.define_metadata("inside", 1, &target).unwrap();
			panic!("boom");
		}));

		// Assert
		assert!(result.is_err());
		assert!(!reflect.has_metadata("inside", &target));
	}

	#[rstest]
	fn test_explicit_exit() {
		// Arrange
		let reflect = Reflect::new();
		let target = Target::of::<Controller>();
		let ctx = reflect.context();
		reflect.define_metadata("inside", 1, &target).unwrap();

		// Act
		ctx.exit();

		// Assert
		assert!(reflect.is_empty());
	}
}
