//! Controller registry

use crate::controller::ApiController;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use reinhardt_reflect::{AsTarget, Target};

/// Controllers available for automatic discovery, keyed by their full name.
pub struct ControllerRegistry {
	controllers: RwLock<IndexMap<String, Target>>,
}

impl ControllerRegistry {
	pub fn new() -> Self {
		Self {
			controllers: RwLock::new(IndexMap::new()),
		}
	}

	/// The process-wide registry.
	pub fn global() -> &'static ControllerRegistry {
		&GLOBAL_REGISTRY
	}

	/// Register `controller` unless its configuration opts out of auto import.
	pub fn add_controller(&self, controller: Target, config: &ApiController) {
		if !config.is_auto_import() {
			tracing::debug!(controller = %controller, "skipped controller without auto import");
			return;
		}
		let key = controller.to_string();
		tracing::debug!(controller = %key, "registered controller");
		self.controllers.write().insert(key, controller);
	}

	/// Remove `controller`, returning it if it was registered.
	pub fn remove_controller(&self, controller: impl AsTarget) -> Option<Target> {
		let key = controller.as_target()?.to_string();
		let removed = self.controllers.write().shift_remove(&key);
		if removed.is_some() {
			tracing::debug!(controller = %key, "removed controller");
		}
		removed
	}

	pub fn clear_controllers(&self) {
		self.controllers.write().clear();
	}

	/// Snapshot of the registered controllers, in registration order.
	pub fn get_controllers(&self) -> IndexMap<String, Target> {
		self.controllers.read().clone()
	}

	pub fn contains(&self, controller: impl AsTarget) -> bool {
		controller
			.as_target()
			.is_some_and(|target| self.controllers.read().contains_key(&target.to_string()))
	}

	pub fn len(&self) -> usize {
		self.controllers.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for ControllerRegistry {
	fn default() -> Self {
		Self::new()
	}
}

static GLOBAL_REGISTRY: Lazy<ControllerRegistry> = Lazy::new(ControllerRegistry::new);
