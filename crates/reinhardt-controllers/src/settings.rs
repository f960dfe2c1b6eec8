//! Controller settings
//!
//! Settings are loaded from TOML. Every field is optional:
//!
//! ```toml
//! default_permissions = ["IsAuthenticated"]
//! auto_import = true
//! pagination_per_page = 50
//!
//! [throttle_rates]
//! user = "1000/day"
//! burst = "10/min"
//! ```

use crate::error::{ControllerError, ControllerResult};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use reinhardt_permissions::{
	AllowAny, IsAdminUser, IsAuthenticated, IsAuthenticatedOrReadOnly, PermissionClass, PermissionExpr,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Throttle scopes that always exist, unthrottled unless configured.
pub const DEFAULT_THROTTLE_SCOPES: [&str; 2] = ["user", "anon"];

/// Settings of the controller layer.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtraSettings {
	/// Permission class names used by controllers declaring none.
	#[serde(default = "default_permissions")]
	pub default_permissions: Vec<String>,

	/// Whether controllers join the process-wide registry by default.
	#[serde(default = "default_auto_import")]
	pub auto_import: bool,

	/// Default page size.
	#[serde(default = "default_pagination_per_page")]
	pub pagination_per_page: usize,

	/// Throttle rates keyed by scope, `None` meaning unthrottled.
	#[serde(default)]
	pub throttle_rates: IndexMap<String, Option<String>>,
}

fn default_permissions() -> Vec<String> {
	vec!["AllowAny".to_string()]
}

fn default_auto_import() -> bool {
	true
}

fn default_pagination_per_page() -> usize {
	100
}

impl Default for ExtraSettings {
	fn default() -> Self {
		let mut settings = Self {
			default_permissions: default_permissions(),
			auto_import: default_auto_import(),
			pagination_per_page: default_pagination_per_page(),
			throttle_rates: IndexMap::new(),
		};
		settings.fill_default_scopes();
		settings
	}
}

impl ExtraSettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse and validate settings from TOML.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_controllers::settings::ExtraSettings;
	///
	/// let settings = ExtraSettings::from_toml_str(r#"
	///     pagination_per_page = 20
	///     [throttle_rates]
	///     user = "50/min"
	/// "#).unwrap();
	///
	/// assert_eq!(settings.pagination_per_page, 20);
	/// assert!(settings.auto_import);
	/// assert_eq!(settings.throttle_rates["anon"], None);
	/// ```
	pub fn from_toml_str(source: &str) -> ControllerResult<Self> {
		let mut settings: Self = toml::from_str(source)?;
		settings.fill_default_scopes();
		settings.validate()?;
		Ok(settings)
	}

	/// Check every configured throttle rate.
	pub fn validate(&self) -> ControllerResult<()> {
		for (scope, rate) in &self.throttle_rates {
			if let Some(rate) = rate {
				ThrottleRate::parse(scope, rate)?;
			}
		}
		Ok(())
	}

	/// Parsed rate of `scope`; `Ok(None)` for a known but unthrottled scope.
	pub fn throttle_rate(&self, scope: &str) -> ControllerResult<Option<ThrottleRate>> {
		match self.throttle_rates.get(scope) {
			None => Err(ControllerError::UnknownThrottleScope(scope.to_string())),
			Some(None) => Ok(None),
			Some(Some(rate)) => ThrottleRate::parse(scope, rate).map(Some),
		}
	}

	fn fill_default_scopes(&mut self) {
		for scope in DEFAULT_THROTTLE_SCOPES {
			self.throttle_rates.entry(scope.to_string()).or_insert(None);
		}
	}
}

/// A parsed `<count>/<period>` throttle rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRate {
	pub num_requests: u64,
	pub duration: Duration,
}

impl ThrottleRate {
	/// Parse `rate` configured for `scope`.
	pub fn parse(scope: &str, rate: &str) -> ControllerResult<Self> {
		let invalid = || ControllerError::InvalidThrottleRate {
			scope: scope.to_string(),
			rate: rate.to_string(),
		};

		let (count, period) = rate.split_once('/').ok_or_else(invalid)?;
		let num_requests = count.trim().parse::<u64>().map_err(|_| invalid())?;
		let seconds = match period.trim() {
			"s" | "sec" | "second" => 1,
			"m" | "min" | "minute" => 60,
			"h" | "hour" => 60 * 60,
			"d" | "day" => 24 * 60 * 60,
			_ => return Err(invalid()),
		};

		Ok(Self {
			num_requests,
			duration: Duration::from_secs(seconds),
		})
	}
}

static SETTINGS: Lazy<RwLock<Arc<ExtraSettings>>> = Lazy::new(|| RwLock::new(Arc::new(ExtraSettings::default())));

/// The current process-wide settings.
pub fn settings() -> Arc<ExtraSettings> {
	Arc::clone(&SETTINGS.read())
}

/// Replace the process-wide settings.
pub fn reload_settings(settings: ExtraSettings) {
	tracing::debug!(
		default_permissions = ?settings.default_permissions,
		auto_import = settings.auto_import,
		"reloaded controller settings"
	);
	*SETTINGS.write() = Arc::new(settings);
}

/// Permission classes addressable by name from settings.
pub struct PermissionRegistry {
	classes: RwLock<IndexMap<String, PermissionClass>>,
}

impl PermissionRegistry {
	/// Registry holding the built-in classes.
	pub fn new() -> Self {
		let registry = Self {
			classes: RwLock::new(IndexMap::new()),
		};
		registry.register(PermissionClass::of::<AllowAny>());
		registry.register(PermissionClass::of::<IsAuthenticated>());
		registry.register(PermissionClass::of::<IsAdminUser>());
		registry.register(PermissionClass::of::<IsAuthenticatedOrReadOnly>());
		registry
	}

	/// Register `class` under its name, replacing any previous class.
	pub fn register(&self, class: PermissionClass) {
		self.classes.write().insert(class.name().to_string(), class);
	}

	pub fn get(&self, name: &str) -> Option<PermissionClass> {
		self.classes.read().get(name).cloned()
	}

	pub fn names(&self) -> Vec<String> {
		self.classes.read().keys().cloned().collect()
	}

	/// Resolve class names, failing on the first unknown one.
	pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> ControllerResult<Vec<PermissionExpr>> {
		names
			.iter()
			.map(|name| {
				self.get(name.as_ref())
					.map(PermissionExpr::from)
					.ok_or_else(|| ControllerError::UnknownPermission(name.as_ref().to_string()))
			})
			.collect()
	}
}

impl Default for PermissionRegistry {
	fn default() -> Self {
		Self::new()
	}
}

static PERMISSION_REGISTRY: Lazy<PermissionRegistry> = Lazy::new(PermissionRegistry::new);

/// The process-wide permission class registry.
pub fn permission_registry() -> &'static PermissionRegistry {
	&PERMISSION_REGISTRY
}

/// Permission classes named by `default_permissions` in the current settings.
pub fn default_permission_classes() -> ControllerResult<Vec<PermissionExpr>> {
	permission_registry().resolve(&settings().default_permissions)
}
