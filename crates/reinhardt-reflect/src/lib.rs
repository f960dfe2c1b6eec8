//! # Reinhardt Reflect
//!
//! Metadata reflection registry for Reinhardt.
//!
//! Attaches key/value metadata to types, functions and shared objects
//! without touching them. Controller and route wiring, dependency
//! injection and permission declarations are all built on top of it.
//!
//! ## Features
//!
//! - **Weakly held targets**: metadata on a shared object goes away once the
//!   object is dropped
//! - **Type-aware merging**: redefining a list, tuple, set or map merges with the
//!   existing value instead of replacing it
//! - **Wrapper resolution**: metadata set through a bound method, partial or
//!   wrapper lands on the original function
//! - **Contexts**: snapshot/restore of the whole store for test isolation
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_reflect::{MetadataValue, Target, reflect};
//!
//! struct ArticlesController;
//!
//! let target = Target::of::<ArticlesController>();
//! let _ctx = reflect().context();
//!
//! reflect().define_metadata("roles", MetadataValue::set(["editor"]), &target).unwrap();
//! reflect().define_metadata("roles", MetadataValue::set(["admin"]), &target).unwrap();
//!
//! assert_eq!(
//!     reflect().get_metadata("roles", &target),
//!     Some(MetadataValue::set(["admin", "editor"]))
//! );
//! ```

pub mod context;
pub mod error;
pub mod hashing;
pub mod reflect;
pub mod resolver;
pub mod target;
pub mod update;
pub mod value;

pub use context::{MetadataSnapshot, ReflectContext};
pub use error::{ReflectError, ReflectResult};
pub use hashing::{Hashable, force_hash};
pub use reflect::{MetadataDecorator, Reflect, UpdateCallback};
pub use resolver::{ensure_target, fail_silently, get_original_target, transfer_metadata};
pub use target::{AsTarget, BoundMethod, FunctionTarget, ObjectTarget, Target, TypeTarget, ValueTarget};
pub use value::{MetadataMap, MetadataValue, ValueKind};

use once_cell::sync::Lazy;

// Global store instance
static REFLECT: Lazy<Reflect> = Lazy::new(Reflect::new);

/// The process-wide metadata store.
pub fn reflect() -> &'static Reflect {
	&REFLECT
}
