//! Metadata registry module.
//!
//! # Examples
//!
//! ```rust,no_run
//! use reinhardt_extra::reflect::{MetadataValue, Target, reflect};
//! ```

pub use reinhardt_reflect::*;
