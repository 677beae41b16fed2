//! lifemap - lifecycle mapping resolution and discovery
//!
//! Thin facade over `lifemap-core`; the workspace's end-to-end tests live
//! next to this crate.
pub use lifemap_core::*;
