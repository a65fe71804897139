//! Common utilities for the anchor positioning polyfill.
//!
//! This crate provides shared infrastructure used by every component:
//! - **Warning System** - deduplicated warnings routed through the `log` facade

pub mod warning;
