//! Ordered Cache - ordered in-memory containers
//!
//! Provides an insertion-ordered cache with a query surface and lightweight
//! proxy views that expose a chosen subset of a shared cache.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, OrderedMap, ProxyCache, SharedStore, ViewStats};
pub use config::Config;
pub use error::{CacheError, Result};
