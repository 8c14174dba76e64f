//! Cache Module
//!
//! Ordered in-memory containers: [`Cache`] owns its entries, [`ProxyCache`]
//! is a filtered view over a shared `Cache`. Both get their query surface
//! from [`OrderedMap`].

mod ordered;
mod proxy;
mod stats;
mod store;


// Re-export public types
pub use ordered::OrderedMap;
pub use proxy::{Entries, ProxyCache, SharedStore};
pub use stats::ViewStats;
pub use store::Cache;
