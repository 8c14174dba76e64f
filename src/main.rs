//! Ordered Cache - demo driver
//!
//! Seeds a shared store, builds a proxy view over part of it, and prints a
//! JSON report of what the view sees.

use std::rc::Rc;

use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ordered_cache::{Cache, Config, OrderedMap, ProxyCache};

/// Entry point for the demo driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Seed the shared store and build a view over every n-th key
/// 4. Query the view, prune a copy of the store, drop a member from the store
/// 5. Print the JSON report
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordered_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: seed_entries={}, view_stride={}, sweep_threshold={}",
        config.seed_entries, config.view_stride, config.sweep_threshold
    );

    let shared = (0..config.seed_entries)
        .map(|i| (format!("key_{:03}", i), i as u64))
        .collect::<Cache<String, u64>>()
        .into_shared();

    let members: Vec<String> = shared
        .borrow()
        .keys()
        .step_by(config.view_stride.max(1))
        .cloned()
        .collect();
    let mut view = ProxyCache::new(Rc::clone(&shared), members);

    let total = view.reduce(|acc, value, _, _| acc + value, 0u64);
    info!("View holds {} entries summing to {}", view.len(), total);

    if let Err(err) = view.try_set("missing".to_string()) {
        warn!("{}", err);
    }

    let mut pruned = shared.borrow().clone();
    let threshold = config.sweep_threshold;
    let swept = pruned.sweep(|value, _, _| *value < threshold);
    info!("Swept {} entries from the pruned copy", swept);

    // Dropping a member from the store leaves a stale membership entry
    if let Some(key) = view.first_key() {
        shared.borrow_mut().delete(&key);
        info!("Removed {} from the backing store", key);
    }

    let report = json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "store_entries": shared.borrow().len(),
        "view": view.stats(),
        "view_keys": view.keys().collect::<Vec<_>>(),
        "view_total": total,
        "pruned_entries": pruned.len(),
        "swept": swept,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
