// src/status/mod.rs
// =============================================================================
// Partner-link status cache.
//
// Submodules:
// - model: wire format of the prober's JSON and the persisted envelope
// - severity: latency -> severity tag and display text
// - store: key-value storage for the envelope (file or memory)
// - source: fetches the snapshot (HTTP via reqwest)
// - cache: StatusCache, the freshness window and the single-fetch guard
//
// `from_config` wires the default pieces together for the CLI.
// =============================================================================

mod cache;
mod model;
mod severity;
mod source;
mod store;

pub use cache::{CacheState, Clock, FetchOutcome, StatusCache, SystemClock};
pub use model::{normalize_link, CacheEnvelope, LinkStatus, StatusSnapshot, UNKNOWN_LATENCY};
pub use severity::{classify, Severity, StatusInfo, UNKNOWN_TEXT};
pub use source::{HttpStatusSource, StatusSource};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::config::StatusConfig;
use crate::error::StatusError;

/// Builds a cache that fetches over HTTP and persists under the cache directory
pub fn from_config(config: &StatusConfig) -> Result<StatusCache, StatusError> {
    let source = HttpStatusSource::new(config.endpoint.clone(), config.request_timeout())?;
    let store = FileStore::new(config.resolved_cache_dir());

    tracing::debug!(
        endpoint = %source.endpoint(),
        cache_dir = %store.dir().display(),
        "status cache configured"
    );

    Ok(StatusCache::new(
        Box::new(source),
        Box::new(store),
        config.cache_key.clone(),
        config.freshness_window(),
    ))
}
