// src/status/cache.rs
// =============================================================================
// Time-bounded cache of the partner-link status snapshot.
//
// State machine (staleness is checked lazily, on each ensure_fresh call):
//
//   Empty --ensure_fresh--> Fetching --ok--> Hit
//                                    \--err-> Error
//   Hit / Error --(envelope older than the freshness window)--> fetch again
//
// ensure_fresh():
// 1. A fetch is already running?  Return right away (Coalesced). The caller
//    sees the running fetch's result through the shared state once it lands.
// 2. The persisted envelope is younger than the window?  Adopt it (CacheHit).
// 3. Otherwise fetch, adopt, and persist a new envelope (Fetched), or record
//    the error and keep whatever snapshot we had (Failed).
//
// The state lives behind a std Mutex that is never held across an .await;
// the is_fetching flag is the only thing that spans the network call.
// =============================================================================

use super::model::{CacheEnvelope, LinkStatus, StatusSnapshot};
use super::severity::{self, StatusInfo};
use super::source::StatusSource;
use super::store::KeyValueStore;
use crate::error::StatusError;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Source of "now" in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub snapshot: Option<Arc<StatusSnapshot>>,
    pub is_fetching: bool,
    pub last_error: Option<String>,
}

/// What a call to ensure_fresh did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Another call is fetching; nothing was started
    Coalesced,
    /// A fresh envelope was adopted, no network call
    CacheHit,
    /// A new snapshot was fetched and persisted
    Fetched,
    /// The fetch failed; the message is also in last_error
    Failed(String),
}

pub struct StatusCache {
    source: Box<dyn StatusSource>,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    cache_key: String,
    freshness_window: Duration,
    state: Mutex<CacheState>,
}

impl StatusCache {
    pub fn new(
        source: Box<dyn StatusSource>,
        store: Box<dyn KeyValueStore>,
        cache_key: impl Into<String>,
        freshness_window: Duration,
    ) -> Self {
        Self::with_clock(source, store, Box::new(SystemClock), cache_key, freshness_window)
    }

    pub fn with_clock(
        source: Box<dyn StatusSource>,
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        cache_key: impl Into<String>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            cache_key: cache_key.into(),
            freshness_window,
            state: Mutex::new(CacheState::default()),
        }
    }

    // Makes sure the snapshot is fresh, fetching it if needed
    //
    // Steps:
    //   1. Another call is fetching -> Coalesced (no second fetch, no waiting)
    //   2. Persisted envelope younger than the window -> CacheHit
    //   3. Otherwise fetch -> Fetched, or Failed(message) on error
    //
    // Returns: what this call did, so callers (and tests) can tell them apart
    //
    // The is_fetching flag is owned by a FetchingGuard while the fetch is in
    // flight, so it is cleared even if this future is dropped mid-fetch.
    pub async fn ensure_fresh(&self) -> FetchOutcome {
        if self.is_fetching() {
            tracing::debug!("status fetch already in flight, coalescing");
            return FetchOutcome::Coalesced;
        }

        // Disk I/O and JSON parsing happen outside the state lock
        let cached = self.read_fresh_envelope();

        let mut guard = {
            let mut state = self.lock_state();

            // Re-check: another call may have started while we were reading
            if state.is_fetching {
                tracing::debug!("status fetch already in flight, coalescing");
                return FetchOutcome::Coalesced;
            }

            if let Some(snapshot) = cached {
                state.snapshot = Some(Arc::new(snapshot));
                state.last_error = None;
                return FetchOutcome::CacheHit;
            }

            state.is_fetching = true;
            FetchingGuard::new(&self.state)
        };

        // The lock is released here; this is the only suspension point
        let result = self.source.fetch().await;

        let mut state = self.lock_state();
        state.is_fetching = false;
        guard.disarm();

        match result {
            Ok(snapshot) => {
                tracing::info!(links = snapshot.link_status.len(), "fetched link status snapshot");
                self.persist(&snapshot);
                state.snapshot = Some(Arc::new(snapshot));
                state.last_error = None;
                FetchOutcome::Fetched
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "error fetching link status");
                state.last_error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    // Finds the status entry for one partner link
    //
    // Parameters:
    //   link: the link as the page renders it, with or without a trailing '/'
    //
    // Returns: None until a snapshot has been adopted, or when the link is not
    // in it
    //
    // Example (snapshot has "https://x.com/"):
    //   lookup("https://x.com")  -> Some(..)
    //   lookup("https://x.com/") -> Some(..)
    pub fn lookup(&self, link: &str) -> Option<LinkStatus> {
        let snapshot = self.snapshot()?;
        snapshot.find(link).cloned()
    }

    /// Severity and display text for `link`, if the snapshot has it
    pub fn status_info(&self, link: &str) -> Option<StatusInfo> {
        self.lookup(link).map(|status| severity::classify(&status))
    }

    pub fn snapshot(&self) -> Option<Arc<StatusSnapshot>> {
        self.lock_state().snapshot.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.lock_state().is_fetching
    }

    // A poisoned lock only means a panic happened mid-update elsewhere; the
    // state is plain data, so keep using it
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Reads the persisted envelope and checks its age
    //
    // Returns:
    //   Some(snapshot) if the envelope exists, parses, and its age is in
    //   [0, window). Envelopes from the future count as stale.
    //   None for a missing, corrupt (logged), or expired envelope
    //
    // Example (window = 30 min):
    //   fetched 29 minutes ago -> Some(...)
    //   fetched 31 minutes ago -> None
    fn read_fresh_envelope(&self) -> Option<StatusSnapshot> {
        let envelope = match self.read_envelope() {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable status cache");
                return None;
            }
        };

        let age_ms = self.clock.now_ms() - envelope.timestamp;
        let window_ms = i64::try_from(self.freshness_window.as_millis()).unwrap_or(i64::MAX);

        if (0..window_ms).contains(&age_ms) {
            tracing::debug!(age_ms, "serving link status from cache");
            Some(envelope.data)
        } else {
            tracing::debug!(age_ms, "status cache expired");
            None
        }
    }

    fn read_envelope(&self) -> Result<Option<CacheEnvelope>, StatusError> {
        let raw = match self.store.get(&self.cache_key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let envelope = serde_json::from_str(&raw).map_err(|e| StatusError::CacheRead(e.to_string()))?;
        Ok(Some(envelope))
    }

    // Persists a new envelope stamped with the current time
    //
    // Parameters:
    //   snapshot: the snapshot that was just fetched
    //
    // The old envelope is overwritten wholesale. A write failure is logged and
    // otherwise ignored: the snapshot is still used for this session.
    fn persist(&self, snapshot: &StatusSnapshot) {
        let envelope = CacheEnvelope {
            data: snapshot.clone(),
            timestamp: self.clock.now_ms(),
        };

        let result = serde_json::to_string(&envelope)
            .map_err(|e| StatusError::CacheWrite(e.to_string()))
            .and_then(|json| self.store.set(&self.cache_key, &json));

        if let Err(e) = result {
            tracing::warn!(error = %e, "could not persist link status cache");
        }
    }
}

// Clears is_fetching when dropped, unless disarmed first.
//
// ensure_fresh disarms it after clearing the flag itself under the lock, so
// only an abandoned fetch (future dropped by timeout or select!) hits Drop.
struct FetchingGuard<'a> {
    state: &'a Mutex<CacheState>,
    armed: bool,
}

impl<'a> FetchingGuard<'a> {
    fn new(state: &'a Mutex<CacheState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("status fetch abandoned, releasing fetch flag");
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.is_fetching = false;
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a std Mutex in async code?
//    - The lock is only held for short, synchronous sections
//    - It is always dropped before the .await on the network fetch
//    - tokio's Mutex is only needed when a guard must live across an .await
//
// 2. Why Box<dyn StatusSource> instead of a generic parameter?
//    - The cache is built once per session, so dynamic dispatch costs nothing
//    - Tests swap in a fake source, a memory store and a manual clock without
//      changing the StatusCache type
//
// 3. Why a guard struct for is_fetching?
//    - A future can be dropped at any .await (timeout, select!)
//    - Code after the .await then never runs, but Drop always does
//
// 4. What does tokio::join! do in the tests?
//    - Polls both futures on the same task, one after the other
//    - The first one parks at the fetch's .await, the second one then sees
//      is_fetching == true and returns Coalesced
// -----------------------------------------------------------------------------
