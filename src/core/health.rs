//! Time-bounded cache of server health lookups.
//!
//! Successful lookups and cacheable failures (see
//! [`McpdError::is_cacheable`]) are remembered per server until their TTL
//! runs out. Other failures are never stored, so the next lookup goes back
//! to the daemon.
//!
//! The cache holds at most [`MAX_ENTRIES`] entries. When full, expired
//! entries are purged first and then the least recently inserted entry is
//! evicted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::error::{McpdError, Result};
use super::types::ServerHealth;

/// Upper bound on cached servers.
pub const MAX_ENTRIES: usize = 100;

/// Default lifetime of a cached health lookup.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// How long health lookups stay cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// Never store anything; every lookup is live.
    Disabled,
    /// Entries expire after the duration.
    Expires(Duration),
    /// Entries live until invalidated.
    Forever,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::Expires(DEFAULT_TTL)
    }
}

impl CacheTtl {
    /// Build from seconds: `0` disables caching, infinity never expires.
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if secs.is_nan() || secs < 0.0 {
            return Err(McpdError::Config(format!(
                "health cache TTL must be zero, positive or infinite, got {secs}"
            )));
        }
        if secs <= 0.0 {
            Ok(Self::Disabled)
        } else if secs.is_infinite() {
            Ok(Self::Forever)
        } else {
            // Beyond what a Duration holds, entries never expire in practice.
            Ok(Duration::try_from_secs_f64(secs).map_or(Self::Forever, Self::Expires))
        }
    }

    /// Seconds, with `0` for disabled and infinity for forever.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        match self {
            Self::Disabled => 0.0,
            Self::Expires(ttl) => ttl.as_secs_f64(),
            Self::Forever => f64::INFINITY,
        }
    }

    fn expiry(self, now: Instant) -> Option<Instant> {
        match self {
            Self::Expires(ttl) => now.checked_add(ttl),
            Self::Disabled | Self::Forever => None,
        }
    }
}

#[derive(Debug)]
struct Entry {
    outcome: Result<ServerHealth>,
    /// `None` never expires.
    expires_at: Option<Instant>,
    inserted: u64,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

/// Per-server health cache shared by one client.
#[derive(Debug)]
pub struct HealthCache {
    ttl: CacheTtl,
    capacity: usize,
    state: Mutex<State>,
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new(CacheTtl::default())
    }
}

impl HealthCache {
    /// Create a cache holding up to [`MAX_ENTRIES`] servers.
    #[must_use]
    pub fn new(ttl: CacheTtl) -> Self {
        Self::with_capacity(ttl, MAX_ENTRIES)
    }

    /// Create a cache with a custom bound.
    #[must_use]
    pub fn with_capacity(ttl: CacheTtl, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            state: Mutex::new(State::default()),
        }
    }

    /// Configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    /// Return the cached outcome for `server`, or run `fetch` and cache it.
    ///
    /// A cached failure is returned as the same error kind it was stored as.
    pub fn get_or_fetch<F>(&self, server: &str, fetch: F) -> Result<ServerHealth>
    where
        F: FnOnce() -> Result<ServerHealth>,
    {
        if let Some(outcome) = self.lookup(server) {
            tracing::debug!(server = %server, "health cache hit");
            return outcome;
        }

        let outcome = fetch();
        match &outcome {
            Err(e) if !e.is_cacheable() => {
                tracing::debug!(server = %server, error = %e, "health lookup failed, not caching");
            }
            _ => self.insert(server, outcome.clone()),
        }
        outcome
    }

    /// Store an outcome for `server`, replacing any previous one.
    pub fn insert(&self, server: &str, outcome: Result<ServerHealth>) {
        if self.ttl == CacheTtl::Disabled {
            return;
        }

        let now = Instant::now();
        let mut state = self.state.lock();
        state.entries.remove(server);

        if state.entries.len() >= self.capacity {
            state.entries.retain(|_, entry| entry.is_live(now));
        }
        if state.entries.len() >= self.capacity {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(name, _)| name.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(server = %oldest, "evicting health cache entry");
                state.entries.remove(&oldest);
            }
        }

        let inserted = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            server.to_string(),
            Entry {
                outcome,
                expires_at: self.ttl.expiry(now),
                inserted,
            },
        );
    }

    fn lookup(&self, server: &str) -> Option<Result<ServerHealth>> {
        if self.ttl == CacheTtl::Disabled {
            return None;
        }

        let now = Instant::now();
        let mut state = self.state.lock();
        let entry = state.entries.get(server)?;
        if entry.is_live(now) {
            return Some(entry.outcome.clone());
        }

        tracing::trace!(server = %server, "health cache entry expired");
        state.entries.remove(server);
        None
    }

    /// Forget `server`. Returns whether an entry was present.
    pub fn invalidate(&self, server: &str) -> bool {
        self.state.lock().entries.remove(server).is_some()
    }

    /// Forget every server.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Number of unexpired entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.state
            .lock()
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Whether no unexpired entries remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
