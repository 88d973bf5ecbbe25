//! Per-instance fixed-window rate limiting.
//!
//! This is a process-local soft throttle: it does not coordinate across
//! instances and resets on redeploy. The canonical counts live in the
//! visitor backend; this only dampens bursts from a single client against a
//! single instance. The tracking map is bounded so a scan of many distinct
//! IPs cannot grow it without limit.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;

/// Upper bound on tracked keys before eviction kicks in.
pub const MAX_TRACKED_KEYS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    window_start: Instant,
    count: u32,
}

/// Fixed-window counter keyed by an arbitrary string (typically the client
/// IP, or IP plus slug).
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `key` and reports whether it is within the
    /// allowance for the current window.
    pub fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(key) && entries.len() >= MAX_TRACKED_KEYS {
            evict(&mut entries, self.window, now);
        }

        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            window_start: now,
            count: 0,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.window_start = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }
}

/// Drops expired windows; when that frees nothing, drops the oldest entry so
/// the map never exceeds its bound.
fn evict(entries: &mut HashMap<String, WindowEntry>, window: Duration, now: Instant) {
    entries.retain(|_, entry| now.duration_since(entry.window_start) < window);

    if entries.len() >= MAX_TRACKED_KEYS {
        if let Some(oldest) = entries
            .iter()
            .min_by_key(|(_, entry)| entry.window_start)
            .map(|(key, _)| key.clone())
        {
            entries.remove(&oldest);
        }
    }
}
