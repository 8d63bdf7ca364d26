//! Per-key request limiting with a fixed-window counter.
//!
//! Windows are fixed, not sliding: a caller can burst up to twice the limit across the
//! boundary of two adjacent windows. State lives in this process only; separate
//! instances or processes do not share counts.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Minimum time between sweeps of expired windows.
const SWEEP_INTERVAL_MS: i64 = 60_000;
/// Table size that forces a sweep regardless of the interval. While the table stays at
/// this size after a sweep, calls for keys it does not already hold are rejected.
pub const MAX_TRACKED_KEYS: usize = 10_000;
/// Minimum time between sweeps forced by a full table.
const FORCED_SWEEP_INTERVAL_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitOptions {
    /// Calls accepted per window
    pub limit: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// When the current window closes
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Time until the window resets, rounded up to whole seconds and at least one second.
    pub fn retry_after(&self, now: DateTime<Utc>) -> Duration {
        let remaining_ms = (self.reset_at - now).num_milliseconds().max(0) as u64;
        Duration::from_secs(remaining_ms.div_ceil(1000).max(1))
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: DateTime<Utc>,
    window_ms: u64,
}

impl Window {
    fn open(now: DateTime<Utc>, window_ms: u64) -> Self {
        Self {
            count: 0,
            started_at: now,
            window_ms,
        }
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    windows: HashMap<String, Window>,
    last_sweep: Option<DateTime<Utc>>,
}

impl LimiterState {
    fn sweep_if_due(&mut self, now: DateTime<Utc>) {
        let due = match self.last_sweep {
            None => true,
            Some(last) => {
                let elapsed = (now - last).num_milliseconds();
                elapsed >= SWEEP_INTERVAL_MS
                    || (self.windows.len() >= MAX_TRACKED_KEYS
                        && elapsed >= FORCED_SWEEP_INTERVAL_MS)
            }
        };
        if !due {
            return;
        }

        let before = self.windows.len();
        self.windows
            .retain(|_, w| now < window_end(w.started_at, w.window_ms));
        self.last_sweep = Some(now);

        let removed = before - self.windows.len();
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = self.windows.len(),
                "Swept expired rate-limit windows"
            );
        }
    }
}

fn window_end(started_at: DateTime<Utc>, window_ms: u64) -> DateTime<Utc> {
    i64::try_from(window_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|window| started_at.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// In-memory fixed-window rate limiter. Construct one per application and share it by
/// reference; every check is serialized through a single mutex.
#[derive(Debug, Default)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, key: &str, options: RateLimitOptions) -> RateLimitDecision {
        self.check_at(key, options, Utc::now())
    }

    /// Counts one call for `key` at `now`.
    pub fn check_at(
        &self,
        key: &str,
        options: RateLimitOptions,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sweep_if_due(now);

        if state.windows.len() >= MAX_TRACKED_KEYS && !state.windows.contains_key(key) {
            tracing::warn!(key = %key, "Rate-limit table full, rejecting new key");
            return RateLimitDecision {
                allowed: false,
                reset_at: window_end(now, options.window_ms),
            };
        }

        let window = state
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window::open(now, options.window_ms));

        if now >= window_end(window.started_at, options.window_ms) {
            *window = Window::open(now, options.window_ms);
        }
        let reset_at = window_end(window.started_at, options.window_ms);

        let allowed = window.count < options.limit;
        if allowed {
            window.count += 1;
        }

        RateLimitDecision { allowed, reset_at }
    }

    /// Number of keys currently holding a window, expired or not.
    pub fn tracked_keys(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .windows
            .len()
    }
}
