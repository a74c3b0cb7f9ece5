//! Fixed-window request rate limiting.
//!
//! Each (client, endpoint) pair gets its own window. The first request opens
//! the window; once the window is older than the configured length the next
//! request starts a fresh one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::RateLimitConfig;

const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// Limits applied to every (client, endpoint) pair.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Requests allowed within one window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window(),
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request may proceed.
    Allowed { remaining: u32 },
    /// Request must be rejected until the window resets.
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    count: u32,
    window_start: Instant,
    last_request: Instant,
}

type WindowKey = (String, String);

/// Per-client, per-endpoint fixed-window limiter.
///
/// Updates to one key are atomic (the map entry is locked for the
/// read-modify-write); different keys proceed independently.
#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    windows: DashMap<WindowKey, RateLimitWindow>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: DashMap::new(),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Count a request from `client` to `endpoint` and decide whether it may pass.
    pub fn check(&self, client: &str, endpoint: &str) -> RateLimitDecision {
        self.check_at(client, endpoint, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock.
    pub fn check_at(&self, client: &str, endpoint: &str, now: Instant) -> RateLimitDecision {
        let key = (client.to_string(), endpoint.to_string());
        let mut entry = self.windows.entry(key).or_insert(RateLimitWindow {
            count: 0,
            window_start: now,
            last_request: now,
        });

        let window = entry.value_mut();
        if now.saturating_duration_since(window.window_start) > self.policy.window {
            window.count = 0;
            window.window_start = now;
        }
        window.count = window.count.saturating_add(1);
        window.last_request = now;

        if window.count > self.policy.max_requests {
            let elapsed = now.saturating_duration_since(window.window_start);
            RateLimitDecision::Limited {
                retry_after: self.policy.window.saturating_sub(elapsed),
            }
        } else {
            RateLimitDecision::Allowed {
                remaining: self.policy.max_requests - window.count,
            }
        }
    }

    /// Drop windows that have elapsed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    /// Same as [`cleanup`](Self::cleanup) with an explicit clock. Returns the
    /// number of windows removed.
    pub fn cleanup_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        let window = self.policy.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) <= window);
        before.saturating_sub(self.windows.len())
    }

    /// When `client` last hit `endpoint`, if its window is still tracked.
    pub fn last_request(&self, client: &str, endpoint: &str) -> Option<Instant> {
        self.windows
            .get(&(client.to_string(), endpoint.to_string()))
            .map(|w| w.last_request)
    }

    /// Number of live windows.
    pub fn active_windows(&self) -> usize {
        self.windows.len()
    }

    /// Spawn a task that runs [`cleanup`](Self::cleanup) every `interval`
    /// (at least every millisecond; a zero interval is raised to that).
    pub fn start_cleanup_task(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let period = interval.max(MIN_CLEANUP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.cleanup();
                if removed > 0 {
                    debug!(
                        removed,
                        remaining = self.active_windows(),
                        "Rate limiter cleanup"
                    );
                }
            }
        })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}
