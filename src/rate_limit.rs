use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::debug;

// Rate limit entry - tracks requests per IP/key
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Fixed-window counter keyed by client IP.
///
/// Every attempt is counted, including rejected ones. A key whose window has
/// elapsed starts over with a fresh window on its next attempt.
pub struct RateLimiter {
    buckets: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut entry = self
            .buckets
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // window expired..? start a new one
        if now.saturating_duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);

        if entry.count <= self.max_requests {
            Decision::Allowed {
                remaining: self.max_requests - entry.count,
            }
        } else {
            Decision::Limited {
                retry_after: self.window,
            }
        }
    }

    /// Drops buckets whose window has fully elapsed. Returns how many were removed.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, entry| now.saturating_duration_since(entry.window_start) < self.window);
        before.saturating_sub(self.buckets.len())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

// Background sweeper - keeps the bucket map from growing for the whole process lifetime
pub async fn sweeper(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);
    debug!(?every, "rate limit sweeper started");

    loop {
        interval.tick().await;
        let removed = limiter.evict_expired(Instant::now());
        if removed > 0 {
            debug!(removed, remaining = limiter.len(), "evicted expired rate limit buckets");
        }
    }
}
