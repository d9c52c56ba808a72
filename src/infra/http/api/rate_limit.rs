use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sliding-window limiter keyed by caller and route.
#[derive(Debug, Clone)]
pub struct ApiRateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
}

impl ApiRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Admit one request for `key` on `route`. Returns whether it was admitted
    /// and how many requests remain in the current window.
    pub fn allow(&self, key: &str, route: &str) -> (bool, u32) {
        self.allow_at(key, route, Instant::now())
    }

    fn allow_at(&self, key: &str, route: &str, now: Instant) -> (bool, u32) {
        let window = self.window;
        let mut entry = self.buckets.entry(format!("{key}:{route}")).or_default();
        entry.retain(|instant| now.duration_since(*instant) < window);

        let used = u32::try_from(entry.len()).unwrap_or(u32::MAX);
        let remaining = self.max_requests.saturating_sub(used);
        if remaining == 0 {
            return (false, 0);
        }

        entry.push(now);
        (true, remaining - 1)
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_once_window_is_full() {
        let limiter = ApiRateLimiter::new(Duration::from_secs(60), 2);
        let now = Instant::now();

        assert_eq!(limiter.allow_at("user", "/api/brands", now), (true, 1));
        assert_eq!(limiter.allow_at("user", "/api/brands", now), (true, 0));
        assert_eq!(limiter.allow_at("user", "/api/brands", now), (false, 0));
        // Other routes and callers have their own buckets.
        assert_eq!(limiter.allow_at("user", "/api/files", now), (true, 1));
        assert_eq!(limiter.allow_at("other", "/api/brands", now), (true, 1));
    }

    #[test]
    fn window_slides_forward() {
        let limiter = ApiRateLimiter::new(Duration::from_secs(1), 1);
        let start = Instant::now();

        assert!(limiter.allow_at("user", "/r", start).0);
        assert!(!limiter.allow_at("user", "/r", start).0);
        assert!(
            limiter
                .allow_at("user", "/r", start + Duration::from_secs(2))
                .0
        );
    }
}
