use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window request counter. Timestamps older than the window are
/// discarded lazily on each admission check; there is no background sweep.
///
/// Not internally synchronized — the dispatcher wraps it in a mutex.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: VecDeque::new(),
        }
    }

    /// One-minute window, the tool's default.
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Compact the window, then check admission. Strictly-less-than: with
    /// `max_requests` timestamps in the window the next request is denied.
    pub fn can_admit(&mut self) -> bool {
        self.can_admit_at(Instant::now())
    }

    /// Record one consumed request at the current time.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    /// Remaining admissions in the current window, for status reporting.
    /// Compacts as a side effect so the count reflects the live window.
    pub fn remaining(&mut self) -> usize {
        let now = Instant::now();
        self.compact(now);
        self.max_requests.saturating_sub(self.requests.len())
    }

    pub(crate) fn can_admit_at(&mut self, now: Instant) -> bool {
        self.compact(now);
        self.requests.len() < self.max_requests
    }

    pub(crate) fn record_at(&mut self, now: Instant) {
        self.requests.push_back(now);
    }

    fn compact(&mut self, now: Instant) {
        while let Some(front) = self.requests.front() {
            if now.duration_since(*front) >= self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_exactly_max_requests_within_window() {
        let mut limiter = RateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.can_admit_at(now));
            limiter.record_at(now);
        }
        assert!(!limiter.can_admit_at(now));
    }

    #[test]
    fn admission_reopens_after_window_passes() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(1));
        let start = Instant::now();

        limiter.record_at(start);
        limiter.record_at(start);
        assert!(!limiter.can_admit_at(start));

        // Age the recorded timestamps out of the window.
        let later = start + Duration::from_secs(2);
        assert!(limiter.can_admit_at(later));
    }

    #[test]
    fn compaction_keeps_in_window_entries() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(10));
        let start = Instant::now();

        limiter.record_at(start);
        limiter.record_at(start + Duration::from_secs(8));

        // First entry expired, second still in window.
        let now = start + Duration::from_secs(11);
        assert!(limiter.can_admit_at(now));
        limiter.record_at(now);
        limiter.record_at(now);
        assert!(!limiter.can_admit_at(now));
    }

    #[test]
    fn remaining_reports_free_slots() {
        let mut limiter = RateLimiter::per_minute(3);
        assert_eq!(limiter.remaining(), 3);
        limiter.record();
        assert_eq!(limiter.remaining(), 2);
        limiter.record();
        limiter.record();
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn record_without_check_still_counts() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.record();
        assert!(!limiter.can_admit());
    }
}
