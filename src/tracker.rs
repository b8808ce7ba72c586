use chrono::{DateTime, Utc};

/// Measures the time between the end of a prompt and the reveal request.
#[derive(Debug, Clone, Default)]
pub struct ReactionTracker {
    started_at: Option<DateTime<Utc>>,
}

impl ReactionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the zero point. A later completion (a replay) moves it forward.
    pub fn start_clock(&mut self, at: DateTime<Utc>) {
        self.started_at = Some(at);
    }

    /// Stops the clock and returns the elapsed seconds, or `None` if no
    /// completion was seen since the last reset.
    pub fn stop_clock(&mut self, now: DateTime<Utc>) -> Option<f64> {
        let started_at = self.started_at.take()?;
        let millis = (now - started_at).num_milliseconds().max(0);
        Some(millis as f64 / 1000.0)
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_elapsed_seconds() {
        let mut tracker = ReactionTracker::new();
        let t0 = Utc::now();
        tracker.start_clock(t0);
        assert!(tracker.is_running());

        let secs = tracker.stop_clock(t0 + Duration::milliseconds(2_350)).unwrap();
        assert!((secs - 2.35).abs() < 1e-9);
        assert!(!tracker.is_running());
    }

    #[test]
    fn test_no_sample_without_completion() {
        let mut tracker = ReactionTracker::new();
        assert_eq!(tracker.stop_clock(Utc::now()), None);
    }

    #[test]
    fn test_latest_completion_wins() {
        let mut tracker = ReactionTracker::new();
        let t0 = Utc::now();
        tracker.start_clock(t0);
        tracker.start_clock(t0 + Duration::seconds(3));

        let secs = tracker.stop_clock(t0 + Duration::seconds(4)).unwrap();
        assert!((secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut tracker = ReactionTracker::new();
        let t0 = Utc::now();
        tracker.start_clock(t0);
        assert_eq!(tracker.stop_clock(t0 - Duration::seconds(1)), Some(0.0));
    }

    #[test]
    fn test_reset_discards_zero_point() {
        let mut tracker = ReactionTracker::new();
        tracker.start_clock(Utc::now());
        tracker.reset();
        assert_eq!(tracker.stop_clock(Utc::now()), None);
    }
}
