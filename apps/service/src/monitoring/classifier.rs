use std::time::{Duration, SystemTime};

use super::history::History;
use super::types::HealthStatus;

const SHORT_WINDOW: Duration = Duration::from_secs(30);
const LONG_WINDOW: Duration = Duration::from_secs(60);

/// Drop counts above these trigger the matching classification.
const LONG_WINDOW_DROP_LIMIT: usize = 10;
const SHORT_WINDOW_DROP_LIMIT: usize = 3;

/// Classify an endpoint's health from its recent drop pattern.
///
/// Pure function of the history contents and `now`: more than 10 drops in
/// the last 60 seconds is red; otherwise more than 3 drops in the last 30
/// seconds is amber; otherwise green. The 60-second rule is checked first
/// and wins regardless of the 30-second count.
pub fn classify(history: &History, now: SystemTime) -> HealthStatus {
    let drops60 = drops_within(history, LONG_WINDOW, now);
    if drops60 > LONG_WINDOW_DROP_LIMIT {
        return HealthStatus::Red;
    }

    let drops30 = drops_within(history, SHORT_WINDOW, now);
    if drops30 > SHORT_WINDOW_DROP_LIMIT {
        return HealthStatus::Amber;
    }

    HealthStatus::Green
}

fn drops_within(history: &History, max_age: Duration, now: SystemTime) -> usize {
    history.window(max_age, now).filter(|point| !point.success).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::HistoryPoint;

    fn history_with_failures(now: SystemTime, count: usize, age_seconds: u64) -> History {
        let mut history = History::new();
        for _ in 0..count {
            history.record(HistoryPoint::failure(now - Duration::from_secs(age_seconds)));
        }
        history
    }

    #[test]
    fn eleven_drops_in_sixty_seconds_is_red_even_with_a_quiet_thirty() {
        let now = SystemTime::now();
        // All drops are 35-60s old: drops60 = 11, drops30 = 0.
        let history = history_with_failures(now, 11, 40);

        assert_eq!(classify(&history, now), HealthStatus::Red);
    }

    #[test]
    fn exactly_ten_drops_in_sixty_seconds_is_not_red() {
        let now = SystemTime::now();
        let history = history_with_failures(now, 10, 40);

        assert_eq!(classify(&history, now), HealthStatus::Green);
    }

    #[test]
    fn four_recent_drops_is_amber() {
        let now = SystemTime::now();
        let history = history_with_failures(now, 4, 10);

        assert_eq!(classify(&history, now), HealthStatus::Amber);
    }

    #[test]
    fn three_recent_drops_stays_green() {
        let now = SystemTime::now();
        let history = history_with_failures(now, 3, 10);

        assert_eq!(classify(&history, now), HealthStatus::Green);
    }

    #[test]
    fn drops_older_than_the_long_window_are_ignored() {
        let now = SystemTime::now();
        let history = history_with_failures(now, 20, 90);

        assert_eq!(classify(&history, now), HealthStatus::Green);
    }

    #[test]
    fn classification_is_deterministic_for_identical_inputs() {
        let now = SystemTime::now();
        let mut history = history_with_failures(now, 5, 10);
        history.record(HistoryPoint::success(now - Duration::from_secs(2), Some(12)));

        let first = classify(&history, now);
        let second = classify(&history, now);
        assert_eq!(first, second);
        assert_eq!(first, HealthStatus::Amber);
    }
}
