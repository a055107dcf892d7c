use time::OffsetDateTime;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// One countdown run: a pair of epoch-millisecond timestamps.
///
/// All reads take `now` explicitly so the math stays clock-free. Inverted or
/// equal timestamps are not errors; they read as an already-expired run at 0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    start_ms: i64,
    end_ms: i64,
}

impl Countdown {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn total_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }

    /// Remaining time clamped to `0..=total_ms`, so a sample taken before
    /// `start` reads as full rather than over-full.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.end_ms - now_ms).max(0).min(self.total_ms())
    }

    /// Remaining time as a rounded integer percentage, 0..=100.
    pub fn percent(&self, now_ms: i64) -> u8 {
        let total = self.total_ms();
        if total > 0 {
            let remaining = self.remaining_ms(now_ms) as f64;
            (remaining / total as f64 * 100.0).round() as u8
        } else {
            0
        }
    }

    /// Same value as [`percent`](Self::percent) but unrounded, for rendering.
    pub fn fraction(&self, now_ms: i64) -> f32 {
        let total = self.total_ms();
        if total > 0 {
            self.remaining_ms(now_ms) as f32 / total as f32
        } else {
            0.0
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.remaining_ms(now_ms) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_at_start() {
        let c = Countdown::new(1_000, 61_000);
        assert_eq!(c.percent(1_000), 100);
        assert!(!c.is_expired(1_000));
    }

    #[test]
    fn empty_at_and_after_end() {
        let c = Countdown::new(1_000, 61_000);
        assert_eq!(c.percent(61_000), 0);
        assert_eq!(c.percent(100_000), 0);
        assert!(c.is_expired(61_000));
        assert!(c.is_expired(100_000));
    }

    #[test]
    fn zero_total_reads_as_expired() {
        let c = Countdown::new(5_000, 5_000);
        assert_eq!(c.percent(5_000), 0);
        assert!(c.is_expired(5_000));
    }

    #[test]
    fn inverted_range_degrades_to_zero() {
        let c = Countdown::new(9_000, 2_000);
        assert_eq!(c.total_ms(), 0);
        assert_eq!(c.percent(0), 0);
        assert!(c.is_expired(0));
    }

    #[test]
    fn halfway_example() {
        let c = Countdown::new(0, 1_000);
        assert_eq!(c.percent(500), 50);
    }

    #[test]
    fn percent_monotonically_non_increasing() {
        let c = Countdown::new(0, 10_000);
        let mut last = 100;
        for now in (0..=12_000).step_by(7) {
            let p = c.percent(now);
            assert!(p <= last, "percent rose from {last} to {p} at now={now}");
            last = p;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn fraction_matches_percent_at_boundaries() {
        let c = Countdown::new(0, 1_000);
        assert_eq!(c.fraction(0), 1.0);
        assert_eq!(c.fraction(500), 0.5);
        assert_eq!(c.fraction(1_000), 0.0);
        assert_eq!(c.fraction(2_000), 0.0);

        // Unrounded where percent rounds
        assert!((c.fraction(333) - 0.667).abs() < 1e-3);
        assert_eq!(c.percent(333), 67);

        let degenerate = Countdown::new(500, 500);
        assert_eq!(degenerate.fraction(500), 0.0);
    }

    #[test]
    fn sample_before_start_reads_full() {
        let c = Countdown::new(2_000, 4_000);
        assert_eq!(c.percent(0), 100);
        assert_eq!(c.remaining_ms(0), 2_000);
    }
}
