use chrono::{Duration, NaiveDateTime};

/// Recurring cleaning-cycle definition, taken from row 0 of the plan.
/// A plan with unreadable or zero-duration wash settings carries no policy
/// at all (`Option<WashPolicy>`); duration and gap here are always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct WashPolicy {
    pub duration: Duration,
    pub gap: Duration,
    /// Absolute anchor for the very first wash, bypassing the gap rule.
    pub first_wash: Option<NaiveDateTime>,
}

impl WashPolicy {
    pub fn new(duration_minutes: i64, gap_minutes: i64) -> Self {
        Self {
            duration: Duration::minutes(duration_minutes),
            gap: Duration::minutes(gap_minutes),
            first_wash: None,
        }
    }

    /// Lazy, infinite sequence of wash candidates, restartable from any
    /// `last_wash_end`. The first candidate starts `gap` after
    /// `last_wash_end`, each later one `gap` after the previous candidate's
    /// end. Callers must bound consumption by candidate start; the sequence
    /// never ends on its own.
    pub fn cycles(&self, last_wash_end: NaiveDateTime) -> WashCycles {
        WashCycles {
            next_start: last_wash_end + self.gap,
            duration: self.duration,
            gap: self.gap,
        }
    }
}

/// One candidate wash span. Only becomes an interval if the scheduler
/// commits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WashWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

pub struct WashCycles {
    next_start: NaiveDateTime,
    duration: Duration,
    gap: Duration,
}

impl Iterator for WashCycles {
    type Item = WashWindow;

    fn next(&mut self) -> Option<WashWindow> {
        let start = self.next_start;
        let end = start + self.duration;
        self.next_start = end + self.gap;
        Some(WashWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn candidates_repeat_gap_after_previous_end() {
        let policy = WashPolicy::new(30, 120);
        let mut cycles = policy.cycles(t(0, 0));

        let first = cycles.next().unwrap();
        assert_eq!(first.start, t(2, 0));
        assert_eq!(first.end, t(2, 30));

        let second = cycles.next().unwrap();
        assert_eq!(second.start, t(4, 30));
        assert_eq!(second.end, t(5, 0));
    }

    #[test]
    fn generator_is_restartable() {
        let policy = WashPolicy::new(20, 60);
        let a = policy.cycles(t(3, 0)).next().unwrap();
        let b = policy.cycles(t(3, 0)).next().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.start, t(4, 0));
    }
}
