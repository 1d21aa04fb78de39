use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Sort/group key shared by every wash interval. Negative so the wash lane
/// always sorts ahead of any product row index.
pub const WASH_ORDER: i32 = -1;

/// Sort/group key for a wash anchored by `First Wash Time`, ahead of the
/// periodic washes regardless of where it falls in time.
pub const FIRST_WASH_ORDER: i32 = -2;

/// Product label carried by every wash interval.
pub const WASH_LABEL: &str = "Scheduled Wash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Processing,
    Changeover,
    Wash,
}

impl IntervalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalKind::Processing => "processing",
            IntervalKind::Changeover => "changeover",
            IntervalKind::Wash => "wash",
        }
    }
}

/// One committed span of line time. Immutable once created; `start < end`
/// always holds (zero-length spans are dropped before construction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: IntervalKind,
    pub product: String,
    pub order: i32,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Strict intersection test: abutting intervals do not overlap.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        overlaps(self.start, self.end, start, end)
    }

    /// `%H:%M` label for the renderer.
    pub fn start_label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format("%H:%M").to_string()
    }
}

/// Strict half-open interval intersection: `max(starts) < min(ends)`.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start.max(b_start) < a_end.min(b_end)
}

/// Length of the intersection of two half-open intervals, zero when disjoint.
pub fn overlap_duration(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> Duration {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if start < end {
        end - start
    } else {
        Duration::zero()
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
    fn abutting_intervals_do_not_overlap() {
        assert!(!overlaps(t(8, 0), t(9, 0), t(9, 0), t(10, 0)));
        assert!(overlaps(t(8, 0), t(9, 1), t(9, 0), t(10, 0)));
    }

    #[test]
    fn overlap_duration_clamps_to_zero_when_disjoint() {
        assert_eq!(
            overlap_duration(t(8, 0), t(9, 0), t(10, 0), t(11, 0)),
            Duration::zero()
        );
        assert_eq!(
            overlap_duration(t(8, 0), t(9, 0), t(8, 30), t(10, 0)),
            Duration::minutes(30)
        );
    }
}
