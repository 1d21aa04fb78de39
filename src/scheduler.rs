use crate::interval::{
    overlap_duration, overlaps, Interval, IntervalKind, FIRST_WASH_ORDER, WASH_LABEL, WASH_ORDER,
};
use crate::plan::{ProductRun, ProductionPlan};
use crate::timeline::Timeline;
use crate::wash::WashPolicy;
use chrono::{Duration, NaiveDateTime};
use std::fmt;

#[derive(Debug)]
pub enum ScheduleError {
    /// `speed * efficiency` is zero, negative, or not finite; the processing
    /// window would be infinite or run backwards.
    NonPositiveThroughput { index: usize, product: String },
    /// Negative or non-finite quantity.
    InvalidQuantity { index: usize, product: String },
    /// Washes are enabled but the gap is not positive; every window would
    /// pull candidates forever and the pass would never finish.
    NonPositiveWashGap,
    /// Internal invariant breach: a span came out with negative duration.
    NegativeSpan {
        product: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::NonPositiveThroughput { index, product } => {
                write!(f, "row {index} ('{product}'): non-positive effective speed")
            }
            ScheduleError::InvalidQuantity { index, product } => {
                write!(f, "row {index} ('{product}'): invalid quantity")
            }
            ScheduleError::NonPositiveWashGap => {
                write!(f, "wash gap must be positive when washes are enabled")
            }
            ScheduleError::NegativeSpan { product, start, end } => {
                write!(f, "negative span for '{product}': {start} .. {end}")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Walk the product sequence once and emit the full non-overlapping
/// timeline of processing, changeover, and wash intervals.
///
/// Two cursors drive the pass: `current` (the line's clock, monotonically
/// non-decreasing) and `last_wash_end` (advanced each time a wash candidate
/// is committed). Both start at the plan anchor.
pub fn build_timeline(plan: &ProductionPlan) -> Result<Timeline, ScheduleError> {
    let mut scheduler = Scheduler {
        intervals: Vec::new(),
        current: plan.anchor,
        last_wash_end: plan.anchor,
    };

    if let Some(policy) = &plan.wash {
        if policy.gap <= Duration::zero() {
            return Err(ScheduleError::NonPositiveWashGap);
        }
        scheduler.commit_first_wash(policy)?;
    }

    for (index, run) in plan.runs.iter().enumerate() {
        if index > 0 {
            scheduler.changeover_phase(index, run, plan.wash.as_ref())?;
        }
        scheduler.processing_phase(index, run, plan.wash.as_ref())?;
    }

    Ok(Timeline::new(scheduler.intervals))
}

struct Scheduler {
    intervals: Vec<Interval>,
    current: NaiveDateTime,
    last_wash_end: NaiveDateTime,
}

impl Scheduler {
    /// A `First Wash Time` anchor commits one wash up front, outside the
    /// gap rule, and seeds the wash cursor past it.
    fn commit_first_wash(&mut self, policy: &WashPolicy) -> Result<(), ScheduleError> {
        if let Some(first) = policy.first_wash {
            let end = first + policy.duration;
            self.commit(first, end, IntervalKind::Wash, WASH_LABEL, FIRST_WASH_ORDER)?;
            self.last_wash_end = end;
            tracing::debug!(%first, %end, "anchored first wash");
        }
        Ok(())
    }

    /// Changeover preceding run `index`. Wash candidates starting strictly
    /// before the changeover's end are committed first; if any of them
    /// strictly overlaps the changeover window the changeover itself is
    /// suppressed (the washes subsume it) and the clock jumps to the latest
    /// overlapping wash end. Abutting washes do not suppress.
    fn changeover_phase(
        &mut self,
        index: usize,
        run: &ProductRun,
        wash: Option<&WashPolicy>,
    ) -> Result<(), ScheduleError> {
        let window_start = self.current;
        let changeover_end = window_start + Duration::minutes(run.changeover_minutes);

        let mut latest_overlapping_end: Option<NaiveDateTime> = None;
        if let Some(policy) = wash {
            let mut cycles = policy.cycles(self.last_wash_end);
            while let Some(candidate) = cycles.next() {
                if candidate.start >= changeover_end {
                    break;
                }
                self.commit(
                    candidate.start,
                    candidate.end,
                    IntervalKind::Wash,
                    WASH_LABEL,
                    WASH_ORDER,
                )?;
                self.last_wash_end = candidate.end;
                if overlaps(candidate.start, candidate.end, window_start, changeover_end) {
                    latest_overlapping_end = Some(
                        latest_overlapping_end
                            .map_or(candidate.end, |latest| latest.max(candidate.end)),
                    );
                }
            }
        }

        match latest_overlapping_end {
            Some(latest) => {
                // Washes subsume the changeover; no changeover interval.
                self.current = self.current.max(latest);
                tracing::debug!(row = index, until = %self.current, "changeover subsumed by washes");
            }
            None => {
                self.commit(
                    window_start,
                    changeover_end,
                    IntervalKind::Changeover,
                    &run.name,
                    index as i32,
                )?;
                self.current = changeover_end;
            }
        }
        Ok(())
    }

    /// Processing for run `index`. Wash time inside the window pushes the
    /// run's end outward rather than shortening it, so candidate intake is
    /// a fixed-point loop: the window grows by each committed wash's overlap
    /// and intake stops the first time a candidate starts at or past the
    /// grown end. Termination: every iteration consumes one candidate and
    /// candidate starts increase monotonically.
    fn processing_phase(
        &mut self,
        index: usize,
        run: &ProductRun,
        wash: Option<&WashPolicy>,
    ) -> Result<(), ScheduleError> {
        let nominal = nominal_duration(index, run)?;
        let window_start = self.current;
        let processing_end = window_start + nominal;

        let mut wash_overlap = Duration::zero();
        if let Some(policy) = wash {
            let mut cycles = policy.cycles(self.last_wash_end);
            loop {
                let extended_end = processing_end + wash_overlap;
                let candidate = match cycles.next() {
                    Some(candidate) if candidate.start < extended_end => candidate,
                    _ => break,
                };
                self.commit(
                    candidate.start,
                    candidate.end,
                    IntervalKind::Wash,
                    WASH_LABEL,
                    WASH_ORDER,
                )?;
                self.last_wash_end = candidate.end;
                // Growing the window can expose more of this same wash, so
                // its overlap is re-measured against the grown window until
                // stable. The measure is monotonic and bounded by the wash
                // length, so the inner loop stops. On exit the extended end
                // sits at or past the committed wash's end.
                let mut absorbed =
                    overlap_duration(candidate.start, candidate.end, window_start, extended_end);
                loop {
                    let grown_end = processing_end + wash_overlap + absorbed;
                    let regrown =
                        overlap_duration(candidate.start, candidate.end, window_start, grown_end);
                    if regrown == absorbed {
                        break;
                    }
                    absorbed = regrown;
                }
                wash_overlap = wash_overlap + absorbed;
            }
        }
        let extended_end = processing_end + wash_overlap;

        // Cut the processing bar at every committed wash inside the nominal
        // window; the extended end only governs where the last segment (and
        // the clock) lands. Washes landing past the nominal end extend the
        // run but do not split it further.
        let mut cuts: Vec<(NaiveDateTime, NaiveDateTime)> = self
            .intervals
            .iter()
            .filter(|interval| {
                interval.kind == IntervalKind::Wash
                    && interval.overlaps(window_start, processing_end)
            })
            .map(|interval| (interval.start, interval.end))
            .collect();
        cuts.sort();

        let mut cursor = window_start;
        for (wash_start, wash_end) in cuts {
            if cursor < wash_start {
                self.commit(cursor, wash_start, IntervalKind::Processing, &run.name, index as i32)?;
            }
            cursor = cursor.max(wash_end);
        }
        if cursor < extended_end {
            self.commit(cursor, extended_end, IntervalKind::Processing, &run.name, index as i32)?;
        }

        self.current = extended_end;
        tracing::debug!(row = index, product = %run.name, end = %extended_end, "processing committed");
        Ok(())
    }

    /// Append one interval. Zero-length spans are dropped; negative spans
    /// are an internal error, never emitted.
    fn commit(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        kind: IntervalKind,
        product: &str,
        order: i32,
    ) -> Result<(), ScheduleError> {
        if end < start {
            return Err(ScheduleError::NegativeSpan {
                product: product.to_string(),
                start,
                end,
            });
        }
        if end == start {
            return Ok(());
        }
        self.intervals.push(Interval {
            start,
            end,
            kind,
            product: product.to_string(),
            order,
        });
        Ok(())
    }
}

/// Quantity over effective speed, as a whole-millisecond duration. Zero or
/// negative throughput fails fast instead of producing an unbounded window.
fn nominal_duration(index: usize, run: &ProductRun) -> Result<Duration, ScheduleError> {
    let effective_speed = run.speed * run.efficiency;
    if !effective_speed.is_finite() || effective_speed <= 0.0 {
        return Err(ScheduleError::NonPositiveThroughput {
            index,
            product: run.name.clone(),
        });
    }
    if !run.quantity.is_finite() || run.quantity < 0.0 {
        return Err(ScheduleError::InvalidQuantity {
            index,
            product: run.name.clone(),
        });
    }
    let hours = run.quantity / effective_speed;
    Ok(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 19)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn zero_throughput_fails_fast() {
        let plan = ProductionPlan::new(
            t0(),
            None,
            vec![ProductRun::new("Dead Line", 600.0, 100.0, 0.0, 0)],
        );
        match build_timeline(&plan) {
            Err(ScheduleError::NonPositiveThroughput { index: 0, .. }) => {}
            other => panic!("expected NonPositiveThroughput, got {other:?}"),
        }
    }

    #[test]
    fn negative_quantity_fails_fast() {
        let plan = ProductionPlan::new(
            t0(),
            None,
            vec![ProductRun::new("Backwards", -5.0, 100.0, 1.0, 0)],
        );
        assert!(matches!(
            build_timeline(&plan),
            Err(ScheduleError::InvalidQuantity { index: 0, .. })
        ));
    }

    #[test]
    fn zero_quantity_emits_no_interval() {
        let plan = ProductionPlan::new(
            t0(),
            None,
            vec![ProductRun::new("Empty", 0.0, 100.0, 1.0, 0)],
        );
        let timeline = build_timeline(&plan).unwrap();
        assert!(timeline.intervals.is_empty());
    }
}
