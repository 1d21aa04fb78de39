use crate::interval::Interval;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

/// The scheduler's output: every committed interval, in commit order.
/// Consumers sort by `(order, start)` for stable per-product grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub intervals: Vec<Interval>,
}

/// One rendering row: a product (or the shared wash lane) with its
/// intervals in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub product: String,
    pub intervals: Vec<Interval>,
}

impl Timeline {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Intervals sorted by `(order, start)`. Wash intervals all carry a
    /// negative order, so the wash lane lists first, with a pre-anchored
    /// first wash ahead of the periodic ones.
    pub fn sorted_for_display(&self) -> Vec<Interval> {
        let mut sorted = self.intervals.clone();
        sorted.sort_by(|a, b| (a.order, a.start).cmp(&(b.order, b.start)));
        sorted
    }

    /// Display-ordered intervals grouped into one lane per product label,
    /// plus the shared wash lane first. Duplicate product names share a
    /// lane, matching the renderer's grouping.
    pub fn lanes(&self) -> Vec<Lane> {
        let mut lanes: Vec<Lane> = Vec::new();
        for interval in self.sorted_for_display() {
            match lanes.iter().position(|lane| lane.product == interval.product) {
                Some(idx) => lanes[idx].intervals.push(interval),
                None => lanes.push(Lane {
                    product: interval.product.clone(),
                    intervals: vec![interval],
                }),
            }
        }
        for lane in &mut lanes {
            lane.intervals.sort_by_key(|interval| interval.start);
        }
        lanes
    }

    /// Display-ordered intervals as a DataFrame with millisecond datetime
    /// columns, for table printing and frame-based consumers.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let sorted = self.sorted_for_display();

        let starts: Vec<i64> = sorted
            .iter()
            .map(|i| i.start.and_utc().timestamp_millis())
            .collect();
        let ends: Vec<i64> = sorted
            .iter()
            .map(|i| i.end.and_utc().timestamp_millis())
            .collect();
        let kinds: Vec<&str> = sorted.iter().map(|i| i.kind.as_str()).collect();
        let products: Vec<&str> = sorted.iter().map(|i| i.product.as_str()).collect();
        let orders: Vec<i32> = sorted.iter().map(|i| i.order).collect();

        let datetime = DataType::Datetime(TimeUnit::Milliseconds, None);
        let columns = vec![
            Series::new(PlSmallStr::from_static("start"), starts)
                .cast(&datetime)?
                .into_column(),
            Series::new(PlSmallStr::from_static("end"), ends)
                .cast(&datetime)?
                .into_column(),
            Series::new(PlSmallStr::from_static("kind"), kinds).into_column(),
            Series::new(PlSmallStr::from_static("product"), products).into_column(),
            Series::new(PlSmallStr::from_static("order"), orders).into_column(),
        ];
        DataFrame::new(columns)
    }
}
