use super::{PlanIoError, PlanIoResult};
use crate::interval::Interval;
use crate::plan::{PlanWarning, ProductionPlan, RawPlanRow};
use crate::timeline::Timeline;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Columns whose absence is fatal. `Duration`/`Gap`/`First Wash Time` are
/// wash-policy fields: when absent or unreadable the plan degrades to
/// washes-disabled instead of aborting.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "product name",
    "quantity liters",
    "process speed per hour",
    "line efficiency",
    "Change Over",
    "Date from",
];

/// Load a plan table from CSV. Header validation reports every missing
/// required column by name.
pub fn load_plan_from_csv<P: AsRef<Path>>(
    path: P,
) -> PlanIoResult<(ProductionPlan, Vec<PlanWarning>)> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.trim() == **required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PlanIoError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<RawPlanRow>() {
        rows.push(record?);
    }

    let (plan, warnings) = ProductionPlan::from_rows(&rows)?;
    Ok((plan, warnings))
}

/// Flat interval record handed to the renderer: absolute timestamps plus
/// the `%H:%M` bar labels it needs.
#[derive(Debug, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: String,
    pub product: String,
    pub order: i32,
    pub start_label: String,
    pub end_label: String,
}

impl From<&Interval> for IntervalRecord {
    fn from(interval: &Interval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            kind: interval.kind.as_str().to_string(),
            product: interval.product.clone(),
            order: interval.order,
            start_label: interval.start_label(),
            end_label: interval.end_label(),
        }
    }
}

fn display_records(timeline: &Timeline) -> Vec<IntervalRecord> {
    timeline
        .sorted_for_display()
        .iter()
        .map(IntervalRecord::from)
        .collect()
}

pub fn save_timeline_to_json<P: AsRef<Path>>(timeline: &Timeline, path: P) -> PlanIoResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &display_records(timeline))?;
    Ok(())
}

pub fn save_timeline_to_csv<P: AsRef<Path>>(timeline: &Timeline, path: P) -> PlanIoResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in display_records(timeline) {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
