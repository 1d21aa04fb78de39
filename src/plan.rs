use crate::wash::WashPolicy;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One product run, ordered by original plan row index. The changeover
/// precedes the run and is ignored for row 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRun {
    pub name: String,
    pub quantity: f64,
    pub speed: f64,
    pub efficiency: f64,
    pub changeover_minutes: i64,
}

impl ProductRun {
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        speed: f64,
        efficiency: f64,
        changeover_minutes: i64,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            speed,
            efficiency,
            changeover_minutes,
        }
    }
}

/// Fully parsed plan: the week anchor, the optional wash policy, and the
/// product sequence in row order. Built fresh per scheduling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionPlan {
    pub anchor: NaiveDateTime,
    pub wash: Option<WashPolicy>,
    pub runs: Vec<ProductRun>,
}

impl ProductionPlan {
    pub fn new(anchor: NaiveDateTime, wash: Option<WashPolicy>, runs: Vec<ProductRun>) -> Self {
        Self { anchor, wash, runs }
    }
}

/// Raw string row as it appears in the plan table. Row 0 additionally
/// carries the global anchor and wash settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlanRow {
    #[serde(rename = "product name")]
    pub product_name: String,
    #[serde(rename = "quantity liters")]
    pub quantity_liters: String,
    #[serde(rename = "process speed per hour")]
    pub process_speed: String,
    #[serde(rename = "line efficiency")]
    pub line_efficiency: String,
    #[serde(rename = "Change Over")]
    pub change_over: String,
    #[serde(rename = "Date from")]
    pub date_from: String,
    #[serde(rename = "Duration", default)]
    pub duration: String,
    #[serde(rename = "Gap", default)]
    pub gap: String,
    #[serde(rename = "First Wash Time", default)]
    pub first_wash_time: String,
}

/// Degraded-config conditions: scheduling proceeds, the caller is told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "warning", content = "detail")]
pub enum PlanWarning {
    /// `Duration`/`Gap` unreadable; washes disabled for the whole plan.
    WashPolicyUnreadable(String),
    /// `First Wash Time` present but unreadable; the periodic schedule is
    /// kept, only the anchored first wash is dropped.
    FirstWashUnreadable(String),
    /// `Gap` is zero while `Duration` is positive; washes would repeat
    /// back to back without end, so they are disabled for the plan.
    ZeroWashGap,
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::WashPolicyUnreadable(detail) => {
                write!(f, "wash duration/gap unreadable ({detail}); washes disabled")
            }
            PlanWarning::FirstWashUnreadable(detail) => {
                write!(f, "first wash time unreadable ({detail}); anchor ignored")
            }
            PlanWarning::ZeroWashGap => {
                write!(f, "wash gap is zero; washes disabled")
            }
        }
    }
}

/// Fatal plan-shape errors. Anything here aborts the run with no partial
/// schedule.
#[derive(Debug)]
pub enum PlanError {
    InvalidAnchor(String),
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
    Empty,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidAnchor(value) => {
                write!(f, "cannot parse 'Date from' value '{value}'")
            }
            PlanError::InvalidField { row, column, value } => {
                write!(f, "row {row}: cannot parse '{column}' value '{value}'")
            }
            PlanError::Empty => write!(f, "plan contains no product rows"),
        }
    }
}

impl std::error::Error for PlanError {}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a plan timestamp; bare dates resolve to midnight.
pub fn parse_plan_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl ProductionPlan {
    /// Build a plan from raw table rows. Row 0 supplies the anchor and wash
    /// settings; every row supplies its own product fields. Unreadable wash
    /// settings degrade to a plan without washes, collected as warnings;
    /// an unreadable anchor is fatal.
    pub fn from_rows(rows: &[RawPlanRow]) -> Result<(Self, Vec<PlanWarning>), PlanError> {
        let first = rows.first().ok_or(PlanError::Empty)?;

        let anchor = parse_plan_timestamp(&first.date_from)
            .ok_or_else(|| PlanError::InvalidAnchor(first.date_from.trim().to_string()))?;

        let mut warnings = Vec::new();
        let wash = parse_wash_policy(first, &mut warnings);

        let mut runs = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            runs.push(parse_run(row_idx, row)?);
        }

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        Ok((Self::new(anchor, wash, runs), warnings))
    }
}

fn parse_wash_policy(first: &RawPlanRow, warnings: &mut Vec<PlanWarning>) -> Option<WashPolicy> {
    let duration = first.duration.trim().parse::<i64>();
    let gap = first.gap.trim().parse::<i64>();
    let (duration, gap) = match (duration, gap) {
        (Ok(d), Ok(g)) if d >= 0 && g >= 0 => (d, g),
        _ => {
            warnings.push(PlanWarning::WashPolicyUnreadable(format!(
                "Duration='{}', Gap='{}'",
                first.duration.trim(),
                first.gap.trim()
            )));
            return None;
        }
    };

    // Zero duration means washes are switched off entirely.
    if duration == 0 {
        return None;
    }

    // A positive-duration wash with no gap never yields the line back.
    if gap == 0 {
        warnings.push(PlanWarning::ZeroWashGap);
        return None;
    }

    let mut policy = WashPolicy::new(duration, gap);
    let raw_first_wash = first.first_wash_time.trim();
    if !raw_first_wash.is_empty() {
        match parse_plan_timestamp(raw_first_wash) {
            Some(ts) => policy.first_wash = Some(ts),
            None => warnings.push(PlanWarning::FirstWashUnreadable(raw_first_wash.to_string())),
        }
    }
    Some(policy)
}

fn parse_run(row_idx: usize, row: &RawPlanRow) -> Result<ProductRun, PlanError> {
    let quantity = parse_f64(row_idx, "quantity liters", &row.quantity_liters)?;
    let speed = parse_f64(row_idx, "process speed per hour", &row.process_speed)?;
    let efficiency = parse_f64(row_idx, "line efficiency", &row.line_efficiency)?;

    // Row 0's changeover is never scheduled, so a blank cell there is fine.
    let raw_changeover = row.change_over.trim();
    let changeover_minutes = if raw_changeover.is_empty() {
        0
    } else {
        match raw_changeover.parse::<i64>() {
            Ok(v) if v >= 0 => v,
            Ok(_) | Err(_) if row_idx == 0 => 0,
            _ => {
                return Err(PlanError::InvalidField {
                    row: row_idx,
                    column: "Change Over",
                    value: raw_changeover.to_string(),
                })
            }
        }
    };

    Ok(ProductRun::new(
        row.product_name.trim(),
        quantity,
        speed,
        efficiency,
        changeover_minutes,
    ))
}

fn parse_f64(row: usize, column: &'static str, value: &str) -> Result<f64, PlanError> {
    value.trim().parse::<f64>().map_err(|_| PlanError::InvalidField {
        row,
        column,
        value: value.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, date_from: &str, duration: &str, gap: &str) -> RawPlanRow {
        RawPlanRow {
            product_name: name.into(),
            quantity_liters: "600".into(),
            process_speed: "100".into(),
            line_efficiency: "1.0".into(),
            change_over: "45".into(),
            date_from: date_from.into(),
            duration: duration.into(),
            gap: gap.into(),
            first_wash_time: String::new(),
        }
    }

    #[test]
    fn bad_anchor_is_fatal() {
        let rows = [row("A", "not a date", "30", "120")];
        match ProductionPlan::from_rows(&rows) {
            Err(PlanError::InvalidAnchor(v)) => assert_eq!(v, "not a date"),
            other => panic!("expected InvalidAnchor, got {other:?}"),
        }
    }

    #[test]
    fn bad_wash_settings_degrade_to_disabled() {
        let rows = [row("A", "2025-09-19 20:00", "thirty", "120")];
        let (plan, warnings) = ProductionPlan::from_rows(&rows).unwrap();
        assert!(plan.wash.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], PlanWarning::WashPolicyUnreadable(_)));
    }

    #[test]
    fn zero_gap_disables_washes_with_warning() {
        let rows = [row("A", "2025-09-19 20:00", "30", "0")];
        let (plan, warnings) = ProductionPlan::from_rows(&rows).unwrap();
        assert!(plan.wash.is_none());
        assert_eq!(warnings, vec![PlanWarning::ZeroWashGap]);
    }

    #[test]
    fn zero_duration_disables_washes_without_warning() {
        let rows = [row("A", "2025-09-19 20:00", "0", "120")];
        let (plan, warnings) = ProductionPlan::from_rows(&rows).unwrap();
        assert!(plan.wash.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn bare_date_anchor_resolves_to_midnight() {
        let rows = [row("A", "2025-09-19", "30", "120")];
        let (plan, _) = ProductionPlan::from_rows(&rows).unwrap();
        assert_eq!(
            plan.anchor,
            chrono::NaiveDate::from_ymd_opt(2025, 9, 19)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }
}
