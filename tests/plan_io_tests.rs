use std::io::Write;
use tempfile::NamedTempFile;
use timeline_tool::{
    build_timeline, load_plan_from_csv, save_timeline_to_csv, save_timeline_to_json, PlanError,
    PlanIoError, PlanWarning,
};

const HEADER: &str = "product name,quantity liters,process speed per hour,line efficiency,Change Over,Date from,Duration,Gap,First Wash Time";

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn loads_a_two_product_plan() {
    let file = write_csv(&[
        HEADER,
        "Product A,600,100,1.0,0,2025-09-19 20:00,30,120,",
        "Product B,600,100,1.0,45,,,,",
    ]);

    let (plan, warnings) = load_plan_from_csv(file.path()).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(plan.runs.len(), 2);
    assert_eq!(plan.runs[0].name, "Product A");
    assert_eq!(plan.runs[1].changeover_minutes, 45);

    let wash = plan.wash.as_ref().expect("wash policy should be enabled");
    assert_eq!(wash.duration, chrono::Duration::minutes(30));
    assert_eq!(wash.gap, chrono::Duration::minutes(120));
    assert!(wash.first_wash.is_none());

    assert_eq!(
        plan.anchor,
        chrono::NaiveDate::from_ymd_opt(2025, 9, 19)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    );
}

#[test]
fn missing_columns_are_reported_by_name() {
    let file = write_csv(&[
        "product name,quantity liters,process speed per hour,Date from,Duration,Gap",
        "Product A,600,100,2025-09-19 20:00,30,120",
    ]);

    match load_plan_from_csv(file.path()) {
        Err(PlanIoError::MissingColumns(columns)) => {
            assert_eq!(
                columns,
                vec!["line efficiency".to_string(), "Change Over".to_string()]
            );
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn absent_wash_columns_degrade_to_disabled() {
    let file = write_csv(&[
        "product name,quantity liters,process speed per hour,line efficiency,Change Over,Date from",
        "Product A,600,100,1.0,0,2025-09-19 20:00",
    ]);

    let (plan, warnings) = load_plan_from_csv(file.path()).unwrap();
    assert!(plan.wash.is_none());
    assert!(matches!(
        warnings.as_slice(),
        [PlanWarning::WashPolicyUnreadable(_)]
    ));
}

#[test]
fn unparsable_anchor_is_fatal() {
    let file = write_csv(&[HEADER, "Product A,600,100,1.0,0,next tuesday,30,120,"]);
    match load_plan_from_csv(file.path()) {
        Err(PlanIoError::Plan(PlanError::InvalidAnchor(value))) => {
            assert_eq!(value, "next tuesday");
        }
        other => panic!("expected InvalidAnchor, got {other:?}"),
    }
}

#[test]
fn unparsable_wash_settings_disable_washes_with_warning() {
    let file = write_csv(&[HEADER, "Product A,600,100,1.0,0,2025-09-19 20:00,half an hour,120,"]);
    let (plan, warnings) = load_plan_from_csv(file.path()).unwrap();
    assert!(plan.wash.is_none());
    assert!(matches!(
        warnings.as_slice(),
        [PlanWarning::WashPolicyUnreadable(_)]
    ));

    // Scheduling still proceeds, just without washes.
    let timeline = build_timeline(&plan).unwrap();
    assert_eq!(timeline.len(), 1);
}

#[test]
fn first_wash_time_is_picked_up_from_row_zero() {
    let file = write_csv(&[
        HEADER,
        "Product A,600,100,1.0,0,2025-09-19 20:00,20,240,2025-09-19 19:00",
    ]);
    let (plan, warnings) = load_plan_from_csv(file.path()).unwrap();
    assert!(warnings.is_empty());
    let wash = plan.wash.as_ref().unwrap();
    assert_eq!(
        wash.first_wash,
        Some(
            chrono::NaiveDate::from_ymd_opt(2025, 9, 19)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap()
        )
    );
}

#[test]
fn unreadable_first_wash_keeps_periodic_schedule() {
    let file = write_csv(&[
        HEADER,
        "Product A,600,100,1.0,0,2025-09-19 20:00,20,240,sometime early",
    ]);
    let (plan, warnings) = load_plan_from_csv(file.path()).unwrap();
    let wash = plan.wash.as_ref().unwrap();
    assert!(wash.first_wash.is_none());
    assert!(matches!(
        warnings.as_slice(),
        [PlanWarning::FirstWashUnreadable(_)]
    ));
}

#[test]
fn bad_product_fields_are_fatal() {
    let file = write_csv(&[HEADER, "Product A,lots,100,1.0,0,2025-09-19 20:00,30,120,"]);
    match load_plan_from_csv(file.path()) {
        Err(PlanIoError::Plan(PlanError::InvalidField { row, column, .. })) => {
            assert_eq!(row, 0);
            assert_eq!(column, "quantity liters");
        }
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn json_export_carries_renderer_labels() {
    let file = write_csv(&[
        HEADER,
        "Product A,600,100,1.0,0,2025-09-19 20:00,30,120,",
        "Product B,600,100,1.0,45,,,,",
    ]);
    let (plan, _) = load_plan_from_csv(file.path()).unwrap();
    let timeline = build_timeline(&plan).unwrap();

    let out = NamedTempFile::new().unwrap();
    save_timeline_to_json(&timeline, out.path()).unwrap();

    let records: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(out.path()).unwrap()).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), timeline.len());

    // Display order puts the wash lane first; the first periodic wash lands
    // two hours into the run.
    let first = &records[0];
    assert_eq!(first["kind"], "wash");
    assert_eq!(first["product"], "Scheduled Wash");
    assert_eq!(first["order"], -1);
    assert_eq!(first["start_label"], "22:00");
    assert_eq!(first["end_label"], "22:30");
}

#[test]
fn csv_export_writes_one_row_per_interval() {
    let file = write_csv(&[
        HEADER,
        "Product A,600,100,1.0,0,2025-09-19 20:00,30,120,",
    ]);
    let (plan, _) = load_plan_from_csv(file.path()).unwrap();
    let timeline = build_timeline(&plan).unwrap();

    let out = NamedTempFile::new().unwrap();
    save_timeline_to_csv(&timeline, out.path()).unwrap();

    let contents = std::fs::read_to_string(out.path()).unwrap();
    let rows: Vec<&str> = contents.lines().collect();
    assert_eq!(rows.len(), timeline.len() + 1, "header plus one row each");
    assert!(rows[0].starts_with("start,end,kind,product,order"));
}
