use polars::prelude::{AnyValue, DataFrame};
use std::process::ExitCode;
use timeline_tool::{build_timeline, load_plan_from_csv, save_timeline_to_csv, save_timeline_to_json};

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |col: &polars::prelude::Column, row_idx: usize| -> String {
        match col.get(row_idx) {
            Ok(AnyValue::Null) => String::new(),
            Ok(AnyValue::Int32(v)) => v.to_string(),
            Ok(AnyValue::Int64(v)) => v.to_string(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(av) => av.to_string(),
            Err(_) => String::new(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            let s = cell(col, row_idx);
            if s.len() > widths[ci] {
                widths[ci] = s.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = cell(col, row_idx);
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_usage() {
    eprintln!("Usage: cli <plan.csv> [--json OUT] [--csv OUT]");
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let mut plan_path: Option<String> = None;
    let mut json_out: Option<String> = None;
    let mut csv_out: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => {
                json_out = Some(args.next().ok_or("--json requires a path")?);
            }
            "--csv" => {
                csv_out = Some(args.next().ok_or("--csv requires a path")?);
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                if plan_path.is_none() {
                    plan_path = Some(other.to_string());
                } else {
                    return Err(format!("unexpected argument '{other}'"));
                }
            }
        }
    }

    let plan_path = plan_path.ok_or_else(|| {
        print_usage();
        "no plan file given".to_string()
    })?;

    let (plan, warnings) = load_plan_from_csv(&plan_path).map_err(|e| e.to_string())?;
    for warning in &warnings {
        eprintln!("Warning: {warning}");
    }

    let timeline = build_timeline(&plan).map_err(|e| e.to_string())?;
    let df = timeline.to_dataframe().map_err(|e| e.to_string())?;
    println!("{}", render_df_as_text_table(&df));

    if let Some(path) = json_out {
        save_timeline_to_json(&timeline, &path).map_err(|e| e.to_string())?;
        println!("Timeline written to {path}");
    }
    if let Some(path) = csv_out {
        save_timeline_to_csv(&timeline, &path).map_err(|e| e.to_string())?;
        println!("Timeline written to {path}");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
