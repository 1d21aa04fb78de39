pub mod interval;
pub mod io;
pub mod plan;
pub mod scheduler;
pub mod timeline;
pub mod wash;

pub use interval::{Interval, IntervalKind, FIRST_WASH_ORDER, WASH_LABEL, WASH_ORDER};
pub use io::{load_plan_from_csv, save_timeline_to_csv, save_timeline_to_json, PlanIoError};
pub use plan::{PlanError, PlanWarning, ProductRun, ProductionPlan};
pub use scheduler::{build_timeline, ScheduleError};
pub use timeline::{Lane, Timeline};
pub use wash::{WashCycles, WashPolicy, WashWindow};
