use crate::plan::PlanError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PlanIoError {
    Io(io::Error),
    Csv(csv::Error),
    Serialization(SerdeJsonError),
    /// Required plan columns absent from the header row, reported by name.
    MissingColumns(Vec<String>),
    Plan(PlanError),
}

impl fmt::Display for PlanIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanIoError::Io(err) => write!(f, "io error: {err}"),
            PlanIoError::Csv(err) => write!(f, "csv error: {err}"),
            PlanIoError::Serialization(err) => write!(f, "serialization error: {err}"),
            PlanIoError::MissingColumns(columns) => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            PlanIoError::Plan(err) => write!(f, "invalid plan: {err}"),
        }
    }
}

impl std::error::Error for PlanIoError {}

impl From<io::Error> for PlanIoError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for PlanIoError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<SerdeJsonError> for PlanIoError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<PlanError> for PlanIoError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value)
    }
}

pub type PlanIoResult<T> = Result<T, PlanIoError>;

pub mod file;

pub use file::{load_plan_from_csv, save_timeline_to_csv, save_timeline_to_json};
