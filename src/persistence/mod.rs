use crate::calendar::StudyCalendar;
use crate::planner::{Planner, PlannerError};
use crate::record_validation;
use crate::subject::Subject;
use crate::timetable::TimetableSlot;
use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    DataFrame(PolarsError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::DataFrame(err) => write!(f, "dataframe conversion error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no planner stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<PolarsError> for PersistenceError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<PlannerError> for PersistenceError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::DataFrame(err) => Self::DataFrame(err),
            other => Self::InvalidData(other.to_string()),
        }
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlannerStore {
    fn save_planner(&self, planner: &Planner) -> PersistenceResult<()>;
    fn load_planner(&self) -> PersistenceResult<Option<Planner>>;
}

pub fn validate_records(
    subjects: &[Subject],
    slots: &[TimetableSlot],
    calendar: &StudyCalendar,
) -> PersistenceResult<()> {
    record_validation::validate_planner_records(subjects, slots, calendar)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_planner(planner: &Planner) -> PersistenceResult<()> {
    let subjects = planner.subjects()?;
    let slots = planner.slots()?;
    validate_records(&subjects, &slots, planner.calendar())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_planner_from_csv, load_planner_from_json, save_planner_to_csv, save_planner_to_json,
};
