use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Completion state of a scheduled slot. A slot with no status has simply
/// not been marked either way yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSlotStatusError {
    value: String,
}

impl fmt::Display for ParseSlotStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown slot status '{}' (expected completed or incomplete)",
            self.value
        )
    }
}

impl std::error::Error for ParseSlotStatusError {}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Completed => "completed",
            SlotStatus::Incomplete => "incomplete",
        }
    }
}

impl FromStr for SlotStatus {
    type Err = ParseSlotStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(SlotStatus::Completed),
            "incomplete" => Ok(SlotStatus::Incomplete),
            _ => Err(ParseSlotStatusError {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schedulable cell of the weekly grid, identified by calendar date
/// and slot number within the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: i32,
    pub user_id: i32,
    pub date: NaiveDate,
    pub slot_number: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SlotStatus>,
}

impl TimetableSlot {
    pub fn new(id: i32, user_id: i32, date: NaiveDate, slot_number: i32) -> Self {
        Self {
            id,
            user_id,
            date,
            slot_number,
            subject_id: None,
            status: None,
        }
    }

    pub fn with_subject(mut self, subject_id: i32) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn with_status(mut self, status: SlotStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(6);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let user_data: [i32; 1] = [self.user_id];
        columns.push(Series::new(PlSmallStr::from_static("user_id"), user_data).into_column());

        columns.push(Self::series_from_date("date", Some(self.date))?.into_column());

        let slot_data: [i32; 1] = [self.slot_number];
        columns.push(Series::new(PlSmallStr::from_static("slot_number"), slot_data).into_column());

        let subject_data: [Option<i32>; 1] = [self.subject_id];
        columns.push(Series::new(PlSmallStr::from_static("subject_id"), subject_data).into_column());

        let status_data: [Option<&str>; 1] = [self.status.map(|s| s.as_str())];
        columns.push(Series::new(PlSmallStr::from_static("status"), status_data).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df
            .column("id")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("timetable row missing id".into()))?;

        let user_id = df
            .column("user_id")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("timetable row missing user_id".into()))?;

        let date = Self::date_from_series(df.column("date")?.date()?, row_idx)
            .ok_or_else(|| PolarsError::ComputeError("timetable row missing date".into()))?;

        let slot_number = df
            .column("slot_number")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("timetable row missing slot_number".into()))?;

        let status = match df.column("status")?.str()?.get(row_idx) {
            Some(raw) if !raw.is_empty() => Some(
                SlotStatus::from_str(raw)
                    .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?,
            ),
            _ => None,
        };

        Ok(Self {
            id,
            user_id,
            date,
            slot_number,
            subject_id: df.column("subject_id")?.i32()?.get(row_idx),
            status,
        })
    }

    fn series_from_date(name: &str, date: Option<NaiveDate>) -> PolarsResult<Series> {
        let data: [Option<i32>; 1] = [date.map(Self::date_to_i32)];
        Series::new(name.into(), data).cast(&DataType::Date)
    }

    fn date_from_series(chunked: &DateChunked, row_idx: usize) -> Option<NaiveDate> {
        chunked.get(row_idx).map(Self::date_from_i32)
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    fn date_from_i32(days: i32) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        epoch + Duration::days(days as i64)
    }
}
