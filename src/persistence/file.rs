use super::{PersistenceError, PersistenceResult};
use crate::calendar::{StudyCalendar, StudyCalendarConfig};
use crate::metadata::PlannerMetadata;
use crate::planner::Planner;
use crate::subject::{Difficulty, Subject};
use crate::timetable::{SlotStatus, TimetableSlot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

#[derive(Serialize, Deserialize)]
struct PlannerSnapshot {
    metadata: PlannerMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar: Option<StudyCalendarConfig>,
    #[serde(default)]
    calendar_is_custom: bool,
    subjects: Vec<Subject>,
    slots: Vec<TimetableSlot>,
}

impl PlannerSnapshot {
    fn from_planner(planner: &Planner) -> PersistenceResult<Self> {
        let subjects = planner.subjects()?;
        let slots = planner.slots()?;
        super::validate_records(&subjects, &slots, planner.calendar())?;
        Ok(Self {
            metadata: planner.metadata().clone(),
            calendar: Some(planner.calendar_config()),
            calendar_is_custom: planner.calendar_is_custom(),
            subjects,
            slots,
        })
    }

    fn into_planner(self) -> PersistenceResult<Planner> {
        let calendar = self
            .calendar
            .map(|config| StudyCalendar::from_config(&config))
            .unwrap_or_default();
        super::validate_records(&self.subjects, &self.slots, &calendar)?;

        let mut planner = Planner::from_parts(self.metadata, calendar, self.calendar_is_custom);
        for subject in self.subjects {
            planner.upsert_subject_record(subject)?;
        }
        for slot in self.slots {
            planner.upsert_slot_record(slot)?;
        }
        Ok(planner)
    }
}

pub fn save_planner_to_json<P: AsRef<Path>>(planner: &Planner, path: P) -> PersistenceResult<()> {
    let snapshot = PlannerSnapshot::from_planner(planner)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_planner_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Planner> {
    let file = File::open(path)?;
    let snapshot: PlannerSnapshot = serde_json::from_reader(file)?;
    snapshot.into_planner()
}

/// One line of the planner CSV. `record_type` discriminates metadata,
/// subject, and slot rows; optional fields are empty strings when absent.
#[derive(Default, Serialize, Deserialize)]
struct PlannerCsvRecord {
    record_type: String,
    id: i32,
    user_id: i32,
    name: String,
    difficulty: String,
    exam_date: String,
    date: String,
    slot_number: String,
    subject_id: String,
    status: String,
    #[serde(default)]
    metadata_json: String,
    #[serde(default)]
    calendar_json: String,
    #[serde(default)]
    calendar_is_custom: String,
}

const RECORD_TYPE_METADATA: &str = "__metadata__";
const RECORD_TYPE_SUBJECT: &str = "subject";
const RECORD_TYPE_SLOT: &str = "slot";

impl PlannerCsvRecord {
    fn metadata_row(planner: &Planner) -> PersistenceResult<Self> {
        let mut record = PlannerCsvRecord::default();
        record.record_type = RECORD_TYPE_METADATA.to_string();
        record.metadata_json = serde_json::to_string(planner.metadata())?;
        record.calendar_json = serde_json::to_string(&planner.calendar_config())?;
        record.calendar_is_custom = planner.calendar_is_custom().to_string();
        Ok(record)
    }

    fn subject_row(subject: &Subject) -> Self {
        let mut record = PlannerCsvRecord::default();
        record.record_type = RECORD_TYPE_SUBJECT.to_string();
        record.id = subject.id;
        record.user_id = subject.user_id;
        record.name = subject.name.clone();
        record.difficulty = subject.difficulty.as_str().to_string();
        record.exam_date = format_date(subject.exam_date);
        record
    }

    fn slot_row(slot: &TimetableSlot) -> Self {
        let mut record = PlannerCsvRecord::default();
        record.record_type = RECORD_TYPE_SLOT.to_string();
        record.id = slot.id;
        record.user_id = slot.user_id;
        record.date = format_date(Some(slot.date));
        record.slot_number = slot.slot_number.to_string();
        record.subject_id = slot
            .subject_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        record.status = slot.status.map(|s| s.as_str().to_string()).unwrap_or_default();
        record
    }

    fn into_subject(self) -> PersistenceResult<Subject> {
        let difficulty = Difficulty::from_str(&self.difficulty)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        let mut subject = Subject::new(self.id, self.user_id, self.name, difficulty);
        subject.exam_date = parse_date(&self.exam_date)?;
        Ok(subject)
    }

    fn into_slot(self) -> PersistenceResult<TimetableSlot> {
        let date = parse_date(&self.date)?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("slot row {} has no date", self.id))
        })?;
        let slot_number = self.slot_number.trim().parse::<i32>().map_err(|err| {
            PersistenceError::InvalidData(format!(
                "invalid slot_number '{}': {err}",
                self.slot_number
            ))
        })?;
        let mut slot = TimetableSlot::new(self.id, self.user_id, date, slot_number);
        slot.subject_id = parse_i32(&self.subject_id)?;
        slot.status = if self.status.trim().is_empty() {
            None
        } else {
            Some(
                SlotStatus::from_str(&self.status)
                    .map_err(|err| PersistenceError::InvalidData(err.to_string()))?,
            )
        };
        Ok(slot)
    }
}

pub fn save_planner_to_csv<P: AsRef<Path>>(planner: &Planner, path: P) -> PersistenceResult<()> {
    super::validate_planner(planner)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(PlannerCsvRecord::metadata_row(planner)?)?;
    for subject in planner.subjects()? {
        writer.serialize(PlannerCsvRecord::subject_row(&subject))?;
    }
    for slot in planner.slots()? {
        writer.serialize(PlannerCsvRecord::slot_row(&slot))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_planner_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Planner> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let mut subjects = Vec::new();
    let mut slots = Vec::new();
    let mut metadata: Option<PlannerMetadata> = None;
    let mut calendar_config: Option<StudyCalendarConfig> = None;
    let mut calendar_is_custom = false;

    for record in reader.deserialize::<PlannerCsvRecord>() {
        let record = record?;
        match record.record_type.as_str() {
            RECORD_TYPE_METADATA => {
                if metadata.is_some() {
                    return Err(PersistenceError::InvalidData(
                        "CSV file contained multiple metadata rows".into(),
                    ));
                }
                if !record.metadata_json.trim().is_empty() {
                    metadata = Some(serde_json::from_str(&record.metadata_json).map_err(|err| {
                        PersistenceError::InvalidData(format!("invalid metadata json: {err}"))
                    })?);
                }
                if !record.calendar_json.trim().is_empty() {
                    calendar_config =
                        Some(serde_json::from_str(&record.calendar_json).map_err(|err| {
                            PersistenceError::InvalidData(format!("invalid calendar json: {err}"))
                        })?);
                }
                if !record.calendar_is_custom.trim().is_empty() {
                    calendar_is_custom = record
                        .calendar_is_custom
                        .trim()
                        .parse::<bool>()
                        .unwrap_or(false);
                }
            }
            RECORD_TYPE_SUBJECT => subjects.push(record.into_subject()?),
            RECORD_TYPE_SLOT => slots.push(record.into_slot()?),
            other => {
                return Err(PersistenceError::InvalidData(format!(
                    "unknown record_type '{other}'"
                )));
            }
        }
    }

    let (calendar, has_custom_config) = match calendar_config {
        Some(config) => (StudyCalendar::from_config(&config), true),
        None => (StudyCalendar::default(), false),
    };
    super::validate_records(&subjects, &slots, &calendar)?;

    let mut planner = Planner::from_parts(
        metadata.unwrap_or_default(),
        calendar,
        calendar_is_custom && has_custom_config,
    );
    for subject in subjects {
        planner.upsert_subject_record(subject)?;
    }
    for slot in slots {
        planner.upsert_slot_record(slot)?;
    }
    Ok(planner)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_i32(input: &str) -> PersistenceResult<Option<i32>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}
