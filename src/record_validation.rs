use crate::calendar::StudyCalendar;
use crate::subject::Subject;
use crate::timetable::TimetableSlot;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone)]
pub struct RecordValidationError {
    message: String,
}

impl RecordValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RecordValidationError {}

pub fn validate_subject(subject: &Subject) -> Result<(), RecordValidationError> {
    if subject.name.trim().is_empty() {
        return Err(RecordValidationError::new(format!(
            "subject {} requires a non-empty name",
            subject.id
        )));
    }
    Ok(())
}

pub fn validate_subject_collection(subjects: &[Subject]) -> Result<(), RecordValidationError> {
    let mut seen_ids = HashSet::with_capacity(subjects.len());
    for subject in subjects {
        if !seen_ids.insert(subject.id) {
            return Err(RecordValidationError::new(format!(
                "duplicate subject id {}",
                subject.id
            )));
        }
        validate_subject(subject)?;
    }
    Ok(())
}

pub fn validate_slot(
    slot: &TimetableSlot,
    calendar: &StudyCalendar,
) -> Result<(), RecordValidationError> {
    if !calendar.is_valid_slot_number(slot.slot_number) {
        return Err(RecordValidationError::new(format!(
            "timetable slot {} has slot number {} outside 1..={}",
            slot.id,
            slot.slot_number,
            calendar.slots_per_day()
        )));
    }
    Ok(())
}

/// Cross-record preconditions: unique ids, one slot per grid cell, and
/// every assignment resolving to a supplied subject owned by the same
/// user. Violations are caller errors, never constraint rejections.
pub fn validate_planner_records(
    subjects: &[Subject],
    slots: &[TimetableSlot],
    calendar: &StudyCalendar,
) -> Result<(), RecordValidationError> {
    validate_subject_collection(subjects)?;

    let subjects_by_id: HashMap<i32, &Subject> =
        subjects.iter().map(|subject| (subject.id, subject)).collect();

    let mut seen_ids = HashSet::with_capacity(slots.len());
    let mut seen_cells = HashSet::with_capacity(slots.len());
    for slot in slots {
        if !seen_ids.insert(slot.id) {
            return Err(RecordValidationError::new(format!(
                "duplicate timetable slot id {}",
                slot.id
            )));
        }
        if !seen_cells.insert((slot.user_id, slot.date, slot.slot_number)) {
            return Err(RecordValidationError::new(format!(
                "duplicate grid cell {} slot {} for user {}",
                slot.date, slot.slot_number, slot.user_id
            )));
        }
        validate_slot(slot, calendar)?;

        if let Some(subject_id) = slot.subject_id {
            match subjects_by_id.get(&subject_id) {
                None => {
                    return Err(RecordValidationError::new(format!(
                        "timetable slot {} references unknown subject id {}",
                        slot.id, subject_id
                    )));
                }
                Some(subject) if subject.user_id != slot.user_id => {
                    return Err(RecordValidationError::new(format!(
                        "timetable slot {} (user {}) references subject {} owned by user {}",
                        slot.id, slot.user_id, subject.id, subject.user_id
                    )));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
