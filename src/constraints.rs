//! Legality checks for timetable edits.
//!
//! Every operation here is a pure function over the snapshot it is given:
//! nothing is mutated and no state is held between calls, so the checks
//! are safe to run speculatively (live form validation) or just before a
//! save. Business-rule violations come back as `Decision::Rejected` with a
//! message the end user can act on; malformed input (an edit naming a slot
//! or subject that is not in the snapshot) is a `ConstraintInputError`,
//! which callers must treat as a bug in the calling code, not a rejection.

use crate::subject::Subject;
use crate::timetable::{SlotStatus, TimetableSlot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Why an edit was refused. Rendered verbatim to the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The slot falls after the subject's exam date.
    AssignmentPastExam {
        subject_name: String,
        slot_date: NaiveDate,
        exam_date: NaiveDate,
    },
    /// Moving the exam date would strand slots scheduled after it.
    ExamDateStrandsSlots {
        subject_name: String,
        proposed_date: NaiveDate,
        latest_slot_date: NaiveDate,
    },
    /// The subject still occupies timetable slots.
    SubjectStillScheduled {
        subject_name: String,
        slot_ids: Vec<i32>,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::AssignmentPastExam {
                subject_name,
                slot_date,
                exam_date,
            } => write!(
                f,
                "cannot schedule '{subject_name}' on {slot_date}: its exam is on {exam_date}"
            ),
            RejectionReason::ExamDateStrandsSlots {
                subject_name,
                proposed_date,
                latest_slot_date,
            } => write!(
                f,
                "cannot move the exam for '{subject_name}' to {proposed_date}: \
                 it is still scheduled up to {latest_slot_date}; update the timetable first"
            ),
            RejectionReason::SubjectStillScheduled {
                subject_name,
                slot_ids,
            } => {
                let ids = slot_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "cannot delete '{subject_name}': timetable slots [{ids}] still reference it"
                )
            }
        }
    }
}

/// Outcome of a single constraint check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected(RejectionReason),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Accepted => f.write_str("accepted"),
            Decision::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// Precondition violation: the caller handed the checker an edit that does
/// not resolve against the snapshot. Distinct from `Decision::Rejected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintInputError {
    UnknownSubject(i32),
    UnknownSlot(i32),
}

impl fmt::Display for ConstraintInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintInputError::UnknownSubject(id) => {
                write!(f, "edit references subject id {id} absent from the snapshot")
            }
            ConstraintInputError::UnknownSlot(id) => {
                write!(f, "edit references timetable slot id {id} absent from the snapshot")
            }
        }
    }
}

impl std::error::Error for ConstraintInputError {}

/// A proposed change to one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEdit {
    pub slot_id: i32,
    pub subject_id: Option<i32>,
    pub status: Option<SlotStatus>,
}

/// One refused cell of a batch, carrying the reason for the refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEdit {
    pub slot_id: i32,
    pub reason: RejectionReason,
}

/// Outcome of validating a whole grid save. The batch is atomic: a single
/// rejected cell rejects the batch and nothing may be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDecision {
    Accepted,
    Rejected(Vec<RejectedEdit>),
}

impl BatchDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BatchDecision::Accepted)
    }
}

/// May `subject` legally occupy a slot on `slot_date`? Rejected when the
/// slot falls strictly after the subject's exam date.
pub fn validate_assignment(slot_date: NaiveDate, subject: &Subject) -> Decision {
    match subject.exam_date {
        Some(exam_date) if slot_date > exam_date => {
            Decision::Rejected(RejectionReason::AssignmentPastExam {
                subject_name: subject.name.clone(),
                slot_date,
                exam_date,
            })
        }
        _ => Decision::Accepted,
    }
}

/// May the subject's exam date become `new_exam_date`? Only a real change
/// to a concrete date is constrained: clearing the date, or re-submitting
/// the current one, is always accepted. A change is rejected while any
/// slot assigned to the subject falls strictly after the proposed date.
pub fn validate_exam_date_change(
    subject: &Subject,
    new_exam_date: Option<NaiveDate>,
    existing_slots: &[TimetableSlot],
) -> Decision {
    let Some(proposed) = new_exam_date else {
        return Decision::Accepted;
    };
    if subject.exam_date == Some(proposed) {
        return Decision::Accepted;
    }

    let latest_conflict = existing_slots
        .iter()
        .filter(|slot| slot.subject_id == Some(subject.id) && slot.date > proposed)
        .map(|slot| slot.date)
        .max();

    match latest_conflict {
        Some(latest_slot_date) => Decision::Rejected(RejectionReason::ExamDateStrandsSlots {
            subject_name: subject.name.clone(),
            proposed_date: proposed,
            latest_slot_date,
        }),
        None => Decision::Accepted,
    }
}

/// A subject may be deleted only while no slot references it. On refusal
/// the referencing slot ids are returned in ascending order.
pub fn can_delete_subject(subject_id: i32, slots: &[TimetableSlot]) -> Result<(), Vec<i32>> {
    let mut referencing: Vec<i32> = slots
        .iter()
        .filter(|slot| slot.subject_id == Some(subject_id))
        .map(|slot| slot.id)
        .collect();

    if referencing.is_empty() {
        Ok(())
    } else {
        referencing.sort_unstable();
        Err(referencing)
    }
}

/// Validate a batch of grid edits against a snapshot, strict-atomic: every
/// cell is checked, all rejections are collected, and one rejection
/// rejects the whole batch. Edits naming ids outside the snapshot are a
/// caller error, not a rejection.
pub fn validate_grid_save(
    edits: &[GridEdit],
    slots: &[TimetableSlot],
    subjects: &[Subject],
) -> Result<BatchDecision, ConstraintInputError> {
    let slots_by_id: HashMap<i32, &TimetableSlot> =
        slots.iter().map(|slot| (slot.id, slot)).collect();
    let subjects_by_id: HashMap<i32, &Subject> =
        subjects.iter().map(|subject| (subject.id, subject)).collect();

    let mut rejected = Vec::new();
    for edit in edits {
        let slot = slots_by_id
            .get(&edit.slot_id)
            .ok_or(ConstraintInputError::UnknownSlot(edit.slot_id))?;

        let Some(subject_id) = edit.subject_id else {
            continue;
        };
        let subject = subjects_by_id
            .get(&subject_id)
            .ok_or(ConstraintInputError::UnknownSubject(subject_id))?;

        if let Decision::Rejected(reason) = validate_assignment(slot.date, subject) {
            rejected.push(RejectedEdit {
                slot_id: edit.slot_id,
                reason,
            });
        }
    }

    if rejected.is_empty() {
        Ok(BatchDecision::Accepted)
    } else {
        Ok(BatchDecision::Rejected(rejected))
    }
}
