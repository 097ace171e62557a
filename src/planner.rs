use crate::calendar::{StudyCalendar, StudyCalendarConfig};
use crate::constraints::{
    self, BatchDecision, ConstraintInputError, Decision, GridEdit, RejectionReason,
};
use crate::metadata::PlannerMetadata;
use crate::record_validation::{self, RecordValidationError};
use crate::subject::Subject;
use crate::timetable::{SlotStatus, TimetableSlot};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;

#[derive(Debug, Clone)]
pub enum PlannerMetadataError {
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for PlannerMetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerMetadataError::StartAfterEnd { start, end } => write!(
                f,
                "horizon start date {start} must be on or before horizon end date {end}"
            ),
        }
    }
}

impl std::error::Error for PlannerMetadataError {}

#[derive(Debug)]
pub enum PlannerError {
    DataFrame(PolarsError),
    InvalidRecord(RecordValidationError),
    UnknownSubject(i32),
    UnknownSlot(i32),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::DataFrame(err) => write!(f, "dataframe error: {err}"),
            PlannerError::InvalidRecord(err) => write!(f, "invalid record: {err}"),
            PlannerError::UnknownSubject(id) => write!(f, "no subject with id {id}"),
            PlannerError::UnknownSlot(id) => write!(f, "no timetable slot with id {id}"),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<PolarsError> for PlannerError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

impl From<RecordValidationError> for PlannerError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

impl From<ConstraintInputError> for PlannerError {
    fn from(value: ConstraintInputError) -> Self {
        match value {
            ConstraintInputError::UnknownSubject(id) => Self::UnknownSubject(id),
            ConstraintInputError::UnknownSlot(id) => Self::UnknownSlot(id),
        }
    }
}

/// One user's study plan: the subject table and the weekly timetable grid,
/// held as dataframes. All mutations go through the constraint checker
/// first; a `Decision::Rejected` return means nothing was changed.
#[derive(Debug)]
pub struct Planner {
    subjects_df: DataFrame,
    timetable_df: DataFrame,
    metadata: PlannerMetadata,
    calendar: StudyCalendar,
    calendar_is_custom: bool,
}

impl Planner {
    pub fn new() -> Self {
        Self::new_with_metadata(PlannerMetadata::default())
    }

    pub fn new_with_metadata(metadata: PlannerMetadata) -> Self {
        Self::from_parts(metadata, StudyCalendar::default(), false)
    }

    pub(crate) fn from_parts(
        metadata: PlannerMetadata,
        calendar: StudyCalendar,
        calendar_is_custom: bool,
    ) -> Self {
        Self {
            subjects_df: DataFrame::empty_with_schema(&Self::subject_schema()),
            timetable_df: DataFrame::empty_with_schema(&Self::timetable_schema()),
            metadata,
            calendar,
            calendar_is_custom,
        }
    }

    fn subject_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("user_id".into(), DataType::Int32),
            Field::new("name".into(), DataType::String),
            Field::new("difficulty".into(), DataType::String),
            Field::new("exam_date".into(), DataType::Date),
        ])
    }

    fn timetable_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("user_id".into(), DataType::Int32),
            Field::new("date".into(), DataType::Date),
            Field::new("slot_number".into(), DataType::Int32),
            Field::new("subject_id".into(), DataType::Int32),
            Field::new("status".into(), DataType::String),
        ])
    }

    pub fn subjects_dataframe(&self) -> &DataFrame {
        &self.subjects_df
    }

    pub fn timetable_dataframe(&self) -> &DataFrame {
        &self.timetable_df
    }

    pub fn metadata(&self) -> &PlannerMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: PlannerMetadata) -> Result<(), PlannerMetadataError> {
        if metadata.horizon_start_date > metadata.horizon_end_date {
            return Err(PlannerMetadataError::StartAfterEnd {
                start: metadata.horizon_start_date,
                end: metadata.horizon_end_date,
            });
        }
        self.metadata = metadata;
        Ok(())
    }

    pub fn calendar(&self) -> &StudyCalendar {
        &self.calendar
    }

    pub fn calendar_config(&self) -> StudyCalendarConfig {
        self.calendar.to_config()
    }

    pub fn calendar_is_custom(&self) -> bool {
        self.calendar_is_custom
    }

    pub fn set_calendar(&mut self, calendar: StudyCalendar) {
        self.calendar = calendar;
        self.calendar_is_custom = true;
    }

    // ---- snapshot decoding ----

    pub fn subjects(&self) -> Result<Vec<Subject>, PlannerError> {
        let mut subjects = Vec::with_capacity(self.subjects_df.height());
        for idx in 0..self.subjects_df.height() {
            subjects.push(Subject::from_dataframe_row(&self.subjects_df, idx)?);
        }
        Ok(subjects)
    }

    pub fn slots(&self) -> Result<Vec<TimetableSlot>, PlannerError> {
        let mut slots = Vec::with_capacity(self.timetable_df.height());
        for idx in 0..self.timetable_df.height() {
            slots.push(TimetableSlot::from_dataframe_row(&self.timetable_df, idx)?);
        }
        Ok(slots)
    }

    pub fn subject_by_id(&self, subject_id: i32) -> Result<Option<Subject>, PlannerError> {
        Ok(self
            .subjects()?
            .into_iter()
            .find(|subject| subject.id == subject_id))
    }

    pub fn slot_by_id(&self, slot_id: i32) -> Result<Option<TimetableSlot>, PlannerError> {
        Ok(self.slots()?.into_iter().find(|slot| slot.id == slot_id))
    }

    /// Slots dated inside the Monday-start week containing `date`.
    pub fn slots_in_week(&self, date: NaiveDate) -> Result<Vec<TimetableSlot>, PlannerError> {
        let start = StudyCalendar::week_start_monday(date);
        let end = StudyCalendar::week_end(date);
        Ok(self
            .slots()?
            .into_iter()
            .filter(|slot| slot.date >= start && slot.date <= end)
            .collect())
    }

    // ---- subject mutations ----

    /// Insert or update a subject. An exam-date change is validated against
    /// the subject's current slot assignments; a rejection leaves the
    /// planner untouched.
    pub fn upsert_subject(&mut self, subject: Subject) -> Result<Decision, PlannerError> {
        record_validation::validate_subject(&subject)?;

        if let Some(current) = self.subject_by_id(subject.id)? {
            if subject.exam_date != current.exam_date {
                let slots = self.slots()?;
                let decision =
                    constraints::validate_exam_date_change(&current, subject.exam_date, &slots);
                if !decision.is_accepted() {
                    return Ok(decision);
                }
            }
            Self::update_string_column(&mut self.subjects_df, "name", subject.id, &subject.name)?;
            Self::update_string_column(
                &mut self.subjects_df,
                "difficulty",
                subject.id,
                subject.difficulty.as_str(),
            )?;
            Self::update_date_column(
                &mut self.subjects_df,
                "exam_date",
                subject.id,
                subject.exam_date,
            )?;
            return Ok(Decision::Accepted);
        }

        let new_row = subject.to_dataframe_row()?;
        self.subjects_df = self.subjects_df.vstack(&new_row)?;
        Ok(Decision::Accepted)
    }

    /// Change (or clear) a subject's exam date, subject to the
    /// no-stranded-slots rule.
    pub fn set_exam_date(
        &mut self,
        subject_id: i32,
        new_exam_date: Option<NaiveDate>,
    ) -> Result<Decision, PlannerError> {
        let subject = self
            .subject_by_id(subject_id)?
            .ok_or(PlannerError::UnknownSubject(subject_id))?;

        let slots = self.slots()?;
        let decision = constraints::validate_exam_date_change(&subject, new_exam_date, &slots);
        if !decision.is_accepted() {
            return Ok(decision);
        }

        Self::update_date_column(&mut self.subjects_df, "exam_date", subject_id, new_exam_date)?;
        Ok(Decision::Accepted)
    }

    /// Delete a subject, refused while any slot still references it.
    pub fn delete_subject(&mut self, subject_id: i32) -> Result<Decision, PlannerError> {
        let subject = self
            .subject_by_id(subject_id)?
            .ok_or(PlannerError::UnknownSubject(subject_id))?;

        if let Err(slot_ids) = constraints::can_delete_subject(subject_id, &self.slots()?) {
            return Ok(Decision::Rejected(RejectionReason::SubjectStillScheduled {
                subject_name: subject.name,
                slot_ids,
            }));
        }

        let snapshot = self.subjects_df.clone();
        let mut remaining = DataFrame::empty_with_schema(&Self::subject_schema());
        for idx in 0..snapshot.height() {
            let row = Subject::from_dataframe_row(&snapshot, idx)?;
            if row.id == subject_id {
                continue;
            }
            remaining = remaining.vstack(&row.to_dataframe_row()?)?;
        }
        self.subjects_df = remaining;
        Ok(Decision::Accepted)
    }

    /// Load-path upsert that applies the record as-is, without consulting
    /// the constraint checker. Persistence validates whole snapshots
    /// before handing records to this.
    pub fn upsert_subject_record(&mut self, subject: Subject) -> Result<(), PlannerError> {
        if self.subject_by_id(subject.id)?.is_some() {
            Self::update_string_column(&mut self.subjects_df, "name", subject.id, &subject.name)?;
            Self::update_string_column(
                &mut self.subjects_df,
                "difficulty",
                subject.id,
                subject.difficulty.as_str(),
            )?;
            Self::update_date_column(
                &mut self.subjects_df,
                "exam_date",
                subject.id,
                subject.exam_date,
            )?;
            return Ok(());
        }
        let new_row = subject.to_dataframe_row()?;
        self.subjects_df = self.subjects_df.vstack(&new_row)?;
        Ok(())
    }

    // ---- timetable mutations ----

    pub fn upsert_slot_record(&mut self, slot: TimetableSlot) -> Result<(), PlannerError> {
        if self.slot_by_id(slot.id)?.is_some() {
            Self::update_date_column(&mut self.timetable_df, "date", slot.id, Some(slot.date))?;
            Self::update_i32_column(
                &mut self.timetable_df,
                "slot_number",
                slot.id,
                slot.slot_number,
            )?;
            Self::update_opt_i32_column(
                &mut self.timetable_df,
                "subject_id",
                slot.id,
                slot.subject_id,
            )?;
            Self::update_opt_string_column(
                &mut self.timetable_df,
                "status",
                slot.id,
                slot.status.map(|s| s.as_str()),
            )?;
            return Ok(());
        }
        let new_row = slot.to_dataframe_row()?;
        self.timetable_df = self.timetable_df.vstack(&new_row)?;
        Ok(())
    }

    /// Lazily create the weekly grid for the week containing `date`:
    /// one empty slot per (study day, slot number) cell not already
    /// present for the user. Returns how many slots were created.
    pub fn ensure_week_slots(
        &mut self,
        date: NaiveDate,
        user_id: i32,
    ) -> Result<usize, PlannerError> {
        let existing: Vec<(NaiveDate, i32)> = self
            .slots()?
            .into_iter()
            .filter(|slot| slot.user_id == user_id)
            .map(|slot| (slot.date, slot.slot_number))
            .collect();

        let mut next_id = self.next_slot_id()?;
        let mut created = 0;
        for (day, slot_number) in self.calendar.grid_cells_in_week(date) {
            if existing.contains(&(day, slot_number)) {
                continue;
            }
            let slot = TimetableSlot::new(next_id, user_id, day, slot_number);
            let new_row = slot.to_dataframe_row()?;
            self.timetable_df = self.timetable_df.vstack(&new_row)?;
            next_id += 1;
            created += 1;
        }
        Ok(created)
    }

    /// Assign a subject to a slot (or clear the assignment with `None`).
    /// Assignments after the subject's exam date are rejected and nothing
    /// changes.
    pub fn assign_slot(
        &mut self,
        slot_id: i32,
        subject_id: Option<i32>,
    ) -> Result<Decision, PlannerError> {
        let slot = self
            .slot_by_id(slot_id)?
            .ok_or(PlannerError::UnknownSlot(slot_id))?;

        if let Some(subject_id) = subject_id {
            let subject = self
                .subject_by_id(subject_id)?
                .ok_or(PlannerError::UnknownSubject(subject_id))?;
            let decision = constraints::validate_assignment(slot.date, &subject);
            if !decision.is_accepted() {
                return Ok(decision);
            }
        }

        Self::update_opt_i32_column(&mut self.timetable_df, "subject_id", slot_id, subject_id)?;
        if subject_id.is_none() {
            Self::update_opt_string_column(&mut self.timetable_df, "status", slot_id, None)?;
        }
        Ok(Decision::Accepted)
    }

    /// Mark a slot completed/incomplete, or clear the mark.
    pub fn set_slot_status(
        &mut self,
        slot_id: i32,
        status: Option<SlotStatus>,
    ) -> Result<(), PlannerError> {
        if self.slot_by_id(slot_id)?.is_none() {
            return Err(PlannerError::UnknownSlot(slot_id));
        }
        Self::update_opt_string_column(
            &mut self.timetable_df,
            "status",
            slot_id,
            status.map(|s| s.as_str()),
        )?;
        Ok(())
    }

    /// Apply a batch of grid edits, strict-atomic: every cell is validated
    /// up front and one rejection abandons the whole batch. On
    /// `BatchDecision::Rejected` no edit has been applied.
    pub fn save_grid(&mut self, edits: &[GridEdit]) -> Result<BatchDecision, PlannerError> {
        let slots = self.slots()?;
        let subjects = self.subjects()?;
        let decision = constraints::validate_grid_save(edits, &slots, &subjects)?;
        if !decision.is_accepted() {
            return Ok(decision);
        }

        for edit in edits {
            Self::update_opt_i32_column(
                &mut self.timetable_df,
                "subject_id",
                edit.slot_id,
                edit.subject_id,
            )?;
            Self::update_opt_string_column(
                &mut self.timetable_df,
                "status",
                edit.slot_id,
                edit.status.map(|s| s.as_str()),
            )?;
        }
        Ok(BatchDecision::Accepted)
    }

    // ---- id allocation ----

    pub fn next_subject_id(&self) -> Result<i32, PlannerError> {
        Self::next_id(&self.subjects_df)
    }

    pub fn next_slot_id(&self) -> Result<i32, PlannerError> {
        Self::next_id(&self.timetable_df)
    }

    fn next_id(df: &DataFrame) -> Result<i32, PlannerError> {
        if df.height() == 0 {
            return Ok(1);
        }
        let max = df.column("id")?.i32()?.into_iter().flatten().max();
        Ok(max.map(|m| m + 1).unwrap_or(1))
    }

    // ---- column update helpers ----

    fn update_string_column(
        df: &mut DataFrame,
        column_name: &str,
        row_id: i32,
        new_value: &str,
    ) -> Result<(), PolarsError> {
        let id_col = df.column("id")?;
        let target_col = df.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(row_id) { Some(new_value) } else { val })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_opt_string_column(
        df: &mut DataFrame,
        column_name: &str,
        row_id: i32,
        new_value: Option<&str>,
    ) -> Result<(), PolarsError> {
        let id_col = df.column("id")?;
        let target_col = df.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(row_id) { new_value } else { val })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_i32_column(
        df: &mut DataFrame,
        column_name: &str,
        row_id: i32,
        new_value: i32,
    ) -> Result<(), PolarsError> {
        Self::update_opt_i32_column(df, column_name, row_id, Some(new_value))
    }

    fn update_opt_i32_column(
        df: &mut DataFrame,
        column_name: &str,
        row_id: i32,
        new_value: Option<i32>,
    ) -> Result<(), PolarsError> {
        let id_col = df.column("id")?;
        let target_col = df.column(column_name)?;

        let new_series = target_col
            .i32()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(row_id) { new_value } else { val })
            .collect::<Int32Chunked>()
            .into_series()
            .with_name(column_name.into());

        df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_date_column(
        df: &mut DataFrame,
        column_name: &str,
        row_id: i32,
        new_date: Option<NaiveDate>,
    ) -> Result<(), PolarsError> {
        let replacement = match new_date {
            Some(date) => lit(date).cast(DataType::Date),
            None => lit(NULL).cast(DataType::Date),
        };
        *df = df
            .clone()
            .lazy()
            .with_column(
                when(col("id").eq(lit(row_id)))
                    .then(replacement)
                    .otherwise(col(column_name).cast(DataType::Date))
                    .alias(column_name),
            )
            .collect()?;
        Ok(())
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Difficulty;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn subject_schema_contains_expected_columns() {
        let schema = Planner::subject_schema();
        for name in ["id", "user_id", "name", "difficulty", "exam_date"] {
            assert!(schema.contains(name.into()), "missing column {name}");
        }
    }

    #[test]
    fn timetable_schema_contains_expected_columns() {
        let schema = Planner::timetable_schema();
        for name in ["id", "user_id", "date", "slot_number", "subject_id", "status"] {
            assert!(schema.contains(name.into()), "missing column {name}");
        }
    }

    #[test]
    fn upsert_subject_inserts_and_updates() {
        let mut planner = Planner::new();
        let subject = Subject::new(1, 1, "Maths", Difficulty::Medium);
        assert!(planner.upsert_subject(subject).unwrap().is_accepted());
        assert_eq!(planner.subjects_dataframe().height(), 1);

        let mut updated = Subject::new(1, 1, "Mathematics", Difficulty::Hard);
        updated.exam_date = Some(d(2025, 6, 20));
        assert!(planner.upsert_subject(updated).unwrap().is_accepted());

        let row = planner.subject_by_id(1).unwrap().unwrap();
        assert_eq!(row.name, "Mathematics");
        assert_eq!(row.difficulty, Difficulty::Hard);
        assert_eq!(row.exam_date, Some(d(2025, 6, 20)));
        assert_eq!(planner.subjects_dataframe().height(), 1);
    }

    #[test]
    fn next_ids_start_at_one_and_advance() {
        let mut planner = Planner::new();
        assert_eq!(planner.next_subject_id().unwrap(), 1);
        planner
            .upsert_subject(Subject::new(7, 1, "Latin", Difficulty::Easy))
            .unwrap();
        assert_eq!(planner.next_subject_id().unwrap(), 8);
    }
}
