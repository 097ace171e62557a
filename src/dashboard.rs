//! Weekly dashboard assembly: what to revise next, which exams are
//! imminent, and how much of this week's plan got done.

use crate::calendar::StudyCalendar;
use crate::planner::{Planner, PlannerError};
use crate::priority;
use crate::subject::Subject;
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::collections::HashSet;

/// How many priorities the dashboard surfaces.
pub const TOP_PRIORITY_COUNT: usize = 5;

/// Exams this many days out make the "coming up" list.
pub const EXAM_LOOKAHEAD_DAYS: i64 = 7;

/// Subjects with an exam inside this window are ranking candidates even
/// when they are not scheduled this week.
pub const CANDIDATE_EXAM_WINDOW_DAYS: i64 = 14;

/// Per-subject slot completion for one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCompletionRow {
    pub subject_id: i32,
    pub subject_name: String,
    pub scheduled_slots: i64,
    pub completed_slots: i64,
    pub incomplete_slots: i64,
}

impl SubjectCompletionRow {
    pub fn completion_percent(&self) -> i32 {
        if self.scheduled_slots <= 0 {
            return 0;
        }
        ((self.completed_slots as f64 * 100.0) / self.scheduled_slots as f64).round() as i32
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub top_priorities: Vec<Subject>,
    pub exams_next_7_days: Vec<Subject>,
    pub completion_by_subject: Vec<SubjectCompletionRow>,
}

/// Assemble the dashboard for the week containing `selected` (defaulting
/// to today's week). Urgency is always computed against `today`.
pub fn build_dashboard(
    planner: &Planner,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Result<DashboardView, PlannerError> {
    let week_start = StudyCalendar::week_start_monday(selected.unwrap_or(today));
    let week_end = week_start + Duration::days(6);

    let subjects = planner.subjects()?;

    let mut exams_next_7_days: Vec<Subject> = subjects
        .iter()
        .filter(|subject| {
            subject.exam_date.is_some_and(|exam| {
                exam >= today && exam <= today + Duration::days(EXAM_LOOKAHEAD_DAYS)
            })
        })
        .cloned()
        .collect();
    exams_next_7_days.sort_by(|a, b| a.exam_date.cmp(&b.exam_date).then_with(|| a.name.cmp(&b.name)));

    let scheduled_this_week: HashSet<i32> = planner
        .slots_in_week(week_start)?
        .into_iter()
        .filter_map(|slot| slot.subject_id)
        .collect();

    let candidates: Vec<Subject> = subjects
        .iter()
        .filter(|subject| {
            let exam_in_window = subject.exam_date.is_some_and(|exam| {
                exam >= today && exam <= today + Duration::days(CANDIDATE_EXAM_WINDOW_DAYS)
            });
            exam_in_window || scheduled_this_week.contains(&subject.id)
        })
        .cloned()
        .collect();

    let top_priorities = priority::top_n(&candidates, today, TOP_PRIORITY_COUNT);

    let completion_by_subject = completion_rows(planner, &subjects, week_start, week_end)?;

    Ok(DashboardView {
        week_start,
        week_end,
        top_priorities,
        exams_next_7_days,
        completion_by_subject,
    })
}

/// Scheduled/completed/incomplete counts per subject for the week, most
/// scheduled first. Aggregated lazily over the timetable frame.
fn completion_rows(
    planner: &Planner,
    subjects: &[Subject],
    week_start: NaiveDate,
    week_end: NaiveDate,
) -> Result<Vec<SubjectCompletionRow>, PlannerError> {
    let aggregated = planner
        .timetable_dataframe()
        .clone()
        .lazy()
        .filter(
            col("date")
                .gt_eq(lit(week_start).cast(DataType::Date))
                .and(col("date").lt_eq(lit(week_end).cast(DataType::Date)))
                .and(col("subject_id").is_not_null()),
        )
        .group_by([col("subject_id")])
        .agg([
            col("id").count().cast(DataType::Int64).alias("scheduled_slots"),
            col("status")
                .eq(lit("completed"))
                .cast(DataType::Int64)
                .sum()
                .alias("completed_slots"),
            col("status")
                .eq(lit("incomplete"))
                .cast(DataType::Int64)
                .sum()
                .alias("incomplete_slots"),
        ])
        .collect()?;

    let subject_ids = aggregated.column("subject_id")?.i32()?;
    let scheduled = aggregated.column("scheduled_slots")?.i64()?;
    let completed = aggregated.column("completed_slots")?.i64()?;
    let incomplete = aggregated.column("incomplete_slots")?.i64()?;

    let mut rows = Vec::with_capacity(aggregated.height());
    for idx in 0..aggregated.height() {
        let Some(subject_id) = subject_ids.get(idx) else {
            continue;
        };
        let subject_name = subjects
            .iter()
            .find(|subject| subject.id == subject_id)
            .map(|subject| subject.name.clone())
            .unwrap_or_else(|| format!("subject #{subject_id}"));

        rows.push(SubjectCompletionRow {
            subject_id,
            subject_name,
            scheduled_slots: scheduled.get(idx).unwrap_or(0),
            completed_slots: completed.get(idx).unwrap_or(0),
            incomplete_slots: incomplete.get(idx).unwrap_or(0),
        });
    }

    rows.sort_by(|a, b| {
        b.scheduled_slots
            .cmp(&a.scheduled_slots)
            .then_with(|| a.subject_name.cmp(&b.subject_name))
    });
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_percent_rounds_to_nearest_integer() {
        let row = SubjectCompletionRow {
            subject_id: 1,
            subject_name: "Maths".into(),
            scheduled_slots: 3,
            completed_slots: 2,
            incomplete_slots: 1,
        };
        assert_eq!(row.completion_percent(), 67);

        let empty = SubjectCompletionRow {
            subject_id: 2,
            subject_name: "Art".into(),
            scheduled_slots: 0,
            completed_slots: 0,
            incomplete_slots: 0,
        };
        assert_eq!(empty.completion_percent(), 0);
    }
}
