use chrono::{Duration, NaiveDate};
use revision_tool::dashboard::{self, build_dashboard};
use revision_tool::{Difficulty, Planner, SlotStatus, Subject};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2025, 6, 2) // a Monday
}

/// Subjects from the end-to-end scenario plus one that should never be a
/// candidate, with a populated week of slots.
fn scenario_planner() -> Planner {
    let mut planner = Planner::new();
    planner
        .upsert_subject(
            Subject::new(1, 1, "Math", Difficulty::Hard).with_exam_date(today() + Duration::days(1)),
        )
        .unwrap();
    planner
        .upsert_subject(
            Subject::new(2, 1, "Art", Difficulty::Easy).with_exam_date(today() + Duration::days(1)),
        )
        .unwrap();
    planner
        .upsert_subject(Subject::new(3, 1, "Bio", Difficulty::Medium))
        .unwrap();
    planner
        .upsert_subject(
            Subject::new(4, 1, "Astronomy", Difficulty::Hard)
                .with_exam_date(today() + Duration::days(60)),
        )
        .unwrap();

    planner.ensure_week_slots(today(), 1).unwrap();
    let slots = planner.slots().unwrap();
    let slot_at = |date: NaiveDate, number: i32| {
        slots
            .iter()
            .find(|slot| slot.date == date && slot.slot_number == number)
            .unwrap()
            .id
    };

    // Bio is scheduled three times this week, once completed, once incomplete.
    planner.assign_slot(slot_at(d(2025, 6, 2), 1), Some(3)).unwrap();
    planner.assign_slot(slot_at(d(2025, 6, 3), 1), Some(3)).unwrap();
    planner.assign_slot(slot_at(d(2025, 6, 4), 1), Some(3)).unwrap();
    planner
        .set_slot_status(slot_at(d(2025, 6, 2), 1), Some(SlotStatus::Completed))
        .unwrap();
    planner
        .set_slot_status(slot_at(d(2025, 6, 3), 1), Some(SlotStatus::Incomplete))
        .unwrap();

    // Math is scheduled once and completed.
    planner.assign_slot(slot_at(d(2025, 6, 2), 2), Some(1)).unwrap();
    planner
        .set_slot_status(slot_at(d(2025, 6, 2), 2), Some(SlotStatus::Completed))
        .unwrap();

    planner
}

#[test]
fn top_priorities_follow_the_ranking_rules() {
    let planner = scenario_planner();
    let view = build_dashboard(&planner, today(), None).unwrap();

    let names: Vec<&str> = view
        .top_priorities
        .iter()
        .map(|subject| subject.name.as_str())
        .collect();
    // Math and Art share an urgent exam tomorrow (difficulty breaks the
    // tie); Bio qualifies only through this week's slots. Astronomy's exam
    // is outside the candidate window and it is not scheduled, so it never
    // appears.
    assert_eq!(names, vec!["Math", "Art", "Bio"]);
}

#[test]
fn week_bounds_are_monday_to_sunday() {
    let planner = scenario_planner();
    let view = build_dashboard(&planner, today(), None).unwrap();
    assert_eq!(view.week_start, d(2025, 6, 2));
    assert_eq!(view.week_end, d(2025, 6, 8));

    // A selected date mid-next-week moves the window but keeps urgency
    // pinned to today.
    let next_week = build_dashboard(&planner, today(), Some(d(2025, 6, 11))).unwrap();
    assert_eq!(next_week.week_start, d(2025, 6, 9));
    assert_eq!(next_week.week_end, d(2025, 6, 15));
}

#[test]
fn exams_next_7_days_are_sorted_by_date() {
    let planner = scenario_planner();
    let view = build_dashboard(&planner, today(), None).unwrap();

    let names: Vec<&str> = view
        .exams_next_7_days
        .iter()
        .map(|subject| subject.name.as_str())
        .collect();
    // Same exam date: alphabetical within the day.
    assert_eq!(names, vec!["Art", "Math"]);
}

#[test]
fn completion_rows_count_scheduled_completed_incomplete() {
    let planner = scenario_planner();
    let view = build_dashboard(&planner, today(), None).unwrap();

    assert_eq!(view.completion_by_subject.len(), 2);

    let bio = &view.completion_by_subject[0];
    assert_eq!(bio.subject_name, "Bio");
    assert_eq!(bio.scheduled_slots, 3);
    assert_eq!(bio.completed_slots, 1);
    assert_eq!(bio.incomplete_slots, 1);
    assert_eq!(bio.completion_percent(), 33);

    let math = &view.completion_by_subject[1];
    assert_eq!(math.subject_name, "Math");
    assert_eq!(math.scheduled_slots, 1);
    assert_eq!(math.completed_slots, 1);
    assert_eq!(math.completion_percent(), 100);
}

#[test]
fn empty_planner_builds_an_empty_dashboard() {
    let planner = Planner::new();
    let view = build_dashboard(&planner, today(), None).unwrap();
    assert!(view.top_priorities.is_empty());
    assert!(view.exams_next_7_days.is_empty());
    assert!(view.completion_by_subject.is_empty());
}

#[test]
fn top_priorities_cap_at_five() {
    let mut planner = Planner::new();
    for id in 1..=7 {
        planner
            .upsert_subject(
                Subject::new(id, 1, format!("Subject {id}"), Difficulty::Medium)
                    .with_exam_date(today() + Duration::days(id as i64)),
            )
            .unwrap();
    }
    let view = build_dashboard(&planner, today(), None).unwrap();
    assert_eq!(view.top_priorities.len(), dashboard::TOP_PRIORITY_COUNT);
}
