use chrono::NaiveDate;
use revision_tool::{Difficulty, Planner, SlotStatus, Subject, TimetableSlot};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn subject_roundtrips_through_planner_dataframe() {
    let mut planner = Planner::new();

    let subject = Subject::new(1, 7, "Further Maths", Difficulty::Hard).with_exam_date(d(2025, 6, 10));
    planner.upsert_subject_record(subject.clone()).unwrap();

    assert_eq!(planner.subjects_dataframe().height(), 1);

    let row = Subject::from_dataframe_row(planner.subjects_dataframe(), 0).unwrap();
    assert_eq!(row, subject);
}

#[test]
fn subject_without_exam_date_roundtrips() {
    let mut planner = Planner::new();
    let subject = Subject::new(2, 1, "Art", Difficulty::Easy);
    planner.upsert_subject_record(subject.clone()).unwrap();

    let row = Subject::from_dataframe_row(planner.subjects_dataframe(), 0).unwrap();
    assert_eq!(row.exam_date, None);
    assert_eq!(row, subject);
}

#[test]
fn slot_roundtrips_through_planner_dataframe() {
    let mut planner = Planner::new();

    let slot = TimetableSlot::new(5, 7, d(2025, 6, 3), 4)
        .with_subject(9)
        .with_status(SlotStatus::Incomplete);
    planner.upsert_slot_record(slot.clone()).unwrap();

    assert_eq!(planner.timetable_dataframe().height(), 1);

    let row = TimetableSlot::from_dataframe_row(planner.timetable_dataframe(), 0).unwrap();
    assert_eq!(row, slot);
}

#[test]
fn empty_slot_roundtrips_with_nulls() {
    let mut planner = Planner::new();
    let slot = TimetableSlot::new(1, 1, d(2025, 6, 2), 1);
    planner.upsert_slot_record(slot.clone()).unwrap();

    let row = TimetableSlot::from_dataframe_row(planner.timetable_dataframe(), 0).unwrap();
    assert_eq!(row.subject_id, None);
    assert_eq!(row.status, None);
    assert_eq!(row, slot);
}

#[test]
fn upsert_slot_record_updates_in_place() {
    let mut planner = Planner::new();
    planner
        .upsert_slot_record(TimetableSlot::new(1, 1, d(2025, 6, 2), 1))
        .unwrap();

    let updated = TimetableSlot::new(1, 1, d(2025, 6, 3), 2)
        .with_subject(4)
        .with_status(SlotStatus::Completed);
    planner.upsert_slot_record(updated.clone()).unwrap();

    assert_eq!(planner.timetable_dataframe().height(), 1);
    let row = TimetableSlot::from_dataframe_row(planner.timetable_dataframe(), 0).unwrap();
    assert_eq!(row, updated);
}
