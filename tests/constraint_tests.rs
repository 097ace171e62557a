use chrono::NaiveDate;
use revision_tool::{
    BatchDecision, ConstraintInputError, Decision, Difficulty, GridEdit, RejectionReason, Subject,
    TimetableSlot, can_delete_subject, validate_assignment, validate_exam_date_change,
    validate_grid_save,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn maths_with_exam(exam: NaiveDate) -> Subject {
    Subject::new(1, 1, "Maths", Difficulty::Hard).with_exam_date(exam)
}

#[test]
fn assignment_after_exam_is_rejected_with_both_dates() {
    let subject = maths_with_exam(d(2025, 6, 10));
    let decision = validate_assignment(d(2025, 6, 11), &subject);
    match decision {
        Decision::Rejected(RejectionReason::AssignmentPastExam {
            ref subject_name,
            slot_date,
            exam_date,
        }) => {
            assert_eq!(subject_name, "Maths");
            assert_eq!(slot_date, d(2025, 6, 11));
            assert_eq!(exam_date, d(2025, 6, 10));
        }
        other => panic!("expected AssignmentPastExam rejection, got {other:?}"),
    }
    let message = decision.to_string();
    assert!(message.contains("Maths"));
    assert!(message.contains("2025-06-11"));
    assert!(message.contains("2025-06-10"));
}

#[test]
fn assignment_on_or_before_exam_is_accepted() {
    let subject = maths_with_exam(d(2025, 6, 10));
    assert!(validate_assignment(d(2025, 6, 10), &subject).is_accepted());
    assert!(validate_assignment(d(2025, 6, 9), &subject).is_accepted());
}

#[test]
fn assignment_without_exam_date_is_always_accepted() {
    let subject = Subject::new(1, 1, "Art", Difficulty::Easy);
    assert!(validate_assignment(d(2030, 1, 1), &subject).is_accepted());
}

#[test]
fn exam_date_change_rejected_while_later_slots_exist() {
    let subject = maths_with_exam(d(2025, 6, 30));
    let slots = vec![
        TimetableSlot::new(10, 1, d(2025, 6, 15), 1).with_subject(1),
        TimetableSlot::new(11, 1, d(2025, 6, 12), 2).with_subject(1),
        TimetableSlot::new(12, 1, d(2025, 6, 20), 1).with_subject(2),
    ];

    let decision = validate_exam_date_change(&subject, Some(d(2025, 6, 10)), &slots);
    match decision {
        Decision::Rejected(RejectionReason::ExamDateStrandsSlots {
            ref subject_name,
            proposed_date,
            latest_slot_date,
        }) => {
            assert_eq!(subject_name, "Maths");
            assert_eq!(proposed_date, d(2025, 6, 10));
            assert_eq!(latest_slot_date, d(2025, 6, 15));
        }
        other => panic!("expected ExamDateStrandsSlots rejection, got {other:?}"),
    }
}

#[test]
fn exam_date_change_accepted_when_after_all_slots() {
    let subject = maths_with_exam(d(2025, 6, 12));
    let slots = vec![TimetableSlot::new(10, 1, d(2025, 6, 15), 1).with_subject(1)];
    assert!(validate_exam_date_change(&subject, Some(d(2025, 6, 20)), &slots).is_accepted());
}

#[test]
fn clearing_an_exam_date_is_always_accepted() {
    let subject = maths_with_exam(d(2025, 6, 10));
    let slots = vec![TimetableSlot::new(10, 1, d(2025, 6, 15), 1).with_subject(1)];
    assert!(validate_exam_date_change(&subject, None, &slots).is_accepted());
}

#[test]
fn resubmitting_the_current_exam_date_is_accepted() {
    let subject = maths_with_exam(d(2025, 6, 10));
    // A slot already sits past the exam; re-submitting the unchanged date
    // must not be treated as a new change.
    let slots = vec![TimetableSlot::new(10, 1, d(2025, 6, 15), 1).with_subject(1)];
    assert!(validate_exam_date_change(&subject, Some(d(2025, 6, 10)), &slots).is_accepted());
}

#[test]
fn can_delete_subject_lists_referencing_slots_in_order() {
    let slots = vec![
        TimetableSlot::new(30, 1, d(2025, 6, 3), 1).with_subject(1),
        TimetableSlot::new(12, 1, d(2025, 6, 2), 1).with_subject(1),
        TimetableSlot::new(20, 1, d(2025, 6, 2), 2).with_subject(2),
    ];
    assert_eq!(can_delete_subject(1, &slots), Err(vec![12, 30]));
    assert_eq!(can_delete_subject(2, &slots), Err(vec![20]));
    assert_eq!(can_delete_subject(3, &slots), Ok(()));
    assert_eq!(can_delete_subject(1, &[]), Ok(()));
}

#[test]
fn grid_save_is_atomic_one_rejection_rejects_the_batch() {
    let subjects = vec![
        maths_with_exam(d(2025, 6, 10)),
        Subject::new(2, 1, "Art", Difficulty::Easy),
    ];
    let slots = vec![
        TimetableSlot::new(1, 1, d(2025, 6, 9), 1),
        TimetableSlot::new(2, 1, d(2025, 6, 11), 1),
        TimetableSlot::new(3, 1, d(2025, 6, 12), 1),
    ];

    let edits = vec![
        GridEdit {
            slot_id: 1,
            subject_id: Some(1),
            status: None,
        },
        GridEdit {
            slot_id: 2,
            subject_id: Some(1), // past the exam
            status: None,
        },
        GridEdit {
            slot_id: 3,
            subject_id: Some(2), // fine on its own, still not persisted
            status: None,
        },
    ];

    match validate_grid_save(&edits, &slots, &subjects).unwrap() {
        BatchDecision::Rejected(rejected) => {
            assert_eq!(rejected.len(), 1);
            assert_eq!(rejected[0].slot_id, 2);
        }
        BatchDecision::Accepted => panic!("batch with a late assignment must be rejected"),
    }
}

#[test]
fn grid_save_accepts_clearing_and_legal_assignments() {
    let subjects = vec![maths_with_exam(d(2025, 6, 10))];
    let slots = vec![
        TimetableSlot::new(1, 1, d(2025, 6, 9), 1).with_subject(1),
        TimetableSlot::new(2, 1, d(2025, 6, 11), 1).with_subject(1),
    ];

    let edits = vec![
        GridEdit {
            slot_id: 1,
            subject_id: Some(1),
            status: None,
        },
        // Clearing an illegal historical assignment is always allowed.
        GridEdit {
            slot_id: 2,
            subject_id: None,
            status: None,
        },
    ];
    assert!(validate_grid_save(&edits, &slots, &subjects).unwrap().is_accepted());
}

#[test]
fn grid_save_collects_every_rejection() {
    let subjects = vec![maths_with_exam(d(2025, 6, 10))];
    let slots = vec![
        TimetableSlot::new(1, 1, d(2025, 6, 11), 1),
        TimetableSlot::new(2, 1, d(2025, 6, 12), 1),
    ];
    let edits = vec![
        GridEdit {
            slot_id: 1,
            subject_id: Some(1),
            status: None,
        },
        GridEdit {
            slot_id: 2,
            subject_id: Some(1),
            status: None,
        },
    ];
    match validate_grid_save(&edits, &slots, &subjects).unwrap() {
        BatchDecision::Rejected(rejected) => {
            let ids: Vec<i32> = rejected.iter().map(|r| r.slot_id).collect();
            assert_eq!(ids, vec![1, 2]);
        }
        BatchDecision::Accepted => panic!("expected both edits rejected"),
    }
}

#[test]
fn grid_save_fails_fast_on_unknown_ids() {
    let subjects = vec![maths_with_exam(d(2025, 6, 10))];
    let slots = vec![TimetableSlot::new(1, 1, d(2025, 6, 9), 1)];

    let unknown_slot = vec![GridEdit {
        slot_id: 99,
        subject_id: Some(1),
        status: None,
    }];
    assert_eq!(
        validate_grid_save(&unknown_slot, &slots, &subjects).unwrap_err(),
        ConstraintInputError::UnknownSlot(99)
    );

    let unknown_subject = vec![GridEdit {
        slot_id: 1,
        subject_id: Some(42),
        status: None,
    }];
    assert_eq!(
        validate_grid_save(&unknown_subject, &slots, &subjects).unwrap_err(),
        ConstraintInputError::UnknownSubject(42)
    );
}
