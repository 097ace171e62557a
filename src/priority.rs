//! Revision priority ordering.
//!
//! Subjects are ranked "most urgent first" for a given reference date by a
//! cascade of rules, evaluated in order until one is decisive:
//!
//! 1. exams within the urgent window (0-2 days) dominate everything else;
//! 2. when two exam dates are close (within 3 days of each other), higher
//!    difficulty wins, except that an easy subject due tomorrow jumps ahead;
//! 3. otherwise the sooner exam wins, difficulty breaking equal dates;
//! 4. any exam date beats no exam date;
//! 5. with no exam dates at all, higher difficulty wins.
//!
//! Each rule is a named predicate returning `Option<Ordering>`; `None`
//! means inconclusive and the next rule is consulted. Residual ties are
//! broken by subject name and id so the ranking is reproducible.

use crate::subject::{Difficulty, Subject};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// An exam this many days away (or fewer) is urgent.
pub const URGENT_WINDOW_DAYS: i64 = 2;

/// Two exam dates at most this many days apart are "close".
pub const CLOSE_BAND_DAYS: i64 = 3;

/// Whole days from the reference date to the subject's exam, negative once
/// the exam has passed. None when the subject has no exam date.
pub fn days_to_exam(subject: &Subject, reference: NaiveDate) -> Option<i64> {
    subject
        .exam_date
        .map(|exam| (exam - reference).num_days())
}

fn is_urgent(days: Option<i64>) -> bool {
    matches!(days, Some(d) if (0..=URGENT_WINDOW_DAYS).contains(&d))
}

/// Rule 1: a subject in the urgent band outranks one outside it. When both
/// are urgent the sooner exam wins, and difficulty settles equal dates.
fn urgency_band(a: &Subject, b: &Subject, reference: NaiveDate) -> Option<Ordering> {
    let da = days_to_exam(a, reference);
    let db = days_to_exam(b, reference);

    match (is_urgent(da), is_urgent(db)) {
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        (true, true) => match (da, db) {
            (Some(da), Some(db)) if da != db => Some(da.cmp(&db)),
            _ => Some(b.difficulty.cmp(&a.difficulty)),
        },
        (false, false) => None,
    }
}

/// Rule 2: within the close band, difficulty outweighs the exact date.
/// The exception: an easy subject whose exam is tomorrow comes first.
fn close_band_difficulty(a: &Subject, b: &Subject, reference: NaiveDate) -> Option<Ordering> {
    let da = days_to_exam(a, reference)?;
    let db = days_to_exam(b, reference)?;

    if (da - db).abs() > CLOSE_BAND_DAYS {
        return None;
    }

    let a_easy_next_day = a.difficulty == Difficulty::Easy && da == 1;
    let b_easy_next_day = b.difficulty == Difficulty::Easy && db == 1;

    if a_easy_next_day && !b_easy_next_day {
        return Some(Ordering::Less);
    }
    if b_easy_next_day && !a_easy_next_day {
        return Some(Ordering::Greater);
    }

    if a.difficulty != b.difficulty {
        return Some(b.difficulty.cmp(&a.difficulty));
    }

    None
}

/// Rule 3: sooner exam first; difficulty breaks equal dates. Decisive
/// whenever both subjects carry an exam date.
fn general_exam_date(a: &Subject, b: &Subject, reference: NaiveDate) -> Option<Ordering> {
    let da = days_to_exam(a, reference)?;
    let db = days_to_exam(b, reference)?;

    if da != db {
        return Some(da.cmp(&db));
    }
    Some(b.difficulty.cmp(&a.difficulty))
}

/// Rule 4: an exam date, however distant, outranks none at all.
fn missing_date_precedence(a: &Subject, b: &Subject, reference: NaiveDate) -> Option<Ordering> {
    match (days_to_exam(a, reference), days_to_exam(b, reference)) {
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        _ => None,
    }
}

/// Rule 5: with no dates in play, higher difficulty first.
fn difficulty_only(a: &Subject, b: &Subject, _reference: NaiveDate) -> Option<Ordering> {
    let ord = b.difficulty.cmp(&a.difficulty);
    if ord != Ordering::Equal {
        Some(ord)
    } else {
        None
    }
}

const RULES: [fn(&Subject, &Subject, NaiveDate) -> Option<Ordering>; 5] = [
    urgency_band,
    close_band_difficulty,
    general_exam_date,
    missing_date_precedence,
    difficulty_only,
];

/// Compare two subjects by revision urgency for the given reference date.
/// `Ordering::Less` means `a` ranks first. Returns `Equal` only when every
/// rule is inconclusive; `rank` breaks such ties by name and id.
pub fn compare(a: &Subject, b: &Subject, reference: NaiveDate) -> Ordering {
    for rule in RULES {
        if let Some(ordering) = rule(a, b, reference) {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Order subjects most urgent first. The ordering is total: ties left by
/// the rule cascade fall back to ascending name, then ascending id, so the
/// same input set always ranks identically.
pub fn rank(subjects: &[Subject], reference: NaiveDate) -> Vec<Subject> {
    let mut ranked = subjects.to_vec();
    ranked.sort_by(|a, b| {
        compare(a, b, reference)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// The first `n` subjects of `rank`.
pub fn top_n(subjects: &[Subject], reference: NaiveDate, n: usize) -> Vec<Subject> {
    let mut ranked = rank(subjects, reference);
    ranked.truncate(n);
    ranked
}
