pub mod calendar;
pub mod constraints;
pub mod dashboard;
pub mod metadata;
pub mod persistence;
pub mod planner;
pub mod priority;
pub(crate) mod record_validation;
pub mod subject;
pub mod timetable;

pub use calendar::{DEFAULT_SLOTS_PER_DAY, StudyCalendar, StudyCalendarConfig};
pub use constraints::{
    BatchDecision, ConstraintInputError, Decision, GridEdit, RejectedEdit, RejectionReason,
    can_delete_subject, validate_assignment, validate_exam_date_change, validate_grid_save,
};
pub use dashboard::{DashboardView, SubjectCompletionRow, build_dashboard};
pub use metadata::PlannerMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlannerStore;
pub use persistence::{
    PersistenceError, PlannerStore, load_planner_from_csv, load_planner_from_json,
    save_planner_to_csv, save_planner_to_json, validate_planner,
};
pub use planner::{Planner, PlannerError, PlannerMetadataError};
pub use priority::{compare, days_to_exam, rank, top_n};
pub use subject::{Difficulty, Subject};
pub use timetable::{SlotStatus, TimetableSlot};
