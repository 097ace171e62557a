use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerMetadata {
    pub owner_name: String,
    pub planner_description: String,
    pub horizon_start_date: NaiveDate,
    pub horizon_end_date: NaiveDate,
}

impl Default for PlannerMetadata {
    fn default() -> Self {
        Self {
            owner_name: "New Planner".to_string(),
            planner_description: "No description".to_string(),
            horizon_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            horizon_end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        }
    }
}
