use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{IntoStaticStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Completed,
    PartiallyCompleted,
    NotAchieved,
    Deferred,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn requires_reason(self) -> bool {
        matches!(
            self,
            GoalStatus::NotAchieved | GoalStatus::PartiallyCompleted | GoalStatus::Deferred
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyGoal {
    pub id: u64,
    #[serde(skip)]
    pub daily_activity_id: u64,
    pub title: String,
    pub description: String,
    #[schema(example = "partially_completed")]
    pub status: String,
    pub priority: u8,
    pub target_value: String,
    pub achieved_value: String,
    /// 0..=100
    pub completion_percentage: u8,
    pub position: u32,
    pub reasons: String,
}

impl DailyGoal {
    pub fn is_partially_completed(&self) -> bool {
        self.status == GoalStatus::PartiallyCompleted.as_str()
            || (self.completion_percentage > 0 && self.completion_percentage < 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_required_statuses() {
        assert!(GoalStatus::NotAchieved.requires_reason());
        assert!(GoalStatus::PartiallyCompleted.requires_reason());
        assert!(GoalStatus::Deferred.requires_reason());
        assert!(!GoalStatus::Completed.requires_reason());
        assert!(!GoalStatus::InProgress.requires_reason());
    }

    #[test]
    fn partial_completion_by_percentage() {
        let goal = DailyGoal {
            id: 1,
            daily_activity_id: 1,
            title: "ship".into(),
            description: String::new(),
            status: "in_progress".into(),
            priority: 2,
            target_value: String::new(),
            achieved_value: String::new(),
            completion_percentage: 40,
            position: 1,
            reasons: String::new(),
        };
        assert!(goal.is_partially_completed());
    }
}
