use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{IntoStaticStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlannedActivityStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Deferred,
    NotCompleted,
}

impl PlannedActivityStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Statuses that must be explained at check-out.
    pub fn requires_reason(self) -> bool {
        matches!(
            self,
            PlannedActivityStatus::NotCompleted
                | PlannedActivityStatus::Cancelled
                | PlannedActivityStatus::Deferred
        )
    }
}

/// Stored planned activity as returned by the status and history queries.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PlannedActivity {
    pub id: u64,
    #[serde(skip)]
    pub daily_activity_id: u64,
    pub title: String,
    pub description: String,
    #[schema(example = "completed")]
    pub status: String,
    #[schema(example = 2)]
    pub priority: u8,
    /// Estimated duration in minutes.
    pub estimated_minutes: Option<u32>,
    pub position: u32,
    pub reasons: String,
}
