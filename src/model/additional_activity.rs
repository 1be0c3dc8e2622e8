use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{IntoStaticStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdditionalActivityStatus {
    #[default]
    Completed,
    InProgress,
    Interrupted,
}

impl AdditionalActivityStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdditionalActivityCategory {
    Urgent,
    Meeting,
    Support,
    Research,
    Admin,
    #[default]
    Other,
}

impl AdditionalActivityCategory {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Unplanned work logged at check-out.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdditionalActivity {
    pub id: u64,
    #[serde(skip)]
    pub daily_activity_id: u64,
    pub title: String,
    pub description: String,
    #[schema(example = "meeting")]
    pub category: String,
    #[schema(example = "completed")]
    pub status: String,
    /// Time spent, in minutes.
    pub duration_minutes: Option<u32>,
    pub position: u32,
    pub impact_on_planned_work: String,
}
