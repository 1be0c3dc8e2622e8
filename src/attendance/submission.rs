use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AttendanceError;
use crate::model::additional_activity::{AdditionalActivityCategory, AdditionalActivityStatus};
use crate::model::daily_goal::{DailyGoal, GoalStatus};
use crate::model::planned_activity::{PlannedActivity, PlannedActivityStatus};
use crate::model::priority::Priority;
use crate::utils::item_list::{
    FromTitle, ItemList, lenient_minutes, non_blank_lines, parse_json_list,
};

/// Check-in form. List fields accept a JSON array (or object) or one title per line.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckInForm {
    #[schema(example = "-6.2088")]
    pub lat: Option<String>,
    #[schema(example = "106.8456")]
    pub long: Option<String>,
    #[serde(default)]
    #[schema(example = "Fix login bug\nReview pull requests")]
    pub planned_activities: String,
    #[serde(default)]
    #[schema(example = r#"[{"title":"Close 3 tickets","target_value":"3"}]"#)]
    pub daily_goals: String,
    #[serde(default)]
    pub morning_problems: String,
}

/// Check-out form. Update lists are JSON arrays keyed by item id.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckOutForm {
    pub lat: Option<String>,
    pub long: Option<String>,
    #[serde(default)]
    #[schema(example = r#"[{"id":1,"status":"completed"}]"#)]
    pub activity_updates: String,
    #[serde(default)]
    #[schema(example = r#"[{"id":1,"status":"partially_completed","reasons":"blocked by review","completion_percentage":60}]"#)]
    pub goal_updates: String,
    #[serde(default)]
    pub additional_activities: String,
    #[serde(default)]
    pub additional_activities_text: String,
    #[serde(default)]
    pub afternoon_problems: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannedActivityInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, alias = "estimated_duration", deserialize_with = "lenient_minutes")]
    pub estimated_minutes: Option<u32>,
}

impl FromTitle for PlannedActivityInput {
    fn from_title(title: String) -> Self {
        Self {
            title,
            description: String::new(),
            priority: Priority::default(),
            estimated_minutes: None,
        }
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub target_value: String,
}

impl FromTitle for GoalInput {
    fn from_title(title: String) -> Self {
        Self {
            title,
            description: String::new(),
            priority: Priority::default(),
            target_value: String::new(),
        }
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdditionalActivityInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: AdditionalActivityCategory,
    #[serde(default)]
    pub status: AdditionalActivityStatus,
    #[serde(default, alias = "duration", deserialize_with = "lenient_minutes")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub impact_on_planned_work: String,
}

impl FromTitle for AdditionalActivityInput {
    fn from_title(title: String) -> Self {
        Self {
            title,
            description: String::new(),
            category: AdditionalActivityCategory::default(),
            status: AdditionalActivityStatus::default(),
            duration_minutes: None,
            impact_on_planned_work: String::new(),
        }
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityUpdate {
    pub id: u64,
    #[serde(default = "pending_activity")]
    pub status: PlannedActivityStatus,
    #[serde(default)]
    pub reasons: String,
}

fn pending_activity() -> PlannedActivityStatus {
    PlannedActivityStatus::Pending
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalUpdate {
    pub id: u64,
    #[serde(default = "pending_goal")]
    pub status: GoalStatus,
    #[serde(default)]
    pub reasons: String,
    pub completion_percentage: Option<u8>,
    pub achieved_value: Option<String>,
}

fn pending_goal() -> GoalStatus {
    GoalStatus::Pending
}

/// `"lat,long"` when both coordinates are present.
fn location(lat: Option<&str>, long: Option<&str>) -> Option<String> {
    match (lat.map(str::trim), long.map(str::trim)) {
        (Some(lat), Some(long)) if !lat.is_empty() && !long.is_empty() => {
            Some(format!("{lat},{long}"))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckInSubmission {
    pub location: String,
    pub planned_activities: Vec<PlannedActivityInput>,
    pub daily_goals: Vec<GoalInput>,
    pub morning_problems: String,
}

impl CheckInForm {
    pub fn validate(self) -> Result<CheckInSubmission, AttendanceError> {
        let location = location(self.lat.as_deref(), self.long.as_deref())
            .ok_or(AttendanceError::MissingLocation)?;

        let planned_activities =
            ItemList::<PlannedActivityInput>::parse(&self.planned_activities).into_items();
        let daily_goals = ItemList::<GoalInput>::parse(&self.daily_goals).into_items();

        if planned_activities.is_empty() {
            return Err(AttendanceError::NoPlannedActivities);
        }
        if daily_goals.is_empty() {
            return Err(AttendanceError::NoDailyGoals);
        }

        Ok(CheckInSubmission {
            location,
            planned_activities,
            daily_goals,
            morning_problems: self.morning_problems.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutSubmission {
    pub location: String,
    pub activity_updates: Vec<ActivityUpdate>,
    pub goal_updates: Vec<GoalUpdate>,
    pub additional_activities: Vec<AdditionalActivityInput>,
    pub afternoon_problems: String,
}

impl CheckOutForm {
    pub fn validate(self) -> Result<CheckOutSubmission, AttendanceError> {
        let location = location(self.lat.as_deref(), self.long.as_deref())
            .ok_or(AttendanceError::MissingLocation)?;

        let mut additional_activities =
            ItemList::<AdditionalActivityInput>::parse(&self.additional_activities).into_items();
        if additional_activities.is_empty() {
            let lines = non_blank_lines(&self.additional_activities_text);
            additional_activities = ItemList::<AdditionalActivityInput>::Lines(lines).into_items();
        }

        Ok(CheckOutSubmission {
            location,
            activity_updates: parse_json_list(&self.activity_updates),
            goal_updates: parse_json_list(&self.goal_updates),
            additional_activities,
            afternoon_problems: self.afternoon_problems.trim().to_string(),
        })
    }
}

impl CheckOutSubmission {
    /// Every planned activity and goal needs a non-pending status, and
    /// statuses that admit failure need a reason.
    pub fn check_items(
        &self,
        planned: &[PlannedActivity],
        goals: &[DailyGoal],
    ) -> Result<(), AttendanceError> {
        let activity_update = |id: u64| self.activity_updates.iter().find(|u| u.id == id);
        let goal_update = |id: u64| self.goal_updates.iter().find(|u| u.id == id);

        let activities_done = planned.iter().all(|a| {
            activity_update(a.id).is_some_and(|u| u.status != PlannedActivityStatus::Pending)
        });
        if !activities_done {
            return Err(AttendanceError::ActivityUpdatesMissing);
        }

        let goals_done = goals
            .iter()
            .all(|g| goal_update(g.id).is_some_and(|u| u.status != GoalStatus::Pending));
        if !goals_done {
            return Err(AttendanceError::GoalUpdatesMissing);
        }

        for activity in planned {
            if let Some(update) = activity_update(activity.id) {
                if update.status.requires_reason() && update.reasons.trim().is_empty() {
                    return Err(AttendanceError::ActivityReasonMissing(activity.title.clone()));
                }
            }
        }

        for goal in goals {
            if let Some(update) = goal_update(goal.id) {
                if update.status.requires_reason() && update.reasons.trim().is_empty() {
                    return Err(AttendanceError::GoalReasonMissing(goal.title.clone()));
                }
            }
        }

        Ok(())
    }
}
