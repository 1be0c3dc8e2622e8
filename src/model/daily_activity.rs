use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{IntoStaticStr, Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a day's record, finalised at check-out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    Completed,
    Absent,
    EarlyCheckout,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Punctuality label derived by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    OnTime,
    Late,
    Absent,
    EarlyCheckout,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Reads a stored label. NULL, blank and unknown values are all "empty".
    pub fn from_stored(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

/// Raw `daily_activities` row. Enum columns are plain strings in MySQL.
#[derive(Debug, FromRow)]
pub struct DailyActivityRow {
    pub id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    pub status: String,
    pub attendance_status: Option<String>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub checkout_time: Option<DateTime<Utc>>,
    pub checkin_location: Option<String>,
    pub checkout_location: Option<String>,
    pub morning_problems: String,
    pub afternoon_problems: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user's attendance and activity log for one calendar date.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyActivity {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: ActivityStatus,
    /// `None` when the stored label is missing or unreadable.
    pub attendance_status: Option<AttendanceStatus>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub checkin_time: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub checkout_time: Option<DateTime<Utc>>,
    pub checkin_location: Option<String>,
    pub checkout_location: Option<String>,
    pub morning_problems: String,
    pub afternoon_problems: String,
    pub notes: String,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<DailyActivityRow> for DailyActivity {
    fn from(row: DailyActivityRow) -> Self {
        // an unreadable status column is treated as a day that was never closed
        let status = row.status.parse().unwrap_or(ActivityStatus::Pending);

        Self {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            status,
            attendance_status: AttendanceStatus::from_stored(row.attendance_status.as_deref()),
            checkin_time: row.checkin_time,
            checkout_time: row.checkout_time,
            checkin_location: row.checkin_location,
            checkout_location: row.checkout_location,
            morning_problems: row.morning_problems,
            afternoon_problems: row.afternoon_problems,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl DailyActivity {
    pub fn is_checked_in(&self) -> bool {
        self.checkin_time.is_some()
    }

    pub fn is_checked_out(&self) -> bool {
        self.checkout_time.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.status == ActivityStatus::Completed
    }

    /// Time between check-in and check-out, once both exist.
    pub fn work_duration(&self) -> Option<Duration> {
        match (self.checkin_time, self.checkout_time) {
            (Some(checkin), Some(checkout)) => Some(checkout - checkin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row() -> DailyActivityRow {
        let created = Utc.with_ymd_and_hms(2026, 1, 5, 1, 0, 0).unwrap();
        DailyActivityRow {
            id: 7,
            user_id: 3,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            status: "pending".into(),
            attendance_status: Some("on_time".into()),
            checkin_time: None,
            checkout_time: None,
            checkin_location: None,
            checkout_location: None,
            morning_problems: String::new(),
            afternoon_problems: String::new(),
            notes: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn stored_attendance_labels_are_parsed_in_snake_case() {
        assert_eq!(
            AttendanceStatus::from_stored(Some("early_checkout")),
            Some(AttendanceStatus::EarlyCheckout)
        );
        assert_eq!(AttendanceStatus::from_stored(Some("on_time")), Some(AttendanceStatus::OnTime));
        assert_eq!(AttendanceStatus::OnTime.as_str(), "on_time");
        assert_eq!(ActivityStatus::EarlyCheckout.to_string(), "early_checkout");
    }

    #[test]
    fn blank_or_unknown_attendance_is_empty() {
        assert_eq!(AttendanceStatus::from_stored(None), None);
        assert_eq!(AttendanceStatus::from_stored(Some("   ")), None);
        assert_eq!(AttendanceStatus::from_stored(Some("tardy")), None);
    }

    #[test]
    fn work_duration_needs_both_timestamps() {
        let mut activity = DailyActivity::from(row());
        assert!(!activity.is_checked_in());
        assert_eq!(activity.work_duration(), None);

        activity.checkin_time = Some(Utc.with_ymd_and_hms(2026, 1, 5, 2, 0, 0).unwrap());
        assert!(activity.is_checked_in());
        assert!(!activity.is_checked_out());
        assert_eq!(activity.work_duration(), None);

        activity.checkout_time = Some(Utc.with_ymd_and_hms(2026, 1, 5, 10, 30, 0).unwrap());
        assert_eq!(activity.work_duration(), Some(Duration::minutes(510)));
    }

    #[test]
    fn serde_uses_snake_case_labels() {
        let v = serde_json::to_value(AttendanceStatus::EarlyCheckout).unwrap();
        assert_eq!(v, serde_json::json!("early_checkout"));
        let s: ActivityStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, ActivityStatus::Completed);
    }
}
