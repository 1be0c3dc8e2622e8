use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use derive_more::Display;
use futures_util::StreamExt;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};
use tracing::warn;

use crate::attendance::sweep::SweepRecord;
use crate::model::daily_activity::{ActivityStatus, AttendanceStatus};
use crate::model::employee::{WorkHoursProfile, WorkHoursRow};

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "store error: {}", _0)]
    Other(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The row changed (or vanished) after it was read.
    Conflict,
}

/// Read/write access the reconciliation sweep needs.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Every stored activity with its owner's work-hours profile.
    async fn list_all(&self) -> Result<Vec<SweepRecord>, StoreError>;

    /// Writes `status` and `attendance_status` back, but only if the row's
    /// `updated_at` still matches what was read.
    async fn save(&self, record: &SweepRecord) -> Result<SaveOutcome, StoreError>;
}

pub struct MySqlActivityStore {
    pool: MySqlPool,
}

impl MySqlActivityStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &MySqlRow) -> Result<SweepRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let attendance: Option<String> = row.try_get("attendance_status")?;
    let email: String = row.try_get("email")?;
    let username: String = row.try_get("username")?;
    let employee_id: Option<u64> = row.try_get("employee_id")?;

    // no employee row means no profile, not a profile with empty hours
    let profile = match employee_id {
        Some(_) => Some(WorkHoursProfile::resolve(WorkHoursRow {
            employee_start: row.try_get::<Option<NaiveTime>, _>("employee_start")?,
            employee_end: row.try_get::<Option<NaiveTime>, _>("employee_end")?,
            company_start: row.try_get::<Option<NaiveTime>, _>("company_start")?,
            company_end: row.try_get::<Option<NaiveTime>, _>("company_end")?,
        })),
        None => None,
    };

    Ok(SweepRecord {
        activity_id: row.try_get("id")?,
        owner: format!("{email} ({username})"),
        date: row.try_get::<NaiveDate, _>("date")?,
        status: status.parse().unwrap_or(ActivityStatus::Pending),
        attendance_status: AttendanceStatus::from_stored(attendance.as_deref()),
        checkin_time: row.try_get::<Option<DateTime<Utc>>, _>("checkin_time")?,
        checkout_time: row.try_get::<Option<DateTime<Utc>>, _>("checkout_time")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        profile,
    })
}

#[async_trait]
impl ActivityStore for MySqlActivityStore {
    async fn list_all(&self) -> Result<Vec<SweepRecord>, StoreError> {
        let mut stream = sqlx::query(
            r#"
            SELECT a.id, a.date, a.status, a.attendance_status,
                   a.checkin_time, a.checkout_time, a.updated_at,
                   u.username, u.email,
                   e.id AS employee_id,
                   e.work_start_time AS employee_start,
                   e.work_end_time AS employee_end,
                   c.work_start_time AS company_start,
                   c.work_end_time AS company_end
            FROM daily_activities a
            JOIN users u ON u.id = a.user_id
            LEFT JOIN employees e ON e.user_id = a.user_id
            LEFT JOIN companies c ON c.id = e.company_id
            ORDER BY a.date DESC, u.email
            "#,
        )
        .fetch(&self.pool);

        let mut records = Vec::new();
        while let Some(row) = stream.next().await {
            let row = row?;
            match record_from_row(&row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let id: Option<u64> = row.try_get("id").ok();
                    warn!(error = %e, activity_id = ?id, "Skipping unreadable activity row");
                }
            }
        }

        Ok(records)
    }

    async fn save(&self, record: &SweepRecord) -> Result<SaveOutcome, StoreError> {
        let attendance = record
            .attendance_status
            .ok_or_else(|| StoreError::Other("attendance_status must not be empty".into()))?;

        let result = sqlx::query(
            r#"
            UPDATE daily_activities
            SET status = ?, attendance_status = ?
            WHERE id = ? AND updated_at = ?
            "#,
        )
        .bind(record.status.as_str())
        .bind(attendance.as_str())
        .bind(record.activity_id)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() == 0 {
            SaveOutcome::Conflict
        } else {
            SaveOutcome::Saved
        })
    }
}

#[cfg(test)]
pub use memory::MemoryActivityStore;
