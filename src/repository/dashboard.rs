use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use utoipa::ToSchema;

use crate::model::employee::Company;
use crate::model::user::User;

/// Reporting window for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    #[default]
    Week,
    Month,
    All,
}

impl DateRange {
    /// First date inside the window, `None` for no lower bound.
    pub fn start(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateRange::Today => Some(today),
            DateRange::Week => Some(week_start(today)),
            DateRange::Month => today.with_day(1),
            DateRange::All => None,
        }
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct AttendanceCounts {
    pub total: i64,
    pub checked_in: i64,
    pub checked_out: i64,
    pub completed: i64,
    pub on_time: i64,
    pub late: i64,
    pub absent: i64,
}

const COUNT_COLUMNS: &str = r#"
    COUNT(*) AS total,
    COUNT(a.checkin_time) AS checked_in,
    COUNT(a.checkout_time) AS checked_out,
    COUNT(CASE WHEN a.status = 'completed' THEN 1 END) AS completed,
    COUNT(CASE WHEN a.attendance_status = 'on_time' THEN 1 END) AS on_time,
    COUNT(CASE WHEN a.attendance_status = 'late' THEN 1 END) AS late,
    COUNT(CASE WHEN a.attendance_status = 'absent' THEN 1 END) AS absent
"#;

/// Counts for one user's days on or after `since`.
pub async fn user_counts_since(
    pool: &MySqlPool,
    user_id: u64,
    since: NaiveDate,
) -> Result<AttendanceCounts, sqlx::Error> {
    let sql = format!(
        "SELECT {COUNT_COLUMNS} FROM daily_activities a WHERE a.user_id = ? AND a.date >= ?"
    );
    sqlx::query_as::<_, AttendanceCounts>(&sql)
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await
}

/// Counts across all users in `[from, to]`, optionally for one company.
pub async fn counts_between(
    pool: &MySqlPool,
    company_id: Option<u64>,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<AttendanceCounts, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {COUNT_COLUMNS}
        FROM daily_activities a
        LEFT JOIN employees e ON e.user_id = a.user_id
        WHERE (? IS NULL OR a.date >= ?)
          AND a.date <= ?
          AND (? IS NULL OR e.company_id = ?)
        "#
    );
    sqlx::query_as::<_, AttendanceCounts>(&sql)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(company_id)
        .bind(company_id)
        .fetch_one(pool)
        .await
}

pub async fn active_user_count(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
        .fetch_one(pool)
        .await
}

pub async fn active_employee_count(
    pool: &MySqlPool,
    company_id: Option<u64>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM employees
        WHERE employment_status = 'active' AND (? IS NULL OR company_id = ?)
        "#,
    )
    .bind(company_id)
    .bind(company_id)
    .fetch_one(pool)
    .await
}

pub async fn late_users_on(
    pool: &MySqlPool,
    date: NaiveDate,
    company_id: Option<u64>,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.is_active
        FROM daily_activities a
        JOIN users u ON u.id = a.user_id
        LEFT JOIN employees e ON e.user_id = a.user_id
        WHERE a.date = ? AND a.attendance_status = 'late'
          AND (? IS NULL OR e.company_id = ?)
        ORDER BY a.checkin_time
        "#,
    )
    .bind(date)
    .bind(company_id)
    .bind(company_id)
    .fetch_all(pool)
    .await
}

const ABSENT_USERS_SQL: &str = r#"
    SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.is_active
    FROM users u
    LEFT JOIN employees e ON e.user_id = u.id
    WHERE u.is_active = TRUE
      AND (? IS NULL OR (e.company_id = ? AND e.employment_status = 'active'))
      AND NOT EXISTS (
          SELECT 1 FROM daily_activities a
          WHERE a.user_id = u.id AND a.date = ? AND a.checkin_time IS NOT NULL
      )
    ORDER BY u.email
"#;

/// Users with no check-in on `date`. With a company, only that company's
/// active employees, matching `active_employee_count`.
pub async fn absent_users_on(
    pool: &MySqlPool,
    date: NaiveDate,
    company_id: Option<u64>,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(ABSENT_USERS_SQL)
        .bind(company_id)
        .bind(company_id)
        .bind(date)
        .fetch_all(pool)
        .await
}

pub async fn active_companies(pool: &MySqlPool) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT id, name, code, work_start_time, work_end_time, is_active
        FROM companies
        WHERE is_active = TRUE
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-03-05 is a Thursday
        assert_eq!(week_start(d(2026, 3, 5)), d(2026, 3, 2));
        assert_eq!(week_start(d(2026, 3, 2)), d(2026, 3, 2));
        assert_eq!(week_start(d(2026, 3, 8)), d(2026, 3, 2));
    }

    #[test]
    fn range_lower_bounds() {
        let today = d(2026, 3, 5);
        assert_eq!(DateRange::Today.start(today), Some(today));
        assert_eq!(DateRange::Week.start(today), Some(d(2026, 3, 2)));
        assert_eq!(DateRange::Month.start(today), Some(d(2026, 3, 1)));
        assert_eq!(DateRange::All.start(today), None);
    }

    #[test]
    fn absent_list_is_scoped_like_the_expected_count() {
        assert_eq!(ABSENT_USERS_SQL.matches('?').count(), 3);
        assert!(ABSENT_USERS_SQL.contains("e.company_id = ?"));
        assert!(ABSENT_USERS_SQL.contains("e.employment_status = 'active'"));
    }

    #[test]
    fn range_parses_lowercase_and_defaults_to_week() {
        let r: DateRange = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(r, DateRange::Month);
        assert_eq!(DateRange::default(), DateRange::Week);
    }
}
