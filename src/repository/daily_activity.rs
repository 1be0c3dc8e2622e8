use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySqlConnection, MySqlPool};

use crate::attendance::submission::{
    ActivityUpdate, AdditionalActivityInput, GoalInput, GoalUpdate, PlannedActivityInput,
};
use crate::attendance::transition::CheckOutLabels;
use crate::model::additional_activity::AdditionalActivity;
use crate::model::daily_activity::{AttendanceStatus, DailyActivity, DailyActivityRow};
use crate::model::daily_goal::DailyGoal;
use crate::model::employee::{WorkHoursProfile, WorkHoursRow};
use crate::model::planned_activity::PlannedActivity;

const ACTIVITY_COLUMNS: &str = r#"
    id, user_id, date, status, attendance_status,
    checkin_time, checkout_time, checkin_location, checkout_location,
    morning_problems, afternoon_problems, notes, created_at, updated_at
"#;

/// Work hours of the user's employee profile, `None` when they have none.
pub async fn find_work_hours(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Option<WorkHoursProfile>, sqlx::Error> {
    let row = sqlx::query_as::<_, WorkHoursRow>(
        r#"
        SELECT e.work_start_time AS employee_start,
               e.work_end_time AS employee_end,
               c.work_start_time AS company_start,
               c.work_end_time AS company_end
        FROM employees e
        JOIN companies c ON c.id = e.company_id
        WHERE e.user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(WorkHoursProfile::resolve))
}

pub async fn find_by_user_date(
    pool: &MySqlPool,
    user_id: u64,
    date: NaiveDate,
) -> Result<Option<DailyActivity>, sqlx::Error> {
    let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM daily_activities WHERE user_id = ? AND date = ?");
    let row = sqlx::query_as::<_, DailyActivityRow>(&sql)
        .bind(user_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(DailyActivity::from))
}

/// Locks the user's row for `date`, if any, until the transaction ends.
pub async fn lock_for_user_date(
    conn: &mut MySqlConnection,
    user_id: u64,
    date: NaiveDate,
) -> Result<Option<DailyActivity>, sqlx::Error> {
    let sql = format!(
        "SELECT {ACTIVITY_COLUMNS} FROM daily_activities WHERE user_id = ? AND date = ? FOR UPDATE"
    );
    let row = sqlx::query_as::<_, DailyActivityRow>(&sql)
        .bind(user_id)
        .bind(date)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(DailyActivity::from))
}

/// Fetches the user's row for `date`, creating a pending one first if needed, and locks it.
pub async fn get_or_create_locked(
    conn: &mut MySqlConnection,
    user_id: u64,
    date: NaiveDate,
) -> Result<DailyActivity, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT IGNORE INTO daily_activities (user_id, date, status, attendance_status)
        VALUES (?, ?, 'pending', 'on_time')
        "#,
    )
    .bind(user_id)
    .bind(date)
    .execute(&mut *conn)
    .await?;

    lock_for_user_date(conn, user_id, date)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn record_check_in(
    conn: &mut MySqlConnection,
    activity_id: u64,
    checkin_time: DateTime<Utc>,
    location: &str,
    morning_problems: &str,
    attendance: AttendanceStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE daily_activities
        SET checkin_time = ?, checkin_location = ?, morning_problems = ?, attendance_status = ?
        WHERE id = ?
        "#,
    )
    .bind(checkin_time)
    .bind(location)
    .bind(morning_problems)
    .bind(attendance.as_str())
    .bind(activity_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn insert_planned_activities(
    conn: &mut MySqlConnection,
    activity_id: u64,
    items: &[PlannedActivityInput],
) -> Result<(), sqlx::Error> {
    for (i, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO planned_activities
            (daily_activity_id, title, description, status, priority, estimated_minutes, position)
            VALUES (?, ?, ?, 'pending', ?, ?, ?)
            "#,
        )
        .bind(activity_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(u8::from(item.priority))
        .bind(item.estimated_minutes)
        .bind(i as u32 + 1)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn insert_goals(
    conn: &mut MySqlConnection,
    activity_id: u64,
    items: &[GoalInput],
) -> Result<(), sqlx::Error> {
    for (i, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO daily_goals
            (daily_activity_id, title, description, status, priority, target_value, position)
            VALUES (?, ?, ?, 'pending', ?, ?, ?)
            "#,
        )
        .bind(activity_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(u8::from(item.priority))
        .bind(&item.target_value)
        .bind(i as u32 + 1)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn record_check_out(
    conn: &mut MySqlConnection,
    activity_id: u64,
    checkout_time: DateTime<Utc>,
    location: &str,
    afternoon_problems: &str,
    labels: CheckOutLabels,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE daily_activities
        SET checkout_time = ?, checkout_location = ?, afternoon_problems = ?,
            status = ?, attendance_status = ?
        WHERE id = ?
        "#,
    )
    .bind(checkout_time)
    .bind(location)
    .bind(afternoon_problems)
    .bind(labels.status.as_str())
    .bind(labels.attendance_status.map(AttendanceStatus::as_str))
    .bind(activity_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Updates that name an item outside this day are ignored.
pub async fn apply_activity_updates(
    conn: &mut MySqlConnection,
    activity_id: u64,
    updates: &[ActivityUpdate],
) -> Result<(), sqlx::Error> {
    for update in updates {
        sqlx::query(
            r#"
            UPDATE planned_activities
            SET status = ?, reasons = ?
            WHERE id = ? AND daily_activity_id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.reasons.trim())
        .bind(update.id)
        .bind(activity_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn apply_goal_updates(
    conn: &mut MySqlConnection,
    activity_id: u64,
    updates: &[GoalUpdate],
) -> Result<(), sqlx::Error> {
    for update in updates {
        sqlx::query(
            r#"
            UPDATE daily_goals
            SET status = ?, reasons = ?,
                completion_percentage = COALESCE(?, completion_percentage),
                achieved_value = COALESCE(?, achieved_value)
            WHERE id = ? AND daily_activity_id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.reasons.trim())
        .bind(update.completion_percentage.map(|p| p.min(100)))
        .bind(update.achieved_value.as_deref())
        .bind(update.id)
        .bind(activity_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn insert_additional_activities(
    conn: &mut MySqlConnection,
    activity_id: u64,
    items: &[AdditionalActivityInput],
) -> Result<(), sqlx::Error> {
    for (i, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO additional_activities
            (daily_activity_id, title, description, category, status,
             duration_minutes, position, impact_on_planned_work)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(activity_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.category.as_str())
        .bind(item.status.as_str())
        .bind(item.duration_minutes)
        .bind(i as u32 + 1)
        .bind(&item.impact_on_planned_work)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn planned_activities(
    conn: &mut MySqlConnection,
    activity_id: u64,
) -> Result<Vec<PlannedActivity>, sqlx::Error> {
    sqlx::query_as::<_, PlannedActivity>(
        r#"
        SELECT id, daily_activity_id, title, description, status, priority,
               estimated_minutes, position, reasons
        FROM planned_activities
        WHERE daily_activity_id = ?
        ORDER BY position, priority, created_at
        "#,
    )
    .bind(activity_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn daily_goals(
    conn: &mut MySqlConnection,
    activity_id: u64,
) -> Result<Vec<DailyGoal>, sqlx::Error> {
    sqlx::query_as::<_, DailyGoal>(
        r#"
        SELECT id, daily_activity_id, title, description, status, priority,
               target_value, achieved_value, completion_percentage, position, reasons
        FROM daily_goals
        WHERE daily_activity_id = ?
        ORDER BY position, priority, created_at
        "#,
    )
    .bind(activity_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn additional_activities(
    conn: &mut MySqlConnection,
    activity_id: u64,
) -> Result<Vec<AdditionalActivity>, sqlx::Error> {
    sqlx::query_as::<_, AdditionalActivity>(
        r#"
        SELECT id, daily_activity_id, title, description, category, status,
               duration_minutes, position, impact_on_planned_work
        FROM additional_activities
        WHERE daily_activity_id = ?
        ORDER BY position, created_at
        "#,
    )
    .bind(activity_id)
    .fetch_all(&mut *conn)
    .await
}

/// Most recent days first.
pub async fn recent_for_user(
    pool: &MySqlPool,
    user_id: u64,
    limit: u32,
) -> Result<Vec<DailyActivity>, sqlx::Error> {
    let sql = format!(
        "SELECT {ACTIVITY_COLUMNS} FROM daily_activities WHERE user_id = ? ORDER BY date DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, DailyActivityRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(DailyActivity::from).collect())
}
