use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{info, instrument};

use crate::attendance::submission::{CheckInForm, CheckOutForm};
use crate::attendance::transition::AttendancePolicy;
use crate::auth::auth::AuthUser;
use crate::error::{ApiError, AttendanceError};
use crate::model::daily_activity::DailyActivity;
use crate::repository::daily_activity;

const HISTORY_LIMIT: u32 = 30;

fn local_clock(policy: &AttendancePolicy, instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&policy.classifier().timezone())
        .format("%H:%M")
        .to_string()
}

/// Morning check-in with the day's plan
#[utoipa::path(
    post,
    path = "/api/activity/check-in",
    request_body(content = CheckInForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Checked in", body = Object, example = json!({
            "success": true,
            "message": "Checked in successfully!",
            "time": "08:57",
            "location": "-6.2,106.8",
            "planned_activities_count": 3,
            "daily_goals_count": 2
        })),
        (status = 400, description = "Rejected submission", body = Object, example = json!({
            "success": false,
            "error": "You have already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
#[instrument(skip_all, fields(user_id = auth.user_id, username = %auth.username))]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<AttendancePolicy>,
    form: web::Form<CheckInForm>,
) -> Result<HttpResponse, ApiError> {
    let submission = form.into_inner().validate()?;

    let now = Utc::now();
    let today = policy.today(now);
    let profile = daily_activity::find_work_hours(pool.get_ref(), auth.user_id).await?;

    let mut tx = pool.begin().await?;
    let activity = daily_activity::get_or_create_locked(&mut *tx, auth.user_id, today).await?;
    policy.ensure_can_check_in(&activity)?;

    let attendance = policy.check_in_label(today, now, profile.as_ref());
    daily_activity::record_check_in(
        &mut *tx,
        activity.id,
        now,
        &submission.location,
        &submission.morning_problems,
        attendance,
    )
    .await?;
    daily_activity::insert_planned_activities(&mut *tx, activity.id, &submission.planned_activities)
        .await?;
    daily_activity::insert_goals(&mut *tx, activity.id, &submission.daily_goals).await?;
    tx.commit().await?;

    info!(
        activity_id = activity.id,
        %today,
        attendance_status = %attendance,
        planned = submission.planned_activities.len(),
        goals = submission.daily_goals.len(),
        "Checked in"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Checked in successfully!",
        "time": local_clock(&policy, now),
        "location": submission.location,
        "planned_activities_count": submission.planned_activities.len(),
        "daily_goals_count": submission.daily_goals.len(),
    })))
}

/// Evening check-out with item outcomes
#[utoipa::path(
    post,
    path = "/api/activity/check-out",
    request_body(content = CheckOutForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Checked out", body = Object, example = json!({
            "success": true,
            "message": "Checked out successfully!",
            "time": "17:04",
            "location": "-6.2,106.8",
            "additional_activities_count": 1
        })),
        (status = 400, description = "Rejected submission", body = Object, example = json!({
            "success": false,
            "error": "Please provide a reason for activity: Write report"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
#[instrument(skip_all, fields(user_id = auth.user_id, username = %auth.username))]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<AttendancePolicy>,
    form: web::Form<CheckOutForm>,
) -> Result<HttpResponse, ApiError> {
    let submission = form.into_inner().validate()?;

    let now = Utc::now();
    let today = policy.today(now);
    let profile = daily_activity::find_work_hours(pool.get_ref(), auth.user_id).await?;

    let mut tx = pool.begin().await?;
    let activity = daily_activity::lock_for_user_date(&mut *tx, auth.user_id, today)
        .await?
        .ok_or(AttendanceError::NotCheckedIn)?;
    let checkin = policy.ensure_can_check_out(Some(&activity), now)?;

    let planned = daily_activity::planned_activities(&mut *tx, activity.id).await?;
    let goals = daily_activity::daily_goals(&mut *tx, activity.id).await?;
    submission.check_items(&planned, &goals)?;

    let labels = policy.check_out_labels(
        today,
        checkin,
        now,
        activity.attendance_status,
        profile.as_ref(),
    );
    daily_activity::record_check_out(
        &mut *tx,
        activity.id,
        now,
        &submission.location,
        &submission.afternoon_problems,
        labels,
    )
    .await?;
    daily_activity::apply_activity_updates(&mut *tx, activity.id, &submission.activity_updates)
        .await?;
    daily_activity::apply_goal_updates(&mut *tx, activity.id, &submission.goal_updates).await?;
    daily_activity::insert_additional_activities(
        &mut *tx,
        activity.id,
        &submission.additional_activities,
    )
    .await?;
    tx.commit().await?;

    info!(
        activity_id = activity.id,
        %today,
        status = %labels.status,
        worked_minutes = (now - checkin).num_minutes(),
        "Checked out"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Checked out successfully!",
        "time": local_clock(&policy, now),
        "location": submission.location,
        "additional_activities_count": submission.additional_activities.len(),
    })))
}

/// Today's record for the caller
#[utoipa::path(
    get,
    path = "/api/activity/status",
    responses(
        (status = 200, description = "Today's check-in state", body = Object, example = json!({
            "checked_in": true,
            "checked_out": false,
            "checkin_time": "2026-03-02T01:57:00Z",
            "checkout_time": null,
            "status": "pending",
            "attendance_status": "on_time",
            "planned_activities": [],
            "daily_goals": [],
            "morning_problems": ""
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<AttendancePolicy>,
) -> Result<HttpResponse, ApiError> {
    let today = policy.today(Utc::now());
    let Some(activity) = daily_activity::find_by_user_date(pool.get_ref(), auth.user_id, today).await?
    else {
        return Ok(HttpResponse::Ok().json(json!({
            "checked_in": false,
            "checked_out": false,
            "checkin_time": null,
            "checkout_time": null,
        })));
    };

    let mut body = json!({
        "checked_in": activity.is_checked_in(),
        "checked_out": activity.is_checked_out(),
        "checkin_time": activity.checkin_time.map(|t| t.to_rfc3339()),
        "checkout_time": activity.checkout_time.map(|t| t.to_rfc3339()),
        "status": activity.status,
        "attendance_status": activity.attendance_status,
    });

    if activity.is_checked_in() {
        let mut conn = pool.acquire().await?;
        let planned = daily_activity::planned_activities(&mut conn, activity.id).await?;
        let goals = daily_activity::daily_goals(&mut conn, activity.id).await?;
        body["planned_activities"] = json!(planned);
        body["daily_goals"] = json!(goals);
        body["partially_completed_goals"] =
            json!(goals.iter().filter(|g| g.is_partially_completed()).count());
        body["morning_problems"] = json!(activity.morning_problems);

        if activity.is_checked_out() {
            let additional = daily_activity::additional_activities(&mut conn, activity.id).await?;
            body["additional_activities"] = json!(additional);
            body["afternoon_problems"] = json!(activity.afternoon_problems);
        }
    }

    Ok(HttpResponse::Ok().json(body))
}

/// The caller's most recent days, newest first
#[utoipa::path(
    get,
    path = "/api/activity/history",
    responses(
        (status = 200, description = "Recent activity records", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn history(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let activities =
        daily_activity::recent_for_user(pool.get_ref(), auth.user_id, HISTORY_LIMIT).await?;

    let data: Vec<_> = activities.iter().map(history_entry).collect();
    let completed = activities.iter().filter(|a| a.is_complete()).count();

    Ok(HttpResponse::Ok().json(json!({
        "count": data.len(),
        "completed": completed,
        "data": data,
    })))
}

fn history_entry(activity: &DailyActivity) -> Value {
    json!({
        "activity": activity,
        "is_complete": activity.is_complete(),
        "work_duration_minutes": activity.work_duration().map(|d| d.num_minutes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::daily_activity::{ActivityStatus, AttendanceStatus};
    use chrono::TimeZone;

    fn day(status: ActivityStatus) -> DailyActivity {
        let at = |h| Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap();
        DailyActivity {
            id: 9,
            user_id: 7,
            date: chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            status,
            attendance_status: Some(AttendanceStatus::OnTime),
            checkin_time: Some(at(1)),
            checkout_time: Some(at(10)),
            checkin_location: None,
            checkout_location: None,
            morning_problems: String::new(),
            afternoon_problems: String::new(),
            notes: String::new(),
            created_at: at(1),
            updated_at: at(10),
        }
    }

    #[test]
    fn history_entry_reports_completion_and_duration() {
        let entry = history_entry(&day(ActivityStatus::Completed));
        assert_eq!(entry["is_complete"], true);
        assert_eq!(entry["work_duration_minutes"], 540);
        assert_eq!(entry["activity"]["status"], "completed");

        let entry = history_entry(&day(ActivityStatus::EarlyCheckout));
        assert_eq!(entry["is_complete"], false);
    }
}
