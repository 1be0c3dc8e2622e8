use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::attendance::transition::AttendancePolicy;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::user::User;
use crate::repository::daily_activity;
use crate::repository::dashboard::{self, DateRange, week_start};

const RECENT_LIMIT: u32 = 7;

fn user_summary(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.full_name(),
        "email": user.email,
    })
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AdminDashboardQuery {
    /// Restrict to one company's employees
    pub company: Option<u64>,
    #[serde(default)]
    #[param(inline)]
    pub date_range: DateRange,
}

/// Personal summary for the current week
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Personal dashboard", body = Object, example = json!({
            "week_start": "2026-03-02",
            "completed_days": 3,
            "on_time_days": 2,
            "late_days": 1,
            "recent_count": 5,
            "recent": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn personal(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<AttendancePolicy>,
) -> Result<HttpResponse, ApiError> {
    let today = policy.today(Utc::now());
    let since = week_start(today);

    let week = dashboard::user_counts_since(pool.get_ref(), auth.user_id, since).await?;
    let recent =
        daily_activity::recent_for_user(pool.get_ref(), auth.user_id, RECENT_LIMIT).await?;

    Ok(HttpResponse::Ok().json(json!({
        "week_start": since,
        "completed_days": week.completed,
        "on_time_days": week.on_time,
        "late_days": week.late,
        "recent_count": recent.len(),
        "recent": recent,
    })))
}

/// Organisation-wide attendance for HR and admins
#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    params(AdminDashboardQuery),
    responses(
        (status = 200, description = "Admin dashboard", body = Object, example = json!({
            "today": {
                "date": "2026-03-05",
                "expected": 40,
                "checked_in": 35,
                "checked_out": 12,
                "on_time": 30,
                "late": 5,
                "absent": 5
            },
            "range": {
                "date_range": "week",
                "from": "2026-03-02",
                "to": "2026-03-05",
                "total": 140,
                "completed": 120,
                "on_time": 118,
                "late": 17,
                "absent": 5
            },
            "late_users": [],
            "absent_users": [],
            "companies": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR/Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn admin(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<AttendancePolicy>,
    query: web::Query<AdminDashboardQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let AdminDashboardQuery { company, date_range } = query.into_inner();
    let pool = pool.get_ref();
    let today = policy.today(Utc::now());
    let from = date_range.start(today);

    let expected = match company {
        Some(_) => dashboard::active_employee_count(pool, company).await,
        None => dashboard::active_user_count(pool).await,
    }?;
    let today_counts = dashboard::counts_between(pool, company, Some(today), today).await?;
    let range_counts = dashboard::counts_between(pool, company, from, today).await?;
    let late_users = dashboard::late_users_on(pool, today, company).await?;
    let absent_users = dashboard::absent_users_on(pool, today, company).await?;
    let companies = dashboard::active_companies(pool).await?;

    tracing::debug!(user_id = auth.user_id, ?company, ?date_range, "Admin dashboard");

    Ok(HttpResponse::Ok().json(json!({
        "today": {
            "date": today,
            "expected": expected,
            "checked_in": today_counts.checked_in,
            "checked_out": today_counts.checked_out,
            "on_time": today_counts.on_time,
            "late": today_counts.late,
            "absent": (expected - today_counts.checked_in).max(0),
        },
        "range": {
            "date_range": date_range,
            "from": from,
            "to": today,
            "total": range_counts.total,
            "completed": range_counts.completed,
            "on_time": range_counts.on_time,
            "late": range_counts.late,
            "absent": range_counts.absent,
        },
        "late_users": late_users.iter().map(user_summary).collect::<Vec<_>>(),
        "absent_users": absent_users.iter().map(user_summary).collect::<Vec<_>>(),
        "companies": companies,
    })))
}
