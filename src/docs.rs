use crate::api::dashboard::AdminDashboardQuery;
use crate::attendance::submission::{CheckInForm, CheckOutForm};
use crate::model::additional_activity::{
    AdditionalActivity, AdditionalActivityCategory, AdditionalActivityStatus,
};
use crate::model::daily_activity::{ActivityStatus, AttendanceStatus, DailyActivity};
use crate::model::daily_goal::{DailyGoal, GoalStatus};
use crate::model::employee::Company;
use crate::model::planned_activity::{PlannedActivity, PlannedActivityStatus};
use crate::repository::dashboard::{AttendanceCounts, DateRange};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Daily Activity Tracker API",
        version = "1.0.0",
        description = r#"
## Daily Activity Tracker

Employees check in each morning with a plan for the day and check out in the
evening with the outcome of every planned activity and goal.

### Attendance labels
- `on_time` / `late`: check-in against the expected start of the working day
- `early_checkout`: check-out before the expected end, minus the grace period
- `absent`: assigned by the nightly reconciliation job

### Security
All endpoints require a **JWT Bearer** access token. The admin dashboard is
restricted to the **Admin** and **HR** roles.
"#,
    ),
    paths(
        crate::api::activity::check_in,
        crate::api::activity::check_out,
        crate::api::activity::status,
        crate::api::activity::history,

        crate::api::dashboard::personal,
        crate::api::dashboard::admin
    ),
    components(
        schemas(
            CheckInForm,
            CheckOutForm,
            DailyActivity,
            ActivityStatus,
            AttendanceStatus,
            PlannedActivity,
            PlannedActivityStatus,
            DailyGoal,
            GoalStatus,
            AdditionalActivity,
            AdditionalActivityCategory,
            AdditionalActivityStatus,
            Company,
            AttendanceCounts,
            DateRange,
            AdminDashboardQuery
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Activity", description = "Check-in, check-out and activity history"),
        (name = "Dashboard", description = "Personal and organisation attendance summaries"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
