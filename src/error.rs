use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Rule violations on a check-in or check-out submission.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[display(fmt = "Location is required. Please allow location access.")]
    MissingLocation,
    #[display(fmt = "Please add at least one planned activity for today")]
    NoPlannedActivities,
    #[display(fmt = "Please set at least one goal for today")]
    NoDailyGoals,
    #[display(fmt = "You have already checked in today")]
    AlreadyCheckedIn,
    #[display(fmt = "Please check in first")]
    NotCheckedIn,
    #[display(fmt = "You have already checked out today")]
    AlreadyCheckedOut,
    #[display(fmt = "Please update status for all planned activities")]
    ActivityUpdatesMissing,
    #[display(fmt = "Please update status for all daily goals")]
    GoalUpdatesMissing,
    #[display(fmt = "Please provide a reason for activity: {}", _0)]
    ActivityReasonMissing(String),
    #[display(fmt = "Please provide a reason for goal: {}", _0)]
    GoalReasonMissing(String),
    #[display(fmt = "Check-out time must be after check-in time")]
    CheckoutBeforeCheckin,
}

impl std::error::Error for AttendanceError {}

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Rejected(AttendanceError),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

impl From<AttendanceError> for ApiError {
    fn from(e: AttendanceError) -> Self {
        ApiError::Rejected(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        ApiError::Internal
    }
}
