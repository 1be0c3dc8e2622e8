use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Client company; only the columns attendance needs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Company {
    pub id: u64,
    pub name: String,
    pub code: String,
    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub work_start_time: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = Option<String>)]
    pub work_end_time: Option<NaiveTime>,
    pub is_active: bool,
}

/// Work-hour columns of an employee row joined to its company.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct WorkHoursRow {
    pub employee_start: Option<NaiveTime>,
    pub employee_end: Option<NaiveTime>,
    pub company_start: Option<NaiveTime>,
    pub company_end: Option<NaiveTime>,
}

/// Effective work hours of a user with an employee profile.
///
/// Users without an employee row have no profile at all; callers carry that
/// as `Option<WorkHoursProfile>`. Each bound may still be unresolvable when
/// neither the employee nor the company sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkHoursProfile {
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
}

impl WorkHoursProfile {
    pub fn new(work_start_time: NaiveTime, work_end_time: NaiveTime) -> Self {
        Self {
            work_start_time: Some(work_start_time),
            work_end_time: Some(work_end_time),
        }
    }

    /// Employee overrides win over company defaults.
    pub fn resolve(row: WorkHoursRow) -> Self {
        Self {
            work_start_time: row.employee_start.or(row.company_start),
            work_end_time: row.employee_end.or(row.company_end),
        }
    }

    pub fn effective_work_start_time(&self) -> Option<NaiveTime> {
        self.work_start_time
    }

    pub fn effective_work_end_time(&self) -> Option<NaiveTime> {
        self.work_end_time
    }
}
