use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::attendance::classifier::{AttendanceClassifier, DayOutcome, Unclassified};
use crate::error::AttendanceError;
use crate::model::daily_activity::{ActivityStatus, AttendanceStatus, DailyActivity};
use crate::model::employee::WorkHoursProfile;

/// Labels written when a check-out is stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutLabels {
    pub status: ActivityStatus,
    pub attendance_status: Option<AttendanceStatus>,
}

/// Write-time attendance rules.
///
/// Users without a work-hours profile are judged against the default
/// hours here. The reconciliation sweep does not share this fallback.
#[derive(Debug, Clone, Copy)]
pub struct AttendancePolicy {
    classifier: AttendanceClassifier,
    default_start: NaiveTime,
    default_end: NaiveTime,
}

impl AttendancePolicy {
    pub fn new(classifier: AttendanceClassifier, default_start: NaiveTime, default_end: NaiveTime) -> Self {
        Self {
            classifier,
            default_start,
            default_end,
        }
    }

    pub fn classifier(&self) -> &AttendanceClassifier {
        &self.classifier
    }

    /// Today's date in the organisation's timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.classifier.local_date(now)
    }

    /// The user's hours with each missing bound filled from the defaults.
    pub fn work_hours(&self, profile: Option<&WorkHoursProfile>) -> WorkHoursProfile {
        WorkHoursProfile::new(
            profile
                .and_then(WorkHoursProfile::effective_work_start_time)
                .unwrap_or(self.default_start),
            profile
                .and_then(WorkHoursProfile::effective_work_end_time)
                .unwrap_or(self.default_end),
        )
    }

    pub fn ensure_can_check_in(&self, activity: &DailyActivity) -> Result<(), AttendanceError> {
        if activity.is_checked_in() {
            return Err(AttendanceError::AlreadyCheckedIn);
        }
        Ok(())
    }

    /// Returns the check-in instant the check-out must follow.
    pub fn ensure_can_check_out(
        &self,
        activity: Option<&DailyActivity>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AttendanceError> {
        let activity = activity.ok_or(AttendanceError::NotCheckedIn)?;
        let checkin = activity.checkin_time.ok_or(AttendanceError::NotCheckedIn)?;
        if activity.is_checked_out() {
            return Err(AttendanceError::AlreadyCheckedOut);
        }
        if now <= checkin {
            return Err(AttendanceError::CheckoutBeforeCheckin);
        }
        Ok(checkin)
    }

    pub fn check_in_label(
        &self,
        date: NaiveDate,
        checkin: DateTime<Utc>,
        profile: Option<&WorkHoursProfile>,
    ) -> AttendanceStatus {
        let hours = self.work_hours(profile);
        match self.classifier.classify(date, Some(checkin), None, Some(&hours)) {
            Ok(outcome) => outcome.attendance_status,
            // filled-in hours always have a start and the check-in is given
            Err(Unclassified::NoCheckIn | Unclassified::NoWorkHours) => AttendanceStatus::OnTime,
        }
    }

    /// An early check-out overwrites the punctuality label; otherwise the
    /// day is completed and the label from check-in stands.
    pub fn check_out_labels(
        &self,
        date: NaiveDate,
        checkin: DateTime<Utc>,
        checkout: DateTime<Utc>,
        current: Option<AttendanceStatus>,
        profile: Option<&WorkHoursProfile>,
    ) -> CheckOutLabels {
        let hours = self.work_hours(profile);
        match self
            .classifier
            .classify(date, Some(checkin), Some(checkout), Some(&hours))
        {
            Ok(DayOutcome {
                status: ActivityStatus::EarlyCheckout,
                attendance_status,
            }) => CheckOutLabels {
                status: ActivityStatus::EarlyCheckout,
                attendance_status: Some(attendance_status),
            },
            Ok(_) | Err(Unclassified::NoCheckIn | Unclassified::NoWorkHours) => CheckOutLabels {
                status: ActivityStatus::Completed,
                attendance_status: current,
            },
        }
    }
}
