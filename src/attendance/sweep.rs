use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::attendance::classifier::{AttendanceClassifier, Unclassified};
use crate::model::daily_activity::{ActivityStatus, AttendanceStatus};
use crate::model::employee::WorkHoursProfile;
use crate::repository::activity_store::{ActivityStore, SaveOutcome, StoreError};

/// What the sweep reads for one activity, and writes back when it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRecord {
    pub activity_id: u64,
    /// Human-readable owner for the audit trail.
    pub owner: String,
    pub date: NaiveDate,
    pub status: ActivityStatus,
    pub attendance_status: Option<AttendanceStatus>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub checkout_time: Option<DateTime<Utc>>,
    /// Row version as read; the save only lands if it is still current.
    pub updated_at: DateTime<Utc>,
    pub profile: Option<WorkHoursProfile>,
}

/// Changes `reconcile_record` made to one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFix {
    pub changed: bool,
    pub late_fixed: bool,
    pub early_fixed: bool,
}

/// One persisted correction.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(
    fmt = "Updated {} on {}: status={}, attendance_status={}",
    owner,
    date,
    status,
    attendance_status
)]
pub struct Correction {
    pub activity_id: u64,
    pub owner: String,
    pub date: NaiveDate,
    pub status: ActivityStatus,
    pub attendance_status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub examined: usize,
    pub updated: usize,
    pub late_fixed: usize,
    pub early_fixed: usize,
    /// Rows modified by someone else between read and write.
    pub conflicts: usize,
    pub failed: usize,
    pub corrections: Vec<Correction>,
}

impl SweepReport {
    pub fn summary(&self) -> String {
        format!(
            "Done. {} late check-ins fixed, {} early check-outs fixed.",
            self.late_fixed, self.early_fixed
        )
    }
}

/// Brings one record's labels in line with the classifier.
///
/// Rules that need work hours are skipped when the profile or the relevant
/// bound is missing. A record without any label ends up `absent`.
pub fn reconcile_record(classifier: &AttendanceClassifier, record: &mut SweepRecord) -> RecordFix {
    let mut fix = RecordFix::default();
    let date = record.date;
    let work_end = record.profile.and_then(|p| p.effective_work_end_time());

    // punctuality only; the checkout rule below runs on its own bound
    let punctuality =
        match classifier.classify(date, record.checkin_time, None, record.profile.as_ref()) {
            Ok(outcome) => Some(outcome.attendance_status),
            Err(Unclassified::NoCheckIn | Unclassified::NoWorkHours) => None,
        };

    let mut attendance = match record.attendance_status {
        Some(stored) => stored,
        None => {
            fix.changed = true;
            punctuality.unwrap_or(AttendanceStatus::Absent)
        }
    };

    if punctuality == Some(AttendanceStatus::Late) && attendance == AttendanceStatus::OnTime {
        attendance = AttendanceStatus::Late;
        fix.changed = true;
        fix.late_fixed = true;
    }

    if let (Some(checkout), Some(end)) = (record.checkout_time, work_end) {
        let early = classifier.is_early_checkout(date, checkout, end);
        debug!(
            activity_id = record.activity_id,
            checkout = %checkout.with_timezone(&classifier.timezone()),
            expected_end = %classifier.expected_at(date, end),
            early,
            "Checked checkout time"
        );

        if early {
            if attendance != AttendanceStatus::EarlyCheckout {
                attendance = AttendanceStatus::EarlyCheckout;
                record.status = ActivityStatus::EarlyCheckout;
                fix.changed = true;
                fix.early_fixed = true;
            }
        } else if attendance == AttendanceStatus::EarlyCheckout {
            attendance = punctuality.unwrap_or(AttendanceStatus::OnTime);
            record.status = ActivityStatus::Completed;
            fix.changed = true;
        }
    }

    record.attendance_status = Some(attendance);
    fix
}

/// Re-derives labels for every stored activity and saves the ones that changed.
///
/// Each record stands alone: a failed or conflicting save is logged and
/// counted, and the sweep moves on. Only a failure to list the records
/// aborts the run.
#[instrument(name = "reconcile_attendance", skip_all, fields(run_id = %Uuid::new_v4()))]
pub async fn run_sweep<S>(
    store: &S,
    classifier: &AttendanceClassifier,
) -> Result<SweepReport, StoreError>
where
    S: ActivityStore + ?Sized,
{
    let records = store.list_all().await?;
    info!(records = records.len(), "Reconciliation started");

    let mut report = SweepReport::default();

    for mut record in records {
        report.examined += 1;
        let fix = reconcile_record(classifier, &mut record);
        if !fix.changed {
            continue;
        }

        match store.save(&record).await {
            Ok(SaveOutcome::Saved) => {
                let correction = Correction {
                    activity_id: record.activity_id,
                    owner: record.owner.clone(),
                    date: record.date,
                    status: record.status,
                    attendance_status: record
                        .attendance_status
                        .unwrap_or(AttendanceStatus::Absent),
                };
                info!(activity_id = record.activity_id, "{}", correction);

                report.updated += 1;
                report.late_fixed += usize::from(fix.late_fixed);
                report.early_fixed += usize::from(fix.early_fixed);
                report.corrections.push(correction);
            }
            Ok(SaveOutcome::Conflict) => {
                warn!(
                    activity_id = record.activity_id,
                    "Activity changed while reconciling, left untouched"
                );
                report.conflicts += 1;
            }
            Err(e) => {
                error!(error = %e, activity_id = record.activity_id, "Failed to save activity");
                report.failed += 1;
            }
        }
    }

    info!(
        examined = report.examined,
        updated = report.updated,
        late_fixed = report.late_fixed,
        early_fixed = report.early_fixed,
        conflicts = report.conflicts,
        failed = report.failed,
        "{}",
        report.summary()
    );

    Ok(report)
}
