use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::model::daily_activity::{ActivityStatus, AttendanceStatus};
use crate::model::employee::WorkHoursProfile;

/// Why a day could not be labelled against work hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unclassified {
    /// Nothing to compare: the user never checked in.
    NoCheckIn,
    /// The user has no profile, or the profile has no start time.
    NoWorkHours,
}

/// Labels for one day, as they would be written at check-out time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOutcome {
    pub attendance_status: AttendanceStatus,
    pub status: ActivityStatus,
}

/// Pure punctuality rules evaluated in the organisation's timezone.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceClassifier {
    tz: Tz,
    grace_period: Duration,
}

impl AttendanceClassifier {
    pub fn new(tz: Tz, grace_period: Duration) -> Self {
        Self { tz, grace_period }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Calendar date of `instant` in the organisation's timezone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// `date` at wall-clock `time` in the organisation's timezone.
    ///
    /// A wall-clock time skipped by a DST jump has no instant; it is pushed
    /// forward an hour. Ambiguous times take the earlier instant.
    pub fn expected_at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
        let naive = date.and_time(time);
        match self.tz.from_local_datetime(&naive).earliest() {
            Some(dt) => dt,
            None => self
                .tz
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| self.tz.from_utc_datetime(&naive)),
        }
    }

    /// Late means strictly after the expected start; arriving exactly on time is fine.
    pub fn is_late(&self, date: NaiveDate, checkin: DateTime<Utc>, work_start: NaiveTime) -> bool {
        checkin.with_timezone(&self.tz) > self.expected_at(date, work_start)
    }

    /// Early means before `work_end - grace_period`.
    pub fn is_early_checkout(
        &self,
        date: NaiveDate,
        checkout: DateTime<Utc>,
        work_end: NaiveTime,
    ) -> bool {
        checkout.with_timezone(&self.tz) < self.expected_at(date, work_end) - self.grace_period
    }

    pub fn punctuality(
        &self,
        date: NaiveDate,
        checkin: DateTime<Utc>,
        work_start: NaiveTime,
    ) -> AttendanceStatus {
        if self.is_late(date, checkin, work_start) {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::OnTime
        }
    }

    /// Labels a day from its timestamps and the user's work hours.
    ///
    /// With only a check-in the day stays `pending`. The check-out rule needs
    /// an end time; without one a checked-out day is simply `completed`.
    pub fn classify(
        &self,
        date: NaiveDate,
        checkin: Option<DateTime<Utc>>,
        checkout: Option<DateTime<Utc>>,
        profile: Option<&WorkHoursProfile>,
    ) -> Result<DayOutcome, Unclassified> {
        let checkin = checkin.ok_or(Unclassified::NoCheckIn)?;
        let profile = profile.ok_or(Unclassified::NoWorkHours)?;
        let work_start = profile
            .effective_work_start_time()
            .ok_or(Unclassified::NoWorkHours)?;

        let punctuality = self.punctuality(date, checkin, work_start);

        let Some(checkout) = checkout else {
            return Ok(DayOutcome {
                attendance_status: punctuality,
                status: ActivityStatus::Pending,
            });
        };

        let early = profile
            .effective_work_end_time()
            .is_some_and(|end| self.is_early_checkout(date, checkout, end));

        Ok(if early {
            DayOutcome {
                attendance_status: AttendanceStatus::EarlyCheckout,
                status: ActivityStatus::EarlyCheckout,
            }
        } else {
            DayOutcome {
                attendance_status: punctuality,
                status: ActivityStatus::Completed,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Jakarta;

    fn classifier() -> AttendanceClassifier {
        AttendanceClassifier::new(Jakarta, Duration::minutes(5))
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Jakarta wall-clock on `day()` as a UTC instant (UTC+7, no DST).
    fn jkt(h: u32, m: u32) -> DateTime<Utc> {
        Jakarta
            .from_local_datetime(&day().and_time(t(h, m)))
            .unwrap()
            .with_timezone(&Utc)
    }

    fn nine_to_five() -> WorkHoursProfile {
        WorkHoursProfile::new(t(9, 0), t(17, 0))
    }

    #[test]
    fn checkin_after_start_is_late() {
        let c = classifier();
        assert!(c.is_late(day(), jkt(9, 1), t(9, 0)));
        assert_eq!(c.punctuality(day(), jkt(9, 1), t(9, 0)), AttendanceStatus::Late);
    }

    #[test]
    fn checkin_at_or_before_start_is_on_time() {
        let c = classifier();
        assert_eq!(c.punctuality(day(), jkt(8, 59), t(9, 0)), AttendanceStatus::OnTime);
        assert_eq!(c.punctuality(day(), jkt(9, 0), t(9, 0)), AttendanceStatus::OnTime);
    }

    #[test]
    fn checkout_inside_grace_is_not_early() {
        let c = classifier();
        assert!(c.is_early_checkout(day(), jkt(16, 50), t(17, 0)));
        assert!(!c.is_early_checkout(day(), jkt(16, 55), t(17, 0)));
        assert!(!c.is_early_checkout(day(), jkt(16, 56), t(17, 0)));
    }

    #[test]
    fn utc_timestamps_are_compared_in_local_time() {
        // 02:01 UTC is 09:01 in Jakarta
        let checkin = Utc.with_ymd_and_hms(2026, 3, 2, 2, 1, 0).unwrap();
        assert!(classifier().is_late(day(), checkin, t(9, 0)));
        assert_eq!(classifier().local_date(checkin), day());
    }

    #[test]
    fn early_checkout_overrides_punctuality() {
        let outcome = classifier()
            .classify(day(), Some(jkt(8, 30)), Some(jkt(16, 50)), Some(&nine_to_five()))
            .unwrap();
        assert_eq!(outcome.attendance_status, AttendanceStatus::EarlyCheckout);
        assert_eq!(outcome.status, ActivityStatus::EarlyCheckout);
    }

    #[test]
    fn full_day_completes_with_punctuality_label() {
        let outcome = classifier()
            .classify(day(), Some(jkt(9, 20)), Some(jkt(16, 56)), Some(&nine_to_five()))
            .unwrap();
        assert_eq!(outcome.attendance_status, AttendanceStatus::Late);
        assert_eq!(outcome.status, ActivityStatus::Completed);
    }

    #[test]
    fn checkin_only_stays_pending() {
        let outcome = classifier()
            .classify(day(), Some(jkt(8, 0)), None, Some(&nine_to_five()))
            .unwrap();
        assert_eq!(outcome.attendance_status, AttendanceStatus::OnTime);
        assert_eq!(outcome.status, ActivityStatus::Pending);
    }

    #[test]
    fn missing_inputs_are_distinguishable_from_on_time() {
        let c = classifier();
        assert_eq!(
            c.classify(day(), Some(jkt(8, 0)), None, None),
            Err(Unclassified::NoWorkHours)
        );
        assert_eq!(
            c.classify(day(), None, None, Some(&nine_to_five())),
            Err(Unclassified::NoCheckIn)
        );
        let no_start = WorkHoursProfile {
            work_start_time: None,
            work_end_time: Some(t(17, 0)),
        };
        assert_eq!(
            c.classify(day(), Some(jkt(8, 0)), None, Some(&no_start)),
            Err(Unclassified::NoWorkHours)
        );
    }

    #[test]
    fn no_end_time_skips_the_early_rule() {
        let no_end = WorkHoursProfile {
            work_start_time: Some(t(9, 0)),
            work_end_time: None,
        };
        let outcome = classifier()
            .classify(day(), Some(jkt(8, 0)), Some(jkt(12, 0)), Some(&no_end))
            .unwrap();
        assert_eq!(outcome.status, ActivityStatus::Completed);
        assert_eq!(outcome.attendance_status, AttendanceStatus::OnTime);
    }

    #[test]
    fn dst_gap_start_time_still_resolves() {
        let c = AttendanceClassifier::new(chrono_tz::Europe::Berlin, Duration::minutes(5));
        // 02:30 does not exist on 2026-03-29 in Berlin
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let expected = c.expected_at(date, t(2, 30));
        assert_eq!(expected.naive_local(), date.and_time(t(3, 30)));
    }
}
