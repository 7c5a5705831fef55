use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

use super::{classify::ClassifiedResponse, cooldown::BlockedUntil};

pub const DEFAULT_TRANSIENT_COOLDOWN: std::time::Duration = std::time::Duration::from_secs(60);
pub const DEFAULT_UNKNOWN_COOLDOWN: std::time::Duration = std::time::Duration::from_secs(600);

/// Turns a classified failure into the next `BlockedUntil`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    /// 429 / 500.
    pub transient: std::time::Duration,
    /// Unrecognized status or in-body code.
    pub unknown: std::time::Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self { transient: DEFAULT_TRANSIENT_COOLDOWN, unknown: DEFAULT_UNKNOWN_COOLDOWN }
    }
}

impl CooldownPolicy {
    /// `None` for outcomes that leave the gate untouched (success and empty bodies).
    pub fn blocked_until(&self, classified: &ClassifiedResponse, now: DateTime<Utc>) -> Option<BlockedUntil> {
        match classified {
            ClassifiedResponse::Success(_) | ClassifiedResponse::Empty => None,
            ClassifiedResponse::ClientError { .. } => Some(BlockedUntil::Forever),
            ClassifiedResponse::TransientError { .. } => Some(after(now, self.transient)),
            ClassifiedResponse::QuotaExhausted => Some(BlockedUntil::Until(next_local_midnight(now))),
            ClassifiedResponse::Unknown { .. } => Some(after(now, self.unknown)),
        }
    }
}

fn after(now: DateTime<Utc>, wait: std::time::Duration) -> BlockedUntil {
    Duration::from_std(wait)
        .ok()
        .and_then(|wait| now.checked_add_signed(wait))
        .map_or(BlockedUntil::Forever, BlockedUntil::Until)
}

/// The provider resets daily quotas at local midnight.
pub fn next_local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    next_midnight(&now.with_timezone(&Local)).with_timezone(&Utc)
}

/// First instant of the day after `now`, in `now`'s time zone.
///
/// Where a DST shift skips midnight, the first valid instant of that hour is used.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return now.clone() + Duration::days(1);
    };
    let midnight = tomorrow.and_time(NaiveTime::MIN);
    let tz = now.timezone();

    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .unwrap_or_else(|| now.clone() + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::classify::ProviderCode;
    use chrono::{FixedOffset, Timelike};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn client_errors_block_forever() {
        let policy = CooldownPolicy::default();
        let classified = ClassifiedResponse::ClientError { code: ProviderCode::NotFound, detail: None };
        assert_eq!(policy.blocked_until(&classified, t0()), Some(BlockedUntil::Forever));
    }

    #[test]
    fn transient_errors_block_for_a_minute() {
        let policy = CooldownPolicy::default();
        let classified = ClassifiedResponse::TransientError { code: ProviderCode::TooManyRequests };
        assert_eq!(
            policy.blocked_until(&classified, t0()),
            Some(BlockedUntil::Until(t0() + Duration::seconds(60)))
        );
    }

    #[test]
    fn unknown_errors_block_for_ten_minutes() {
        let policy = CooldownPolicy::default();
        let classified = ClassifiedResponse::Unknown { code: "418".into() };
        assert_eq!(
            policy.blocked_until(&classified, t0()),
            Some(BlockedUntil::Until(t0() + Duration::seconds(600)))
        );
    }

    #[test]
    fn custom_durations_are_honoured() {
        let policy = CooldownPolicy {
            transient: std::time::Duration::from_secs(5),
            unknown: std::time::Duration::from_secs(7),
        };
        let transient = ClassifiedResponse::TransientError { code: ProviderCode::ServerError };
        assert_eq!(
            policy.blocked_until(&transient, t0()),
            Some(BlockedUntil::Until(t0() + Duration::seconds(5)))
        );
    }

    #[test]
    fn success_and_empty_leave_gate_alone() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.blocked_until(&ClassifiedResponse::Empty, t0()), None);
        assert_eq!(
            policy.blocked_until(&ClassifiedResponse::Success(serde_json::json!({"code":"200"})), t0()),
            None
        );
    }

    #[test]
    fn quota_blocks_until_next_local_midnight() {
        let policy = CooldownPolicy::default();
        assert_eq!(
            policy.blocked_until(&ClassifiedResponse::QuotaExhausted, t0()),
            Some(BlockedUntil::Until(next_local_midnight(t0())))
        );

        let midnight = next_local_midnight(t0()).with_timezone(&Local);
        assert_eq!((midnight.hour(), midnight.minute(), midnight.second()), (0, 0, 0));
        assert!(midnight > t0());
        assert!(midnight.with_timezone(&Utc) - t0() <= Duration::hours(25));
    }

    #[test]
    fn next_midnight_in_fixed_offset() {
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = shanghai.with_ymd_and_hms(2024, 5, 1, 23, 59, 30).unwrap();
        assert_eq!(next_midnight(&now), shanghai.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());

        let just_after = shanghai.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert_eq!(
            next_midnight(&just_after),
            shanghai.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_midnight_crosses_month_and_year() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(next_midnight(&now), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }
}
