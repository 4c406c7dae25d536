//! Wall-clock/UTC conversion for IANA timezones.
//!
//! Scheduled times are stored in UTC; the user's zone is only used here,
//! at the edges. DST transitions are resolved deterministically:
//! - An ambiguous local time (clocks fell back, the time occurs twice)
//!   maps to the earlier UTC instant.
//! - A nonexistent local time (clocks sprang forward, the time was
//!   skipped) is rejected with [`SchedulerError::NonexistentLocalTime`] so
//!   the scheduling request fails loudly instead of silently shifting.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::SchedulerError;

fn parse_zone(tz_id: &str) -> Result<Tz, SchedulerError> {
    tz_id
        .parse::<Tz>()
        .map_err(|_| SchedulerError::UnknownTimezone(tz_id.to_string()))
}

/// Interpret `local` as wall-clock time in the given IANA zone and return
/// the equivalent UTC instant.
pub fn to_utc(local: NaiveDateTime, tz_id: &str) -> Result<DateTime<Utc>, SchedulerError> {
    let tz = parse_zone(tz_id)?;
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(SchedulerError::NonexistentLocalTime(
            local,
            tz_id.to_string(),
        )),
    }
}

/// Render a UTC instant as wall-clock time in the given zone. Display
/// only; publish decisions always compare UTC instants.
pub fn from_utc(instant: DateTime<Utc>, tz_id: &str) -> Result<NaiveDateTime, SchedulerError> {
    let tz = parse_zone(tz_id)?;
    Ok(instant.with_timezone(&tz).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_roundtrip_plain_time() {
        let t = local(2026, 6, 15, 14, 30);
        let utc = to_utc(t, "America/New_York").unwrap();
        assert_eq!(from_utc(utc, "America/New_York").unwrap(), t);
    }

    #[test]
    fn test_to_utc_applies_offset() {
        // Sao Paulo is UTC-3 year-round since 2019.
        let t = local(2026, 1, 5, 9, 0);
        let utc = to_utc(t, "America/Sao_Paulo").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_unknown_zone_rejected() {
        let t = local(2026, 6, 15, 14, 30);
        let err = to_utc(t, "Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownTimezone(_)));

        let err = from_utc(Utc::now(), "not-a-zone").unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownTimezone(_)));
    }

    #[test]
    fn test_ambiguous_time_maps_to_earlier_instant() {
        // US fall-back 2026: clocks repeat 01:00-02:00 on November 1.
        let t = local(2026, 11, 1, 1, 30);
        let utc = to_utc(t, "America/New_York").unwrap();
        // The earlier occurrence is still EDT (UTC-4).
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_nonexistent_time_rejected() {
        // US spring-forward 2026: 02:00-03:00 skipped on March 8.
        let t = local(2026, 3, 8, 2, 30);
        let err = to_utc(t, "America/New_York").unwrap_err();
        assert!(matches!(err, SchedulerError::NonexistentLocalTime(_, _)));
    }

    #[test]
    fn test_utc_zone_is_identity() {
        let t = local(2026, 2, 28, 23, 59);
        let utc = to_utc(t, "UTC").unwrap();
        assert_eq!(utc.naive_utc(), t);
        assert_eq!(from_utc(utc, "UTC").unwrap(), t);
    }

    proptest! {
        // Round-trip holds for all accepted inputs away from transition
        // hours (transitions in these zones happen between 00:00 and
        // 04:00 local).
        #[test]
        fn roundtrip_away_from_transitions(
            days in 0i64..3650,
            hour in 4u32..24,
            minute in 0u32..60,
            zone_idx in 0usize..5,
        ) {
            let zones = [
                "UTC",
                "America/New_York",
                "Europe/London",
                "Asia/Tokyo",
                "Australia/Sydney",
            ];
            let zone = zones[zone_idx];
            let t = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                .checked_add_days(chrono::Days::new(days as u64)).unwrap()
                .and_hms_opt(hour, minute, 0).unwrap();

            let utc = to_utc(t, zone).unwrap();
            prop_assert_eq!(from_utc(utc, zone).unwrap(), t);
        }

        // UTC -> local -> UTC always round-trips exactly, including across
        // transitions, because every UTC instant has one local rendering.
        #[test]
        fn utc_to_local_to_utc_is_exact(secs in 0i64..400_000_000, zone_idx in 0usize..5) {
            let zones = [
                "UTC",
                "America/New_York",
                "Europe/London",
                "Asia/Tokyo",
                "Australia/Sydney",
            ];
            let zone = zones[zone_idx];
            let instant = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::seconds(secs);

            let local = from_utc(instant, zone).unwrap();
            let back = to_utc(local, zone).unwrap();
            // An ambiguous local time resolves to the earlier instant,
            // which is at most one DST shift before the original.
            let drift = (instant - back).num_seconds();
            prop_assert!((0..=3600).contains(&drift));
        }
    }
}
