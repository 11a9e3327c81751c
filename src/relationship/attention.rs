//! Attention classifier.
//!
//! A contact needs attention when they have never been contacted, or when the
//! whole days elapsed since the last contact reach 80% of their cadence's
//! target. Pure and deterministic: callers supply `now`.

use chrono::{DateTime, Utc};

use super::types::Frequency;

const SECONDS_PER_DAY: i64 = 86_400;

/// Early-warning ratio, kept as a fraction so the comparison stays exact.
const WARN_NUMERATOR: i64 = 4;
const WARN_DENOMINATOR: i64 = 5;

/// Whole days from `last_contact_at` to `now`, rounded toward negative infinity.
pub fn days_since(last_contact_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_contact_at)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

/// Whether a contact with this history and cadence is due for a reconnect.
pub fn needs_attention(
    last_contact_at: Option<DateTime<Utc>>,
    frequency: Frequency,
    now: DateTime<Utc>,
) -> bool {
    let Some(last) = last_contact_at else {
        return true;
    };
    needs_attention_after(days_since(last, now), frequency.target_days())
}

/// `days >= 0.8 * target_days`, evaluated in integers.
pub fn needs_attention_after(days: i64, target_days: u32) -> bool {
    days * WARN_DENOMINATOR >= i64::from(target_days) * WARN_NUMERATOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_contacted_always_needs_attention() {
        for frequency in Frequency::ALL {
            assert!(needs_attention(None, frequency, now()));
        }
    }

    #[test]
    fn monthly_threshold_is_twenty_four_days() {
        let at_24 = now() - Duration::days(24);
        let at_23 = now() - Duration::days(23);
        assert!(needs_attention(Some(at_24), Frequency::Monthly, now()));
        assert!(!needs_attention(Some(at_23), Frequency::Monthly, now()));
    }

    #[test]
    fn partial_days_are_floored() {
        // 23 days and 23 hours is still 23 whole days.
        let last = now() - Duration::days(23) - Duration::hours(23);
        assert_eq!(days_since(last, now()), 23);
        assert!(!needs_attention(Some(last), Frequency::Monthly, now()));
    }

    #[test]
    fn weekly_threshold_rounds_up_to_six_days() {
        // 0.8 * 7 = 5.6, so five days is fine and six is not.
        assert!(!needs_attention_after(5, 7));
        assert!(needs_attention_after(6, 7));
    }

    #[test]
    fn daily_contact_needs_attention_after_one_day() {
        let yesterday = now() - Duration::days(1);
        let this_morning = now() - Duration::hours(3);
        assert!(needs_attention(Some(yesterday), Frequency::Daily, now()));
        assert!(!needs_attention(Some(this_morning), Frequency::Daily, now()));
    }

    #[test]
    fn future_contact_does_not_need_attention() {
        let tomorrow = now() + Duration::hours(30);
        assert_eq!(days_since(tomorrow, now()), -2);
        assert!(!needs_attention(Some(tomorrow), Frequency::Weekly, now()));
    }

    #[test]
    fn contacted_today_is_fine() {
        assert!(!needs_attention(Some(now()), Frequency::Weekly, now()));
        assert!(!needs_attention(Some(now()), Frequency::Yearly, now()));
    }
}
