use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use nj_retention::next_local_midnight_in;
use proptest::prelude::*;

// 1970-01-01 .. 2100-01-01
const MAX_SECS: i64 = 4_102_444_800;

// Transitions at 01:00 or later, so every local day is 23..=25 hours long.
const REGULAR_ZONES: &[Tz] = &[
    chrono_tz::America::New_York,
    chrono_tz::America::Los_Angeles,
    chrono_tz::Europe::London,
    chrono_tz::Asia::Kolkata,
    chrono_tz::Australia::Sydney,
    chrono_tz::Pacific::Auckland,
    chrono_tz::UTC,
];

// Transitions that skip or repeat midnight, skip a whole day, or use
// sub-minute offsets.
const IRREGULAR_ZONES: &[(Tz, i32)] = &[
    (chrono_tz::America::St_Johns, 2005),
    (chrono_tz::Antarctica::Casey, 2010),
    (chrono_tz::America::Sao_Paulo, 2018),
    (chrono_tz::America::Havana, 2023),
    (chrono_tz::America::Santiago, 2022),
    (chrono_tz::Pacific::Apia, 2011),
    (chrono_tz::Africa::Monrovia, 1971),
];

fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0..MAX_SECS).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn regular_zone() -> impl Strategy<Value = Tz> {
    prop::sample::select(REGULAR_ZONES)
}

fn any_zone() -> impl Strategy<Value = Tz> {
    prop::sample::select(&chrono_tz::TZ_VARIANTS[..])
}

/// The result is the first instant of a local day after `now`'s local day:
/// one second earlier still falls on `now`'s local day.
fn check_next_day_boundary(now: DateTime<Utc>, tz: Tz) -> Result<(), String> {
    let expires = next_local_midnight_in(now, tz).map_err(|e| e.to_string())?;
    let today = now.with_timezone(&tz).date_naive();
    let before = (expires - Duration::seconds(1)).with_timezone(&tz).date_naive();
    let after = expires.with_timezone(&tz).date_naive();

    if expires <= now {
        return Err(format!("{tz}: {expires} is not after {now}"));
    }
    if before != today || after <= today {
        return Err(format!(
            "{tz}: {expires} does not start the day after {today} (now {now})"
        ));
    }
    Ok(())
}

proptest! {
    #[test]
    fn result_is_strictly_later(now in instant(), tz in any_zone()) {
        let expires = next_local_midnight_in(now, tz).unwrap();
        prop_assert!(expires > now);
    }

    #[test]
    fn result_is_at_most_a_long_day_away(now in instant(), tz in regular_zone()) {
        let expires = next_local_midnight_in(now, tz).unwrap();
        prop_assert!(expires - now <= Duration::hours(25));
    }

    #[test]
    fn result_is_deterministic(now in instant(), tz in any_zone()) {
        prop_assert_eq!(
            next_local_midnight_in(now, tz).unwrap(),
            next_local_midnight_in(now, tz).unwrap()
        );
    }

    #[test]
    fn result_starts_the_next_local_day(now in instant(), tz in any_zone()) {
        if let Err(msg) = check_next_day_boundary(now, tz) {
            prop_assert!(false, "{}", msg);
        }
    }

    #[test]
    fn regular_zones_land_on_midnight(now in instant(), tz in regular_zone()) {
        let expires = next_local_midnight_in(now, tz).unwrap().with_timezone(&tz);
        let today = now.with_timezone(&tz).date_naive();
        prop_assert_eq!(expires.time(), chrono::NaiveTime::MIN);
        prop_assert_eq!(Some(expires.date_naive()), today.succ_opt());
    }

    #[test]
    fn instants_on_same_local_day_share_expiration(now in instant(), minutes in 0i64..1440) {
        let tz = chrono_tz::America::New_York;
        let expires = next_local_midnight_in(now, tz).unwrap();
        let later = now + Duration::minutes(minutes);
        if later < expires {
            prop_assert_eq!(next_local_midnight_in(later, tz).unwrap(), expires);
        } else {
            prop_assert!(next_local_midnight_in(later, tz).unwrap() > expires);
        }
    }
}

#[test]
fn irregular_zones_sweep_full_year() {
    for &(tz, year) in IRREGULAR_ZONES {
        let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).unwrap();
        let mut now = start;
        while now < end {
            if let Err(msg) = check_next_day_boundary(now, tz) {
                panic!("{msg}");
            }
            now += Duration::minutes(15);
        }
    }
}
