//! Next-local-midnight computation.
//!
//! Temporary chats expire at the start of the next local day in a fixed
//! timezone rather than after a rolling number of hours, so users can be
//! told exactly when their chat goes away. All functions here take the
//! "now" anchor explicitly; read it from a [`Clock`](crate::clock::Clock).
//!
//! # Functions
//!
//! - [`next_local_midnight`] — Next local midnight for an IANA timezone name
//! - [`next_local_midnight_in`] — Same, for an already-parsed [`Tz`]
//! - [`utc_offset_at_local_midnight`] — Offset in force at 00:00 of a civil date
//! - [`format_utc_offset`] — `±HH:MM` rendering of an offset
//! - [`parse_timezone`] — IANA name to [`Tz`]
//! - [`describe_next_local_midnight`] — Serializable report of the above
//! - [`new_jersey_midnight_expiration`] — The `America/New_York` entry point
//!
//! # DST
//!
//! The offset used is the one in force at the *target* midnight, not at
//! `now`. On the day a transition happens the two differ by an hour.
//! Where a fall-back repeats midnight, the result is the first occurrence
//! still ahead of `now`.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::error::RetentionError;

/// IANA name of the timezone New Jersey observes.
pub const NEW_JERSEY_TIMEZONE: &str = "America/New_York";

// ── next_local_midnight ─────────────────────────────────────────────────────

/// Compute the instant of the next local midnight in `timezone`.
///
/// The result is 00:00 on the civil day after `now`'s civil day, as observed
/// in `timezone`, so it is always strictly later than `now`.
///
/// # Errors
///
/// Returns [`RetentionError::InvalidTimezone`] if `timezone` is not a valid
/// IANA timezone name.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use nj_retention::midnight::next_local_midnight;
///
/// // Jan 1 2025, 02:00 EST
/// let now = Utc.with_ymd_and_hms(2025, 1, 1, 7, 0, 0).unwrap();
/// let expires = next_local_midnight(now, "America/New_York").unwrap();
/// assert_eq!(expires, Utc.with_ymd_and_hms(2025, 1, 2, 5, 0, 0).unwrap());
/// ```
pub fn next_local_midnight(
    now: DateTime<Utc>,
    timezone: &str,
) -> Result<DateTime<Utc>, RetentionError> {
    let tz = parse_timezone(timezone)?;
    next_local_midnight_in(now, tz)
}

/// Compute the next local midnight for an already-parsed timezone.
///
/// # Errors
///
/// Returns [`RetentionError::InvalidDatetime`] if the civil date after
/// `now` is outside the representable range.
pub fn next_local_midnight_in(
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<DateTime<Utc>, RetentionError> {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today.succ_opt().ok_or_else(|| {
        RetentionError::InvalidDatetime(format!("no calendar day after {today}"))
    })?;

    let midnight = tomorrow.and_time(NaiveTime::MIN);
    let offset = resolve_midnight_offset(tomorrow, tz, Some(now))?;
    let expires = offset
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            RetentionError::InvalidDatetime(format!("{midnight} under {offset} is out of range"))
        })?;

    debug!(%now, timezone = %tz, %expires, "computed next local midnight");
    Ok(expires)
}

/// The UTC offset in force at 00:00 local time on `date` in `tz`.
///
/// If midnight is repeated (a fall-back transition across midnight), the
/// offset of the first occurrence is returned. If midnight is skipped (a
/// spring-forward transition at midnight), the offset in force before the
/// jump is returned; reading midnight under it yields the first instant of
/// the new day.
///
/// # Errors
///
/// Returns [`RetentionError::InvalidDatetime`] if `date` is at the edge of
/// the representable range and midnight cannot be resolved.
pub fn utc_offset_at_local_midnight(
    date: NaiveDate,
    tz: Tz,
) -> Result<FixedOffset, RetentionError> {
    resolve_midnight_offset(date, tz, None)
}

/// Offset for local midnight of `date`. With `after` set, a repeated
/// midnight resolves to the first occurrence strictly later than `after`.
fn resolve_midnight_offset(
    date: NaiveDate,
    tz: Tz,
    after: Option<DateTime<Utc>>,
) -> Result<FixedOffset, RetentionError> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.offset_from_local_datetime(&midnight) {
        LocalResult::Single(offset) => Ok(offset.fix()),
        LocalResult::Ambiguous(a, b) => {
            let (a, b) = (a.fix(), b.fix());
            // Larger offset reaches local midnight first.
            let (first, second) = if a.local_minus_utc() >= b.local_minus_utc() {
                (a, b)
            } else {
                (b, a)
            };
            let first_passed = after.is_some_and(|now| {
                first
                    .from_local_datetime(&midnight)
                    .single()
                    .is_some_and(|dt| dt <= now)
            });
            Ok(if first_passed { second } else { first })
        }
        LocalResult::None => {
            let before_gap = date
                .pred_opt()
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .and_then(|noon| tz.offset_from_local_datetime(&noon).earliest())
                .map(|offset| offset.fix())
                .or_else(|| after.map(|now| now.with_timezone(&tz).offset().fix()));
            before_gap.ok_or_else(|| {
                RetentionError::InvalidDatetime(format!(
                    "cannot resolve local midnight of {date} in {tz}"
                ))
            })
        }
    }
}

/// Format a UTC offset as `±HH:MM` (e.g., `"-05:00"`, `"+05:30"`, `"+00:00"`).
pub fn format_utc_offset(offset: FixedOffset) -> String {
    let offset_secs = offset.local_minus_utc();
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    format!("{sign}{hours:02}:{minutes:02}")
}

// ── describe_next_local_midnight ────────────────────────────────────────────

/// A next-local-midnight instant with the metadata shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalMidnight {
    /// The expiration instant in UTC (RFC 3339).
    pub expires_at_utc: String,
    /// The expiration instant in the target timezone (RFC 3339 with offset).
    pub expires_at_local: String,
    /// The IANA timezone name used.
    pub timezone: String,
    /// The UTC offset at the expiration instant (e.g., "-05:00").
    pub utc_offset: String,
    /// Whether Daylight Saving Time is active at the expiration instant.
    pub dst_active: bool,
}

/// Compute the next local midnight and describe it.
///
/// # Errors
///
/// Same as [`next_local_midnight`].
pub fn describe_next_local_midnight(
    now: DateTime<Utc>,
    timezone: &str,
) -> Result<LocalMidnight, RetentionError> {
    let tz = parse_timezone(timezone)?;
    let expires = next_local_midnight_in(now, tz)?;
    let local = expires.with_timezone(&tz);

    Ok(LocalMidnight {
        expires_at_utc: expires.to_rfc3339(),
        expires_at_local: local.to_rfc3339(),
        timezone: timezone.to_string(),
        utc_offset: format_utc_offset(local.offset().fix()),
        dst_active: is_dst_active(&local),
    })
}

/// Next local midnight in New Jersey, anchored on `clock`.
///
/// # Errors
///
/// Same as [`next_local_midnight_in`].
pub fn new_jersey_midnight_expiration(
    clock: &dyn Clock,
) -> Result<DateTime<Utc>, RetentionError> {
    next_local_midnight_in(clock.now(), chrono_tz::America::New_York)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Parse an IANA timezone name into `Tz`.
///
/// # Errors
///
/// Returns [`RetentionError::InvalidTimezone`] if the name is unknown.
pub fn parse_timezone(s: &str) -> Result<Tz, RetentionError> {
    s.parse::<Tz>()
        .map_err(|_| RetentionError::InvalidTimezone(format!("'{}'", s)))
}

fn is_dst_active(dt: &DateTime<Tz>) -> bool {
    dt.offset().dst_offset() != chrono::Duration::zero()
}

// ── Tests ───────────────────────────────────────────────────────────────────
