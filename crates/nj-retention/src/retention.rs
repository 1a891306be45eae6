//! Temporary-chat retention policy.
//!
//! Upstream, a temporary chat expires a configurable number of hours after
//! it is created. The New Jersey deployment replaces that with the next
//! local midnight. Both modes are expressed by [`ExpirationPolicy`]; the
//! retention hours are still resolved (and reported) in either mode.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::RetentionError;
use crate::midnight::{self, NEW_JERSEY_TIMEZONE};
use crate::settings::{InterfaceConfig, RetentionSettings};

/// Default retention period: 30 days.
pub const DEFAULT_RETENTION_HOURS: i64 = 24 * 30;

/// Shortest retention period accepted.
pub const MIN_RETENTION_HOURS: i64 = 1;

/// Longest retention period accepted: one year.
pub const MAX_RETENTION_HOURS: i64 = 24 * 365;

/// Environment variable consulted by [`retention_hours`].
pub const RETENTION_HOURS_ENV: &str = "TEMP_CHAT_RETENTION_HOURS";

// ── Retention hours ─────────────────────────────────────────────────────────

/// Resolve the retention period in hours.
///
/// Precedence: interface config, then `env_value`, then
/// [`DEFAULT_RETENTION_HOURS`]. Values that are not numbers are ignored
/// with a warning. The result is clamped to
/// `[MIN_RETENTION_HOURS, MAX_RETENTION_HOURS]`.
pub fn resolve_retention_hours(
    interface: Option<&InterfaceConfig>,
    env_value: Option<&str>,
) -> i64 {
    let mut hours = DEFAULT_RETENTION_HOURS;

    if let Some(raw) = env_value {
        match raw.trim().parse::<i64>() {
            Ok(v) => hours = v,
            Err(_) => warn!(
                value = raw,
                default = DEFAULT_RETENTION_HOURS,
                "invalid {RETENTION_HOURS_ENV}, using default"
            ),
        }
    }

    if let Some(configured) = interface.and_then(|i| i.temporary_chat_retention.as_ref()) {
        match json_hours(configured) {
            Some(v) => hours = v,
            None => warn!(
                value = %configured,
                "invalid temporaryChatRetention, ignoring"
            ),
        }
    }

    if hours < MIN_RETENTION_HOURS {
        warn!(hours, min = MIN_RETENTION_HOURS, "retention period below minimum");
        hours = MIN_RETENTION_HOURS;
    } else if hours > MAX_RETENTION_HOURS {
        warn!(hours, max = MAX_RETENTION_HOURS, "retention period above maximum");
        hours = MAX_RETENTION_HOURS;
    }

    hours
}

/// Resolve the retention period, reading [`RETENTION_HOURS_ENV`] from the
/// process environment.
pub fn retention_hours(interface: Option<&InterfaceConfig>) -> i64 {
    let env_value = std::env::var(RETENTION_HOURS_ENV).ok();
    resolve_retention_hours(interface, env_value.as_deref())
}

/// Whole hours from a JSON number. Fractions are truncated.
fn json_hours(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

// ── Expiration policy ───────────────────────────────────────────────────────

/// How the expiration instant of a temporary chat is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ExpirationPolicy {
    /// Expire a fixed number of hours after creation.
    Rolling,
    /// Expire at the next local midnight in `timezone`.
    #[serde(rename_all = "camelCase")]
    NextLocalMidnight {
        /// IANA timezone name.
        #[serde(default = "default_timezone")]
        timezone: String,
    },
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::NextLocalMidnight {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    NEW_JERSEY_TIMEZONE.to_string()
}

impl ExpirationPolicy {
    /// Short name of the mode, as used in settings and env overrides.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Rolling => "rolling",
            Self::NextLocalMidnight { .. } => "nextLocalMidnight",
        }
    }

    /// Expiration instant for a chat created at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RetentionError::InvalidTimezone`] for an unknown timezone,
    /// or [`RetentionError::InvalidDatetime`] if the result is out of range.
    pub fn expiration_for(
        &self,
        now: DateTime<Utc>,
        retention_hours: i64,
    ) -> Result<DateTime<Utc>, RetentionError> {
        match self {
            Self::Rolling => Duration::try_hours(retention_hours)
                .and_then(|d| now.checked_add_signed(d))
                .ok_or_else(|| {
                    RetentionError::InvalidDatetime(format!(
                        "{now} + {retention_hours}h is out of range"
                    ))
                }),
            Self::NextLocalMidnight { timezone } => midnight::next_local_midnight(now, timezone),
        }
    }
}

/// Expiration instant for a temporary chat created now.
///
/// # Errors
///
/// See [`ExpirationPolicy::expiration_for`].
pub fn create_temp_chat_expiration_date(
    clock: &dyn Clock,
    settings: &RetentionSettings,
) -> Result<DateTime<Utc>, RetentionError> {
    let now = clock.now();
    let hours = retention_hours(Some(&settings.interface));
    let expires = settings.expiration.expiration_for(now, hours)?;
    debug!(%now, %expires, mode = settings.expiration.mode(), "temporary chat expiration");
    Ok(expires)
}
