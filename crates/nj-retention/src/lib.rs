//! # nj-retention
//!
//! Expiration instants for temporary chats in the New Jersey assistant.
//!
//! Temporary chats expire at the next local midnight in New Jersey rather
//! than a rolling number of hours after creation. This crate computes that
//! instant (DST-correct, calendar-correct), resolves the upstream
//! retention-hours setting, and loads the settings that choose between the
//! two.
//!
//! ## Modules
//!
//! - [`midnight`] — Next local midnight in a timezone, offset lookup and formatting
//! - [`retention`] — Retention hours and the [`ExpirationPolicy`]
//! - [`settings`] — Settings file + env overrides
//! - [`clock`] — Injectable time source
//! - [`error`] — Error types

pub mod clock;
pub mod error;
pub mod midnight;
pub mod retention;
pub mod settings;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::RetentionError;
pub use midnight::{
    describe_next_local_midnight, format_utc_offset, new_jersey_midnight_expiration,
    next_local_midnight, next_local_midnight_in, parse_timezone, utc_offset_at_local_midnight,
    LocalMidnight, NEW_JERSEY_TIMEZONE,
};
pub use retention::{
    create_temp_chat_expiration_date, resolve_retention_hours, retention_hours, ExpirationPolicy,
    DEFAULT_RETENTION_HOURS, MAX_RETENTION_HOURS, MIN_RETENTION_HOURS,
};
pub use settings::{load_settings, load_settings_from_path, InterfaceConfig, RetentionSettings};
