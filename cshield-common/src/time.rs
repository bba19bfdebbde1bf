//! Timestamp utilities
//!
//! Wall-clock access goes through the [`Clock`] trait so the playback
//! countdown can be driven by a virtual clock in tests.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::sync::Arc;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Source of "now" for anything that compares against a deadline
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Parse an ISO-8601 timestamp as emitted by the backend.
///
/// Accepts RFC 3339 with `Z` or a numeric offset, and naive timestamps
/// (treated as UTC). Returns `None` for anything else.
pub fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = trimmed.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|n| Utc.from_utc_datetime(&n))
}

/// Serde adapter for lenient ISO timestamps
pub mod serde_iso {
    use super::parse_iso;
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_iso(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    /// Same as the parent module for optional fields (missing or null → `None`)
    pub mod option {
        use super::parse_iso;
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_some(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => parse_iso(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw))),
                None => Ok(None),
            }
        }
    }
}
