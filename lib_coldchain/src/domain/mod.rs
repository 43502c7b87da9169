//! # Payload Schemas
//!
//! Explicit, serde-validated shapes for everything the backend sends. The two
//! backends the monitor talks to disagree on field names (`packageId` vs
//! `part_id`, `temperature` vs `temp`, `gForce` vs `vibration`, ...), so the
//! structs accept both spellings through `#[serde(alias)]` and always serialize
//! in camelCase.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod alert;
pub mod kpi;
pub mod location;
pub mod profile;
pub mod series;
pub mod telemetry;

pub use alert::{Alert, Severity};
pub use kpi::KpiSnapshot;
pub use location::LocationPoint;
pub use profile::{Category, Profile};
pub use series::SeriesPoint;
pub use telemetry::TelemetryReading;

/// Identity of an alert or a location row. Backends use both integer keys and
/// string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

/// Parses the timestamp formats seen on the wire: RFC 3339, and naive ISO
/// date-times (with `T` or a space) which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_accept_numbers_and_strings() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[7, "pkg-7"]"#).unwrap();
        assert_eq!(ids[0], EntityId::Number(7));
        assert_eq!(ids[1].to_string(), "pkg-7");
    }

    #[test]
    fn parses_rfc3339_and_naive_timestamps() {
        let a = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        let b = parse_timestamp("2024-05-01T12:00:00+02:00").unwrap();
        let c = parse_timestamp("2024-05-01 10:00:00.250").unwrap();
        assert_eq!(a, b);
        assert!(c > a);
        assert!(parse_timestamp("10:00:00").is_none());
    }
}
