//! # Series Point
//!
//! History rows from `/api/temperature` and `/api/gforce`. The backend returns
//! them newest first; [`into_window`] turns them into the chronological, trimmed
//! sequence the store keeps.

use super::parse_timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub timestamp: String,
    pub value: f64,
    #[serde(default, alias = "package_id", skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

/// Sorts points oldest→newest and keeps the last `window` of them.
///
/// Points with unparseable timestamps keep their relative order and sort
/// before every dated point.
pub fn into_window(mut points: Vec<SeriesPoint>, window: usize) -> Vec<SeriesPoint> {
    points.sort_by_key(|p| parse_timestamp(&p.timestamp));
    let skip = points.len().saturating_sub(window);
    points.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ts: &str, value: f64) -> SeriesPoint {
        SeriesPoint { timestamp: ts.into(), value, package_id: None }
    }

    #[test]
    fn window_is_chronological_and_trimmed() {
        let newest_first = vec![
            point("2024-05-01T10:03:00", 4.0),
            point("2024-05-01T10:02:00", 3.0),
            point("2024-05-01T10:01:00", 2.0),
            point("2024-05-01T10:00:00", 1.0),
        ];
        let window = into_window(newest_first, 3);
        let values: Vec<f64> = window.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn short_input_is_kept_whole() {
        let window = into_window(vec![point("2024-05-01T10:00:00", 1.0)], 20);
        assert_eq!(window.len(), 1);
        assert!(into_window(Vec::new(), 5).is_empty());
    }
}
