use super::EntityId;
use serde::{Deserialize, Serialize};

/// A map marker position for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPoint {
    pub id: EntityId,
    #[serde(default, alias = "packageId", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
    #[serde(default, alias = "temperature", skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g_force: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_backend_location_rows() {
        let raw = r#"{"id": 3, "packageId": "PKG-3", "latitude": 41.38, "longitude": 2.17,
            "timestamp": "2024-05-01T10:00:00"}"#;
        let loc: LocationPoint = serde_json::from_str(raw).unwrap();
        assert_eq!(loc.name.as_deref(), Some("PKG-3"));
        assert_eq!(loc.lat, 41.38);
        assert_eq!(loc.temp, None);
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        assert!(serde_json::from_str::<LocationPoint>(r#"{"id": 1, "lat": 1.0}"#).is_err());
    }
}
