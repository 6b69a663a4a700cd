use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::{ProxyError, Result};

/// WGS 84 position in `[longitude, latitude]` order
///
/// Serialized as a two-element JSON array, matching the GeoJSON position
/// layout used by the upstream provider and the HTTP contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    /// Create a validated position
    ///
    /// Both components must be finite, longitude within [-180, 180] and
    /// latitude within [-90, 90].
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProxyError::InvalidInput(format!(
                "Coordinates must be finite, got [{}, {}]",
                lon, lat
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ProxyError::InvalidInput(format!(
                "Longitude {} is outside [-180, 180]",
                lon
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProxyError::InvalidInput(format!("Latitude {} is outside [-90, 90]", lat)));
        }
        Ok(Self { lon, lat })
    }

    /// Parse an arbitrary JSON value as a `[lon, lat]` pair
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            ProxyError::InvalidInput(format!("Expected a [lon, lat] array, got {}", value))
        })?;

        if items.len() != 2 {
            return Err(ProxyError::InvalidInput(format!(
                "Expected exactly 2 coordinates, got {}",
                items.len()
            )));
        }

        let component = |v: &JsonValue| {
            v.as_f64().ok_or_else(|| {
                ProxyError::InvalidInput(format!("Coordinate {} is not a number", v))
            })
        };

        Self::new(component(&items[0])?, component(&items[1])?)
    }

    /// Position formatted as the provider expects it in URLs (`lon,lat`)
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.lon, self.lat)
    }

    /// Position rounded to three decimals (roughly 110 m), used for cache keys
    pub fn rounded_key(&self) -> String {
        format!("{:.3},{:.3}", round3(self.lon), round3(self.lat))
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl TryFrom<[f64; 2]> for LngLat {
    type Error = ProxyError;

    fn try_from(value: [f64; 2]) -> Result<Self> {
        Self::new(value[0], value[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        value.to_array()
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lon, self.lat)
    }
}

// Adding 0.0 folds -0.0 into 0.0 so both sides of the meridian/equator agree.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0 + 0.0
}

/// Parse a position written as `lon,lat`
pub fn parse_lng_lat(s: &str) -> Result<LngLat> {
    let (lon, lat) = s.split_once(',').ok_or_else(|| {
        ProxyError::InvalidInput(format!("Expected 'lon,lat', got '{}'", s))
    })?;

    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|_| ProxyError::InvalidInput(format!("'{}' is not a number", part.trim())))
    };

    LngLat::new(parse(lon)?, parse(lat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_pair() {
        let point = LngLat::from_json(&json!([-4.02, 5.32])).unwrap();
        assert_eq!(point.lon, -4.02);
        assert_eq!(point.lat, 5.32);
    }

    #[test]
    fn test_from_json_rejects_wrong_arity() {
        assert!(LngLat::from_json(&json!([-4.02])).is_err());
        assert!(LngLat::from_json(&json!([-4.02, 5.32, 10.0])).is_err());
        assert!(LngLat::from_json(&json!([])).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_numbers() {
        assert!(LngLat::from_json(&json!(["-4.02", 5.32])).is_err());
        assert!(LngLat::from_json(&json!([null, 5.32])).is_err());
        assert!(LngLat::from_json(&json!({"lon": -4.02, "lat": 5.32})).is_err());
    }

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(matches!(LngLat::new(f64::NAN, 5.0), Err(ProxyError::InvalidInput(_))));
        assert!(matches!(LngLat::new(1.0, f64::INFINITY), Err(ProxyError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(LngLat::new(181.0, 0.0).is_err());
        assert!(LngLat::new(0.0, -90.5).is_err());
        assert!(LngLat::new(180.0, 90.0).is_ok());
    }

    #[test]
    fn test_serde_as_array() {
        let point = LngLat::new(-3.98, 5.35).unwrap();
        assert_eq!(serde_json::to_value(point).unwrap(), json!([-3.98, 5.35]));

        let parsed: LngLat = serde_json::from_value(json!([-3.98, 5.35])).unwrap();
        assert_eq!(parsed, point);

        assert!(serde_json::from_value::<LngLat>(json!([500.0, 5.35])).is_err());
    }

    #[test]
    fn test_parse_lng_lat() {
        let point = parse_lng_lat("-4.0083, 5.36").unwrap();
        assert_eq!(point.to_array(), [-4.0083, 5.36]);
        assert!(parse_lng_lat("-4.0083").is_err());
        assert!(parse_lng_lat("abc,5").is_err());
    }

    #[test]
    fn test_rounded_key() {
        let point = LngLat::new(-4.00834, 5.36049).unwrap();
        assert_eq!(point.rounded_key(), "-4.008,5.360");
    }

    proptest! {
        #[test]
        fn prop_valid_positions_parse_from_json(lon in -180.0f64..=180.0, lat in -90.0f64..=90.0) {
            let parsed = LngLat::from_json(&json!([lon, lat])).unwrap();
            prop_assert_eq!(parsed.to_array(), [lon, lat]);
        }

        #[test]
        fn prop_nearby_positions_share_rounded_key(lon in -179.0f64..179.0, lat in -89.0f64..89.0) {
            let snapped_lon = (lon * 1000.0).round() / 1000.0;
            let snapped_lat = (lat * 1000.0).round() / 1000.0;
            let a = LngLat::new(snapped_lon, snapped_lat).unwrap();
            let b = LngLat::new(snapped_lon + 0.0001, snapped_lat + 0.0001).unwrap();
            prop_assert_eq!(a.rounded_key(), b.rounded_key());
        }
    }
}
