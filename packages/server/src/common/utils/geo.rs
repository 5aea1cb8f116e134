//! Geo helpers used by matching and tracking.
//!
//! Everything here is pure. Distances use the haversine formula on a sphere;
//! the bounding box is the cheap rectangular approximation used to filter open
//! requests on every walker poll.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude used by the bounding-box approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point only when both coordinates are present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance between two points in kilometers.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    distance_km(a, b) * 1000.0
}

/// Axis-aligned lat/lng box around a center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// `lat_delta = r / 111`, `lng_delta = r / (111 * cos(lat))`.
    ///
    /// Not a true circle: the corners reach about 1.4r from the center.
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let radius_km = radius_km.max(0.0);
        let lat_delta = radius_km / KM_PER_DEGREE;
        // cos() approaches zero at the poles; clamp so the box stays finite.
        let cos_lat = center.latitude.to_radians().cos().abs().max(1e-6);
        let lng_delta = radius_km / (KM_PER_DEGREE * cos_lat);

        Self {
            min_lat: center.latitude - lat_delta,
            max_lat: center.latitude + lat_delta,
            min_lng: center.longitude - lng_delta,
            max_lng: center.longitude + lng_delta,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }
}

/// Case-insensitive substring match of `needle` inside a zone label.
///
/// Blank needles never match, otherwise an empty base zone would make every
/// request visible.
pub fn zone_contains(label: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    label
        .map(|label| label.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}
