pub mod geo;

pub use geo::{distance_km, distance_meters, zone_contains, BoundingBox, GeoPoint};
