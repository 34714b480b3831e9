//! Registered water bodies and restricted areas.

use serde::{Deserialize, Serialize};
use uip_types::GpsCoordinates;

use crate::jurisdiction::Jurisdiction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaKind {
    WaterBody,
    Restricted,
}

/// Closed polygon as (latitude, longitude) vertices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned box between two latitudes and two longitudes.
    pub fn rect(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self::new(vec![
            (lat_min, lng_min),
            (lat_min, lng_max),
            (lat_max, lng_max),
            (lat_max, lng_min),
        ])
    }

    /// Ray casting along the longitude axis.
    pub fn contains(&self, point: &GpsCoordinates) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let (y, x) = (point.latitude, point.longitude);
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (yi, xi) = self.vertices[i];
            let (yj, xj) = self.vertices[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisteredArea {
    pub name: String,
    pub kind: AreaKind,
    pub jurisdiction: Jurisdiction,
    pub polygon: Polygon,
}

/// Per-jurisdiction registry of areas where land cannot be acquired.
#[derive(Clone, Debug, Default)]
pub struct GeoRegistry {
    areas: Vec<RegisteredArea>,
}

impl GeoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the Bay of Bengal strip off Visakhapatnam.
    pub fn standard() -> Self {
        Self::new().register(RegisteredArea {
            name: "Bay of Bengal (Visakhapatnam coast)".into(),
            kind: AreaKind::WaterBody,
            jurisdiction: Jurisdiction::India,
            polygon: Polygon::rect(15.0, 17.5, 83.5, 87.0),
        })
    }

    pub fn register(mut self, area: RegisteredArea) -> Self {
        self.areas.push(area);
        self
    }

    /// First registered area in `jurisdiction` containing `point`.
    pub fn lookup(
        &self,
        jurisdiction: Jurisdiction,
        point: &GpsCoordinates,
    ) -> Option<&RegisteredArea> {
        self.areas
            .iter()
            .filter(|a| a.jurisdiction == jurisdiction)
            .find(|a| a.polygon.contains(point))
    }

    pub fn areas(&self) -> &[RegisteredArea] {
        &self.areas
    }
}
