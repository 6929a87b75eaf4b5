// src/raster/region.rs
use geo::{
    BoundingRect, Coord, GeodesicArea, Intersects, LineString, Point, Polygon, Rect,
};
use serde::{Deserialize, Serialize};

use super::grid::GridSpec;
use crate::error::{EngineError, Result};

/// Region of interest: a simple lon/lat polygon without holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionRing", into = "RegionRing")]
pub struct Region {
    polygon: Polygon<f64>,
    bounds: Rect<f64>,
}

/// Serialized form of a region: an ordered ring of `[lon, lat]` pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRing {
    pub vertices: Vec<[f64; 2]>,
}

impl Region {
    /// Build a region from an ordered ring of lon/lat vertices.
    ///
    /// The ring is closed automatically when the last vertex differs from the first.
    pub fn new(vertices: &[(f64, f64)]) -> Result<Self> {
        let mut ring: Vec<Coord<f64>> = vertices.iter().map(|&(x, y)| Coord { x, y }).collect();
        ring.dedup();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(EngineError::InvalidRegion(format!(
                "a polygon needs at least 3 distinct vertices, got {}",
                ring.len()
            )));
        }
        if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(EngineError::InvalidRegion(
                "vertex coordinates must be finite".to_string(),
            ));
        }

        let polygon = Polygon::new(LineString::new(ring), vec![]);
        let bounds = polygon
            .bounding_rect()
            .ok_or_else(|| EngineError::InvalidRegion("empty polygon".to_string()))?;

        Ok(Self { polygon, bounds })
    }

    /// Axis-aligned rectangle region
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        Self::new(&[(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)])
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn bounds(&self) -> &Rect<f64> {
        &self.bounds
    }

    /// True when the pixel centre lies inside or on the boundary of the polygon
    pub fn contains_pixel(&self, grid: &GridSpec, col: usize, row: usize) -> bool {
        let (x, y) = grid.transform.pixel_center(col, row);
        self.polygon.intersects(&Point::new(x, y))
    }

    pub fn intersects(&self, footprint: &Polygon<f64>) -> bool {
        self.polygon.intersects(footprint)
    }

    /// Geodesic area in hectares
    pub fn area_hectares(&self) -> f64 {
        self.polygon.geodesic_area_unsigned() / 10_000.0
    }
}

impl TryFrom<RegionRing> for Region {
    type Error = EngineError;

    fn try_from(ring: RegionRing) -> Result<Self> {
        let vertices: Vec<(f64, f64)> = ring.vertices.iter().map(|&[x, y]| (x, y)).collect();
        Region::new(&vertices)
    }
}

impl From<Region> for RegionRing {
    fn from(region: Region) -> Self {
        let mut vertices: Vec<[f64; 2]> = region
            .polygon
            .exterior()
            .coords()
            .map(|c| [c.x, c.y])
            .collect();
        // geo closes the ring; keep the open form on the wire
        vertices.pop();
        RegionRing { vertices }
    }
}
