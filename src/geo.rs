//! Customer density overlay on the Brazil base map.
//!
//! Coordinates are projected linearly into the pixel box spanned by the base
//! map image, which is drawn stretched over the same extent.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::charts::{escape_xml, PRIMARY_COLOR, SECONDARY_COLOR};
use crate::models::CustomerLocation;

/// Geographic extent covered by the base map image
pub const LNG_MIN: f64 = -73.98283055;
pub const LNG_MAX: f64 = -33.8;
pub const LAT_MIN: f64 = -33.75116944;
pub const LAT_MAX: f64 = 5.4;

const POINT_COLOR: &str = "maroon";

/// Base map image state, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub enum BaseMap {
    /// Image reachable at `href` (usually the local `/assets/basemap` route)
    Available { href: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub width: f64,
    pub height: f64,
}

impl MapProjection {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixel position for a coordinate, `None` outside the map extent
    pub fn project(&self, lat: f64, lng: f64) -> Option<(f64, f64)> {
        if !(LAT_MIN..=LAT_MAX).contains(&lat) || !(LNG_MIN..=LNG_MAX).contains(&lng) {
            return None;
        }
        let x = (lng - LNG_MIN) / (LNG_MAX - LNG_MIN) * self.width;
        // Latitude grows northwards, pixel rows grow downwards
        let y = (LAT_MAX - lat) / (LAT_MAX - LAT_MIN) * self.height;
        Some((x, y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCell {
    pub col: usize,
    pub row: usize,
    pub count: usize,
}

/// Projected points binned into square pixel cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    pub cell_px: f64,
    pub cells: Vec<DensityCell>,
    pub max_count: usize,
    pub outside: usize,
}

impl DensityGrid {
    pub fn from_points(
        points: &[CustomerLocation],
        projection: &MapProjection,
        cell_px: f64,
    ) -> Self {
        let cell_px = cell_px.max(1.0);
        // Points on the south and east edges project onto the far border
        let last_row = ((projection.height / cell_px).ceil() as usize).saturating_sub(1);
        let last_col = ((projection.width / cell_px).ceil() as usize).saturating_sub(1);
        let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut outside = 0;

        for point in points {
            match projection.project(point.lat, point.lng) {
                Some((x, y)) => {
                    let row = ((y / cell_px) as usize).min(last_row);
                    let col = ((x / cell_px) as usize).min(last_col);
                    let key = (row, col);
                    *counts.entry(key).or_insert(0) += 1;
                }
                None => outside += 1,
            }
        }

        let max_count = counts.values().copied().max().unwrap_or(0);
        let cells = counts
            .into_iter()
            .map(|((row, col), count)| DensityCell { col, row, count })
            .collect();

        Self {
            cell_px,
            cells,
            max_count,
            outside,
        }
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }
}

pub struct BrazilMapPlotter {
    pub projection: MapProjection,
    /// Above this many points, draw density cells instead of dots
    pub max_scatter_points: usize,
    pub cell_px: f64,
}

impl Default for BrazilMapPlotter {
    fn default() -> Self {
        Self {
            projection: MapProjection::new(600.0, 600.0),
            max_scatter_points: 5_000,
            cell_px: 6.0,
        }
    }
}

impl BrazilMapPlotter {
    pub fn render(&self, points: &[CustomerLocation], base_map: &BaseMap) -> String {
        let href = match base_map {
            BaseMap::Available { href } => href,
            BaseMap::Unavailable { reason } => return unavailable_panel(reason),
        };

        let w = self.projection.width;
        let h = self.projection.height;
        let overlay = if points.len() <= self.max_scatter_points {
            self.scatter(points)
        } else {
            self.density(points)
        };

        format!(
            r##"<svg class="map" width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
  <image href="{href}" x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="none"/>
  <g class="customers">{overlay}</g>
  <text x="{tx}" y="{ty}" text-anchor="end" font-size="12" fill="{fg}">{n} customers</text>
</svg>"##,
            w = w,
            h = h,
            href = escape_xml(href),
            overlay = overlay,
            tx = w - 8.0,
            ty = h - 8.0,
            fg = SECONDARY_COLOR,
            n = points.len(),
        )
    }

    fn scatter(&self, points: &[CustomerLocation]) -> String {
        let mut dots = String::new();
        for point in points {
            if let Some((x, y)) = self.projection.project(point.lat, point.lng) {
                dots.push_str(&format!(
                    r#"<circle cx="{:.1}" cy="{:.1}" r="1.5" fill="{}" fill-opacity="0.3"/>"#,
                    x, y, POINT_COLOR
                ));
            }
        }
        dots
    }

    fn density(&self, points: &[CustomerLocation]) -> String {
        let grid = DensityGrid::from_points(points, &self.projection, self.cell_px);
        let mut cells = String::new();
        for cell in &grid.cells {
            // sqrt keeps sparse regions visible next to the big capitals
            let opacity = 0.15 + 0.75 * (cell.count as f64 / grid.max_count as f64).sqrt();
            cells.push_str(&format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="{:.2}"><title>{}</title></rect>"#,
                cell.col as f64 * grid.cell_px,
                cell.row as f64 * grid.cell_px,
                grid.cell_px,
                grid.cell_px,
                PRIMARY_COLOR,
                opacity,
                cell.count
            ));
        }
        cells
    }
}

fn unavailable_panel(reason: &str) -> String {
    format!(
        r#"<div class="map-unavailable"><p>The base map could not be loaded, so the customer map is not shown.</p><p><small>{}</small></p></div>"#,
        escape_xml(reason)
    )
}
