//! Landscape-pattern metrics over a categorical raster.
//!
//! Intactness, edge length and class diversity are computed over valid cells
//! only: inside the AOI and not nodata. Edge density divides by the whole AOI
//! area, nodata included.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::raster::LandcoverRaster;
use crate::config::LandscapeConfig;
use crate::error::{AnalysisError, Result};

const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;

/// Landscape metrics for one AOI and one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Valid cells in the intact class subset, in percent
    pub intactness_pct: f64,
    /// Edge density divided by the biome reference
    pub fragmentation_norm: f64,
    /// Shannon entropy of class proportions, in nats
    pub shannon: f64,
    pub valid_pixel_count: usize,
    pub total_pixel_count: usize,
    /// Edge length between differing classes per AOI area, in m/ha
    pub edge_density: f64,
    pub reference_edge_density: f64,
    /// Simpson diversity 1 - Σp²
    pub simpson: f64,
    pub class_count: usize,
    /// 4-connected patches of equal class
    pub patch_count: usize,
    pub nodata_fraction: f64,
}

/// Computes [`MetricsResult`] from a [`LandcoverRaster`].
#[derive(Debug, Clone)]
pub struct LandscapeMetricEngine {
    config: LandscapeConfig,
}

impl LandscapeMetricEngine {
    pub fn new(config: LandscapeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LandscapeConfig {
        &self.config
    }

    pub fn compute(&self, raster: &LandcoverRaster) -> Result<MetricsResult> {
        let total = raster.len();

        let counts = class_counts(raster);
        let valid: usize = counts.values().sum();
        if valid == 0 {
            return Err(AnalysisError::RasterRead(format!(
                "no valid cells among {total} in AOI"
            )));
        }
        let reference = self.config.reference_for(raster.biome())?;

        let nodata_fraction = 1.0 - valid as f64 / total as f64;
        if nodata_fraction > self.config.nodata_warn_fraction {
            warn!(
                biome = raster.biome(),
                valid,
                total,
                nodata_fraction,
                "marginal raster coverage"
            );
        }

        let intact: usize = counts
            .iter()
            .filter(|(class, _)| self.config.intact_classes.contains(*class))
            .map(|(_, &n)| n)
            .sum();
        let intactness_pct = 100.0 * intact as f64 / valid as f64;

        let area_ha =
            raster.aoi_cell_count() as f64 * raster.cell_area_m2() / SQUARE_METRES_PER_HECTARE;
        let edge_density = edge_length_m(raster) / area_ha;

        let (shannon, simpson) = diversity(&counts, valid);
        let patch_count = patch_count(raster);

        debug!(
            valid,
            classes = counts.len(),
            edge_density,
            patch_count,
            "computed landscape metrics"
        );

        Ok(MetricsResult {
            intactness_pct,
            fragmentation_norm: edge_density / reference,
            shannon,
            valid_pixel_count: valid,
            total_pixel_count: total,
            edge_density,
            reference_edge_density: reference,
            simpson,
            class_count: counts.len(),
            patch_count,
            nodata_fraction,
        })
    }
}

fn class_counts(raster: &LandcoverRaster) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for row in 0..raster.rows() {
        for col in 0..raster.cols() {
            if let Some(class) = raster.valid_class(row, col) {
                *counts.entry(class).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Total shared boundary, in metres, between valid 4-neighbours of differing
/// class.
fn edge_length_m(raster: &LandcoverRaster) -> f64 {
    let (rows, cols) = (raster.rows(), raster.cols());
    let mut vertical_sides = 0usize;
    let mut horizontal_sides = 0usize;

    for row in 0..rows {
        for col in 0..cols {
            let Some(class) = raster.valid_class(row, col) else {
                continue;
            };
            if col + 1 < cols {
                if let Some(right) = raster.valid_class(row, col + 1) {
                    if right != class {
                        vertical_sides += 1;
                    }
                }
            }
            if row + 1 < rows {
                if let Some(below) = raster.valid_class(row + 1, col) {
                    if below != class {
                        horizontal_sides += 1;
                    }
                }
            }
        }
    }

    vertical_sides as f64 * raster.cell_height_m() + horizontal_sides as f64 * raster.cell_width_m()
}

/// Shannon (nats) and Simpson diversity of class proportions.
fn diversity(counts: &BTreeMap<i32, usize>, total: usize) -> (f64, f64) {
    let total_f = total as f64;
    let mut h = 0.0;
    let mut d = 0.0;
    for &count in counts.values() {
        let p = count as f64 / total_f;
        if p > 0.0 {
            h -= p * p.ln();
        }
        d += p * p;
    }
    (h, 1.0 - d)
}

/// Number of 4-connected regions of equal class among valid cells.
fn patch_count(raster: &LandcoverRaster) -> usize {
    let (rows, cols) = (raster.rows(), raster.cols());
    let mut visited = vec![false; rows * cols];
    let mut stack = Vec::new();
    let mut patches = 0;

    for start in 0..rows * cols {
        if visited[start] {
            continue;
        }
        let Some(class) = raster.valid_class(start / cols, start % cols) else {
            continue;
        };

        patches += 1;
        visited[start] = true;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            let (r, c) = (idx / cols, idx % cols);
            let neighbours = [
                (r > 0).then(|| idx - cols),
                (r + 1 < rows).then(|| idx + cols),
                (c > 0).then(|| idx - 1),
                (c + 1 < cols).then(|| idx + 1),
            ];
            for n in neighbours.into_iter().flatten() {
                if !visited[n] && raster.valid_class(n / cols, n % cols) == Some(class) {
                    visited[n] = true;
                    stack.push(n);
                }
            }
        }
    }

    patches
}
