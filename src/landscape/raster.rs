//! Categorical land-cover raster clipped to one AOI.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Affine transform from pixel to CRS coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Usually negative for north-up grids
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform with no rotation.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// From GDAL order `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Area of one cell in squared CRS units.
    pub fn cell_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation).abs()
    }

    /// Length of a cell side along a row, in CRS units.
    pub fn cell_width(&self) -> f64 {
        self.pixel_width.hypot(self.col_rotation)
    }

    /// Length of a cell side along a column, in CRS units.
    pub fn cell_height(&self) -> f64 {
        self.pixel_height.hypot(self.row_rotation)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

/// Read-only class grid with a nodata sentinel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LandcoverRaster {
    rows: usize,
    cols: usize,
    cells: Vec<i32>,
    nodata: i32,
    transform: GeoTransform,
    linear_unit_factor: f64,
    biome: String,
    aoi_mask: Option<Vec<bool>>,
}

impl LandcoverRaster {
    /// Create a raster from row-major cells. Transform units are taken as metres.
    pub fn new(
        rows: usize,
        cols: usize,
        cells: Vec<i32>,
        nodata: i32,
        transform: GeoTransform,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(AnalysisError::RasterRead(format!(
                "raster has no cells ({rows}x{cols})"
            )));
        }
        if cells.len() != rows * cols {
            return Err(AnalysisError::DimensionMismatch {
                expected: rows * cols,
                got: cells.len(),
            });
        }
        if !(transform.cell_area().is_finite() && transform.cell_area() > 0.0) {
            return Err(AnalysisError::RasterRead(
                "geotransform yields a degenerate cell".to_string(),
            ));
        }
        Ok(Self {
            rows,
            cols,
            cells,
            nodata,
            transform,
            linear_unit_factor: 1.0,
            biome: String::new(),
            aoi_mask: None,
        })
    }

    /// Metres per CRS linear unit.
    pub fn with_linear_unit_factor(mut self, factor: f64) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "linear unit factor must be positive, got {factor}"
            )));
        }
        self.linear_unit_factor = factor;
        Ok(self)
    }

    /// Biome key used to look up the reference edge density.
    pub fn with_biome(mut self, biome: impl Into<String>) -> Self {
        self.biome = biome.into();
        self
    }

    /// Row-major mask; `false` marks cells outside the AOI.
    pub fn with_aoi_mask(mut self, mask: Vec<bool>) -> Result<Self> {
        if mask.len() != self.cells.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.cells.len(),
                got: mask.len(),
            });
        }
        self.aoi_mask = Some(mask);
        Ok(self)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn nodata(&self) -> i32 {
        self.nodata
    }

    pub fn biome(&self) -> &str {
        &self.biome
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Cells inside the AOI, with or without data.
    pub fn aoi_cell_count(&self) -> usize {
        match &self.aoi_mask {
            Some(mask) => mask.iter().filter(|&&inside| inside).count(),
            None => self.cells.len(),
        }
    }

    /// Class of a cell inside the AOI holding data.
    pub fn valid_class(&self, row: usize, col: usize) -> Option<i32> {
        let idx = row * self.cols + col;
        let inside = self.aoi_mask.as_ref().is_none_or(|m| m[idx]);
        let class = self.cells[idx];
        (inside && class != self.nodata).then_some(class)
    }

    /// Cell width in metres.
    pub fn cell_width_m(&self) -> f64 {
        self.transform.cell_width() * self.linear_unit_factor
    }

    /// Cell height in metres.
    pub fn cell_height_m(&self) -> f64 {
        self.transform.cell_height() * self.linear_unit_factor
    }

    /// Cell area in square metres.
    pub fn cell_area_m2(&self) -> f64 {
        self.transform.cell_area() * self.linear_unit_factor * self.linear_unit_factor
    }
}
