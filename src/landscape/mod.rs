//! Land-cover rasters and landscape-pattern metrics.
//!
//! # Example
//!
//! ```
//! use ecotrend::config::LandscapeConfig;
//! use ecotrend::landscape::{GeoTransform, LandcoverRaster, LandscapeMetricEngine};
//!
//! let cells = vec![1, 1, 3, 3];
//! let raster = LandcoverRaster::new(2, 2, cells, 0, GeoTransform::new(0.0, 0.0, 10.0, -10.0))
//!     .unwrap();
//!
//! let metrics = LandscapeMetricEngine::new(LandscapeConfig::default())
//!     .unwrap()
//!     .compute(&raster)
//!     .unwrap();
//! assert_eq!(metrics.intactness_pct, 50.0);
//! ```

pub mod metrics;
pub mod raster;

pub use metrics::{LandscapeMetricEngine, MetricsResult};
pub use raster::{GeoTransform, LandcoverRaster};
