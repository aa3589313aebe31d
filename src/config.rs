//! Analysis configuration.
//!
//! Passed explicitly into the landscape engine and score composer; never read
//! from global state. Loadable from YAML and validated at load time.
//!
//! ```
//! use ecotrend::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_yaml_str(
//!     r#"
//! landscape:
//!   intact_classes: [1, 2, 6]
//!   reference_edge_density:
//!     tropical_forest: 80.0
//! scoring:
//!   weights:
//!     intactness: 0.5
//!     shannon: 0.25
//!     fragmentation: 0.25
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.scoring.weights.intactness, 0.5);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AnalysisError, Result};

/// Tolerance on the sum of score weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub landscape: LandscapeConfig,
    pub scoring: ScoringConfig,
}

impl AnalysisConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_yaml::from_str(yaml).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        info!(
            intact_classes = config.landscape.intact_classes.len(),
            biomes = config.landscape.reference_edge_density.len(),
            "loaded analysis configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.landscape.validate()?;
        self.scoring.validate()
    }
}

/// Landscape metric settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Class ids counted as intact habitat.
    pub intact_classes: BTreeSet<i32>,
    /// Reference edge density per biome key, in metres per hectare.
    pub reference_edge_density: BTreeMap<String, f64>,
    /// Reference used when a raster's biome has no entry.
    pub default_reference_edge_density: Option<f64>,
    /// Nodata share above which a raster is reported as marginal.
    pub nodata_warn_fraction: f64,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            intact_classes: [1, 2, 6].into_iter().collect(),
            reference_edge_density: BTreeMap::new(),
            default_reference_edge_density: Some(100.0),
            nodata_warn_fraction: 0.5,
        }
    }
}

impl LandscapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(mut self, biome: impl Into<String>, edge_density: f64) -> Self {
        self.reference_edge_density.insert(biome.into(), edge_density);
        self
    }

    pub fn with_default_reference(mut self, edge_density: Option<f64>) -> Self {
        self.default_reference_edge_density = edge_density;
        self
    }

    /// Reference edge density for `biome`, falling back to the default.
    pub fn reference_for(&self, biome: &str) -> Result<f64> {
        self.reference_edge_density
            .get(biome)
            .copied()
            .or(self.default_reference_edge_density)
            .ok_or_else(|| {
                AnalysisError::Config(format!("no reference edge density for biome '{biome}'"))
            })
    }

    pub fn validate(&self) -> Result<()> {
        for (biome, &density) in &self.reference_edge_density {
            if !(density.is_finite() && density > 0.0) {
                return Err(AnalysisError::Config(format!(
                    "reference edge density for biome '{biome}' must be positive, got {density}"
                )));
            }
        }
        if let Some(density) = self.default_reference_edge_density {
            if !(density.is_finite() && density > 0.0) {
                return Err(AnalysisError::Config(format!(
                    "default reference edge density must be positive, got {density}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.nodata_warn_fraction) {
            return Err(AnalysisError::Config(format!(
                "nodata_warn_fraction must be in [0, 1], got {}",
                self.nodata_warn_fraction
            )));
        }
        Ok(())
    }
}

/// Closed interval used to map a raw metric onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Linear position of `value` in the range, clamped to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.max > self.min) {
            return Err(AnalysisError::Config(format!(
                "{name} range must satisfy min < max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Relative weights of the score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub intactness: f64,
    pub shannon: f64,
    pub fragmentation: f64,
    /// Weight of the vegetation trend; redistributed when no trend is given.
    pub trend: f64,
    /// Weight of mean species abundance; redistributed when no MSA is given.
    pub msa: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            intactness: 0.4,
            shannon: 0.3,
            fragmentation: 0.3,
            trend: 0.0,
            msa: 0.0,
        }
    }
}

impl ScoreWeights {
    pub fn new(intactness: f64, shannon: f64, fragmentation: f64) -> Self {
        Self {
            intactness,
            shannon,
            fragmentation,
            trend: 0.0,
            msa: 0.0,
        }
    }

    pub fn with_trend(mut self, trend: f64) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_msa(mut self, msa: f64) -> Self {
        self.msa = msa;
        self
    }

    pub fn sum(&self) -> f64 {
        self.landscape() + self.trend + self.msa
    }

    /// Combined weight of the raster-derived components.
    pub fn landscape(&self) -> f64 {
        self.intactness + self.shannon + self.fragmentation
    }

    /// Weights for a score built without some optional components.
    ///
    /// The weight of each absent component is spread over the present ones
    /// in proportion to their own weights, so the result still sums to the
    /// original total.
    pub fn redistributed(&self, has_trend: bool, has_msa: bool) -> Self {
        let trend = if has_trend { self.trend } else { 0.0 };
        let msa = if has_msa { self.msa } else { 0.0 };
        let present = self.landscape() + trend + msa;
        if present <= 0.0 {
            return Self {
                trend,
                msa,
                ..*self
            };
        }
        let scale = self.sum() / present;
        Self {
            intactness: self.intactness * scale,
            shannon: self.shannon * scale,
            fragmentation: self.fragmentation * scale,
            trend: trend * scale,
            msa: msa * scale,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            ("intactness", self.intactness),
            ("shannon", self.shannon),
            ("fragmentation", self.fragmentation),
            ("trend", self.trend),
            ("msa", self.msa),
        ];
        for (name, w) in all {
            if !(w.is_finite() && w >= 0.0) {
                return Err(AnalysisError::Config(format!(
                    "weight '{name}' must be non-negative, got {w}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalysisError::Config(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        // Trend and MSA may be absent at compose time.
        if self.landscape() <= 0.0 {
            return Err(AnalysisError::Config(
                "intactness, shannon and fragmentation weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Score composition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// Intactness percent range.
    pub intactness_range: ReferenceRange,
    /// Shannon entropy range, in nats.
    pub shannon_range: ReferenceRange,
    /// Normalized fragmentation range; higher is worse.
    pub fragmentation_range: ReferenceRange,
    /// Trend slope range, in index units per year.
    pub trend_range: ReferenceRange,
    /// Mean species abundance range; MSA is a fraction of the intact state.
    pub msa_range: ReferenceRange,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            intactness_range: ReferenceRange::new(0.0, 100.0),
            shannon_range: ReferenceRange::new(0.0, 2.0),
            fragmentation_range: ReferenceRange::new(0.0, 1.0),
            trend_range: ReferenceRange::new(-0.02, 0.02),
            msa_range: ReferenceRange::new(0.0, 1.0),
        }
    }
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_shannon_range(mut self, min: f64, max: f64) -> Self {
        self.shannon_range = ReferenceRange::new(min, max);
        self
    }


    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.intactness_range.validate("intactness")?;
        self.shannon_range.validate("shannon")?;
        self.fragmentation_range.validate("fragmentation")?;
        self.trend_range.validate("trend")?;
        self.msa_range.validate("msa")
    }
}
