//! Composite condition score with a qualitative risk band.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ScoreWeights, ScoringConfig};
use crate::error::Result;
use crate::features::TrendResult;
use crate::landscape::MetricsResult;

/// Score at or above which condition risk is low.
pub const LOW_RISK_THRESHOLD: f64 = 70.0;
/// Score at or above which condition risk is moderate.
pub const MODERATE_RISK_THRESHOLD: f64 = 40.0;

/// Risk to ecological condition. Not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score >= LOW_RISK_THRESHOLD {
            RiskBand::Low
        } else if score >= MODERATE_RISK_THRESHOLD {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Moderate => "moderate",
            RiskBand::High => "high",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sub-metrics normalized to [0, 1], before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub intactness: f64,
    pub shannon: f64,
    /// Clamped fragmentation; enters the score as `1 - fragmentation`.
    pub fragmentation: f64,
    pub trend: Option<f64>,
    /// Mean species abundance, when supplied.
    pub msa: Option<f64>,
}

/// Composite score in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub band: RiskBand,
    /// Weights actually applied, after redistributing absent components
    pub weights: ScoreWeights,
    pub components: ScoreComponents,
}

/// Weighted combination of landscape metrics and, optionally, the vegetation
/// trend and a precomputed mean species abundance (MSA) for the AOI.
#[derive(Debug, Clone)]
pub struct ScoreComposer {
    config: ScoringConfig,
}

impl ScoreComposer {
    /// Fails with a config error unless the weights are non-negative and sum
    /// to one.
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score `metrics` with the optional trend and MSA components. The weight
    /// of a missing component goes to the present ones.
    pub fn compose(
        &self,
        metrics: &MetricsResult,
        trend: Option<&TrendResult>,
        msa: Option<f64>,
    ) -> ScoreResult {
        let cfg = &self.config;

        let intactness = cfg.intactness_range.normalize(metrics.intactness_pct);
        let shannon = cfg.shannon_range.normalize(metrics.shannon);
        let fragmentation = cfg.fragmentation_range.normalize(metrics.fragmentation_norm);
        let trend_norm = trend.map(|t| cfg.trend_range.normalize(t.slope_per_year));
        let msa_norm = match msa {
            Some(v) if v.is_finite() => Some(cfg.msa_range.normalize(v)),
            Some(v) => {
                warn!(msa = v, "ignoring non-finite mean species abundance");
                None
            }
            None => None,
        };

        let weights = cfg
            .weights
            .redistributed(trend_norm.is_some(), msa_norm.is_some());

        let value = weights.intactness * intactness
            + weights.shannon * shannon
            + weights.fragmentation * (1.0 - fragmentation)
            + weights.trend * trend_norm.unwrap_or(0.0)
            + weights.msa * msa_norm.unwrap_or(0.0);
        let score = (100.0 * value).clamp(0.0, 100.0);

        ScoreResult {
            score,
            band: RiskBand::from_score(score),
            weights,
            components: ScoreComponents {
                intactness,
                shannon,
                fragmentation,
                trend: trend_norm,
                msa: msa_norm,
            },
        }
    }
}
