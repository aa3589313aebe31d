//! Per-AOI analysis chain and batch orchestration.
//!
//! One AOI is the unit of work: fill, decompose, estimate the trend, summarize,
//! then score the landscape when a raster is supplied. A batch runs AOIs
//! independently and returns one outcome per input, in input order. A failing
//! AOI never aborts its siblings.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::core::{Cadence, Sample, TimeSeries};
use crate::error::{AnalysisError, Result};
use crate::features::{SummaryStats, SummaryStatsCalculator, TrendEstimator, TrendResult};
use crate::landscape::{LandcoverRaster, LandscapeMetricEngine, MetricsResult};
use crate::parallel::*;
use crate::scoring::{ScoreComposer, ScoreResult};
use crate::seasonality::{DecompositionResult, SeasonalDecomposer};
use crate::transform::GapFiller;

/// Inputs for one area of interest.
#[derive(Debug, Clone)]
pub struct AoiInput {
    pub id: String,
    pub samples: Vec<Sample>,
    /// Nominal cadence, e.g. `"monthly"` or `"10D"`
    pub cadence: String,
    pub index_name: Option<String>,
    /// Requested analysis window; defaults to the observed span
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub landcover: Option<LandcoverRaster>,
    /// Precomputed mean species abundance over the AOI, in [0, 1]
    pub msa: Option<f64>,
}

impl AoiInput {
    pub fn new(id: impl Into<String>, samples: Vec<Sample>, cadence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            samples,
            cadence: cadence.into(),
            index_name: None,
            window: None,
            landcover: None,
            msa: None,
        }
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.window = Some((start, end));
        self
    }

    pub fn with_landcover(mut self, raster: LandcoverRaster) -> Self {
        self.landcover = Some(raster);
        self
    }

    pub fn with_msa(mut self, msa: f64) -> Self {
        self.msa = Some(msa);
        self
    }
}

/// Everything computed for one AOI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AoiReport {
    pub id: String,
    pub index_name: Option<String>,
    pub cadence: Cadence,
    /// Expected slots with no raw observation
    pub missing_count: usize,
    pub decomposition: DecompositionResult,
    pub trend: TrendResult,
    pub summary: SummaryStats,
    pub metrics: Option<MetricsResult>,
    pub score: Option<ScoreResult>,
}

/// Result of one AOI in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiOutcome {
    pub id: String,
    pub result: Result<AoiReport>,
}

impl AoiOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the full analysis chain for AOIs under one configuration.
#[derive(Debug, Clone)]
pub struct AoiAnalyzer {
    landscape: LandscapeMetricEngine,
    composer: ScoreComposer,
    time_budget: Option<Duration>,
}

impl AoiAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            landscape: LandscapeMetricEngine::new(config.landscape)?,
            composer: ScoreComposer::new(config.scoring)?,
            time_budget: None,
        })
    }

    /// Per-AOI wall-clock budget, checked between stages.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn analyze(&self, input: &AoiInput) -> Result<AoiReport> {
        let started = Instant::now();
        let cadence: Cadence = input.cadence.parse()?;

        let series = TimeSeries::from_samples(input.samples.clone(), cadence)
            .with_index_name(input.index_name.clone());
        let filler = match input.window {
            Some((start, end)) => GapFiller::new().with_window(start, end),
            None => GapFiller::new(),
        };
        let filled = filler.fill(&series)?;
        self.check_budget(started)?;

        let decomposition = SeasonalDecomposer::for_cadence(cadence).decompose(filled.series())?;
        let trend = TrendEstimator::new().estimate(&decomposition)?;
        let summary =
            SummaryStatsCalculator::new().compute_with_decomposition(&filled, &decomposition)?;
        self.check_budget(started)?;

        let metrics = input
            .landcover
            .as_ref()
            .map(|raster| self.landscape.compute(raster))
            .transpose()?;
        let score = metrics
            .as_ref()
            .map(|m| self.composer.compose(m, Some(&trend), input.msa));
        self.check_budget(started)?;

        debug!(
            aoi = %input.id,
            slope = trend.slope_per_year,
            p_value = trend.p_value,
            score = ?score.as_ref().map(|s| s.score),
            "analyzed AOI"
        );

        Ok(AoiReport {
            id: input.id.clone(),
            index_name: input.index_name.clone(),
            cadence,
            missing_count: filled.missing_count(),
            decomposition,
            trend,
            summary,
            metrics,
            score,
        })
    }

    /// Analyze AOIs independently; outcomes follow input order.
    pub fn analyze_batch(&self, inputs: &[AoiInput]) -> Vec<AoiOutcome> {
        let outcomes: Vec<AoiOutcome> = inputs
            .into_par_iter()
            .map(|input| AoiOutcome {
                id: input.id.clone(),
                result: self.analyze(input),
            })
            .collect();

        let mut failed = 0;
        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                failed += 1;
                warn!(aoi = %outcome.id, error = %e, "AOI analysis failed");
            }
        }
        info!(total = outcomes.len(), failed, "batch analysis finished");

        outcomes
    }

    fn check_budget(&self, started: Instant) -> Result<()> {
        let Some(budget) = self.time_budget else {
            return Ok(());
        };
        let elapsed = started.elapsed();
        if elapsed >= budget {
            return Err(AnalysisError::BudgetExceeded {
                elapsed_ms: elapsed.as_millis(),
                budget_ms: budget.as_millis(),
            });
        }
        Ok(())
    }
}
