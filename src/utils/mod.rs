//! Numeric helpers shared by the analysis modules.

pub mod stats;

pub use stats::{
    mean, median, min_max, normal_cdf, population_std_dev, population_variance, rms,
    two_sided_p_value, variance,
};
