//! Nominal sampling cadence of an index series.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Mean length of a calendar year in days, used for annualized slopes.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Nominal sampling interval of a series.
///
/// Each cadence partitions the calendar into slots. A slot is identified by its
/// anchor date (the first day it covers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// One slot per calendar month, anchored on the 1st.
    Monthly,
    /// Three slots per month (dekads), anchored on the 1st, 11th and 21st.
    TenDay,
    /// One slot per calendar quarter, anchored on Jan/Apr/Jul/Oct 1st.
    Quarterly,
}

impl Cadence {
    /// Number of slots in one seasonal cycle (one year).
    pub fn seasonal_period(&self) -> usize {
        match self {
            Cadence::Monthly => 12,
            Cadence::TenDay => 36,
            Cadence::Quarterly => 4,
        }
    }

    /// Canonical name.
    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::TenDay => "10-day",
            Cadence::Quarterly => "quarterly",
        }
    }

    /// Anchor date of the slot containing `date`.
    pub fn anchor(&self, date: NaiveDate) -> NaiveDate {
        let month_start = date - Days::new(u64::from(date.day0()));
        match self {
            Cadence::Monthly => month_start,
            Cadence::TenDay => {
                let dekad = (date.day0() / 10).min(2);
                month_start + Days::new(u64::from(dekad * 10))
            }
            Cadence::Quarterly => month_start - Months::new(date.month0() % 3),
        }
    }

    /// Anchor of the slot following the one containing `date`.
    pub fn next_slot(&self, date: NaiveDate) -> NaiveDate {
        let anchor = self.anchor(date);
        match self {
            Cadence::Monthly => anchor + Months::new(1),
            Cadence::TenDay => {
                if anchor.day() >= 21 {
                    Cadence::Monthly.anchor(anchor) + Months::new(1)
                } else {
                    anchor + Days::new(10)
                }
            }
            Cadence::Quarterly => anchor + Months::new(3),
        }
    }

    /// All slot anchors from the slot containing `start` through the slot
    /// containing `end`, inclusive. Empty when `end < start`.
    pub fn slots(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut slots = Vec::new();
        if end < start {
            return slots;
        }
        let last = self.anchor(end);
        let mut current = self.anchor(start);
        while current <= last {
            slots.push(current);
            current = self.next_slot(current);
        }
        slots
    }

    /// Position of the slot within its seasonal cycle (0-based).
    pub fn phase(&self, date: NaiveDate) -> usize {
        match self {
            Cadence::Monthly => date.month0() as usize,
            Cadence::TenDay => date.month0() as usize * 3 + (date.day0() / 10).min(2) as usize,
            Cadence::Quarterly => (date.month0() / 3) as usize,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Cadence {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" | "me" | "ms" | "1m" => Ok(Cadence::Monthly),
            "10-day" | "10day" | "10d" | "ten-day" | "dekad" | "dekadal" => Ok(Cadence::TenDay),
            "quarterly" | "quarter" | "q" | "qe" | "qs" | "3m" => Ok(Cadence::Quarterly),
            other => Err(AnalysisError::InvalidParameter(format!(
                "unknown cadence '{other}'"
            ))),
        }
    }
}

/// Elapsed time between two dates in fractional years.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}
