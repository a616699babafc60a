//! Per-variable scoring strategies.
//!
//! Every strategy maps one variable's period series to a scalar where
//! higher is better, so weighted strategies can be summed into a single
//! comparable score.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Scoring rule applied to one outcome variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Reward total output: `sum(series)`.
    CumulativeMaximize,

    /// Treat the variable as a cost: `-sum(series)`.
    CumulativeMinimize,

    /// Reward temporal stability regardless of level: `-stddev(series)`.
    Evenflow,

    /// Reward tracking a target trajectory:
    /// `-sum((series[i] - target[i])^2)`.
    EvenflowTarget,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::CumulativeMaximize,
        Strategy::CumulativeMinimize,
        Strategy::Evenflow,
        Strategy::EvenflowTarget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::CumulativeMaximize => "cumulative_maximize",
            Strategy::CumulativeMinimize => "cumulative_minimize",
            Strategy::Evenflow => "evenflow",
            Strategy::EvenflowTarget => "evenflow_target",
        }
    }

    /// Whether the strategy needs a target trajectory.
    pub fn needs_target(self) -> bool {
        matches!(self, Strategy::EvenflowTarget)
    }

    /// Unweighted score of `series`.
    ///
    /// `target` is only read by [`Strategy::EvenflowTarget`]; a missing
    /// target there scores `0.0`. Objectives are validated up front, so
    /// the scheduler never reaches that case.
    pub fn score(self, series: &[f64], target: Option<&[f64]>) -> f64 {
        match self {
            Strategy::CumulativeMaximize => cumulative_maximize(series),
            Strategy::CumulativeMinimize => cumulative_minimize(series),
            Strategy::Evenflow => evenflow(series),
            Strategy::EvenflowTarget => target.map_or(0.0, |t| evenflow_target(series, t)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// `sum(series)`.
pub fn cumulative_maximize(series: &[f64]) -> f64 {
    series.iter().sum()
}

/// `-sum(series)`.
pub fn cumulative_minimize(series: &[f64]) -> f64 {
    -series.iter().sum::<f64>()
}

/// Negated population standard deviation.
///
/// Series shorter than two periods have no spread and score `0.0`, the
/// best possible value.
pub fn evenflow(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev.is_finite() {
        -stddev
    } else {
        0.0
    }
}

/// Negated sum of squared deviations from `target`.
///
/// Only the overlapping prefix is compared; lengths are checked when an
/// objective is validated.
pub fn evenflow_target(series: &[f64], target: &[f64]) -> f64 {
    -series
        .iter()
        .zip(target)
        .map(|(x, t)| (x - t) * (x - t))
        .sum::<f64>()
}
