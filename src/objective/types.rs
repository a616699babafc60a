//! Objectives and the aggregated outcome table.

use super::strategy::Strategy;
use crate::error::{ConfigError, Result};

/// Scoring setup for one outcome variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    /// Display name of the variable.
    pub name: String,

    /// Scoring rule for the variable's period series.
    pub strategy: Strategy,

    /// Non-negative weight of this variable in the total score.
    pub weight: f64,

    /// Target trajectory, required by [`Strategy::EvenflowTarget`] and
    /// ignored by the others.
    pub target: Option<Vec<f64>>,
}

impl Objective {
    pub fn new(name: impl Into<String>, strategy: Strategy, weight: f64) -> Self {
        Self {
            name: name.into(),
            strategy,
            weight,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Vec<f64>) -> Self {
        self.target = Some(target);
        self
    }

    /// Builds objectives from the parallel arrays of the classic entry
    /// point: one strategy, weight, name and optional target per variable.
    pub fn from_parts<S: AsRef<str>>(
        strategies: &[Strategy],
        weights: &[f64],
        names: &[S],
        targets: &[Option<Vec<f64>>],
    ) -> Result<Vec<Objective>> {
        let n = strategies.len();
        if weights.len() != n || names.len() != n || targets.len() != n {
            return Err(ConfigError::LengthMismatch {
                strategies: n,
                weights: weights.len(),
                names: names.len(),
                targets: targets.len(),
            }
            .into());
        }

        Ok(strategies
            .iter()
            .zip(weights)
            .zip(names)
            .zip(targets)
            .map(|(((&strategy, &weight), name), target)| Objective {
                name: name.as_ref().to_string(),
                strategy,
                weight,
                target: target.clone(),
            })
            .collect())
    }

    /// Checks the weight and, for target tracking, that the target is
    /// finite and spans the planning horizon.
    pub fn validate(&self, horizon: usize) -> Result<()> {
        if !self.weight.is_finite() {
            return Err(ConfigError::NonFiniteWeight {
                variable: self.name.clone(),
                weight: self.weight,
            }
            .into());
        }
        if self.weight < 0.0 {
            return Err(ConfigError::NegativeWeight {
                variable: self.name.clone(),
                weight: self.weight,
            }
            .into());
        }
        if self.strategy.needs_target() {
            match &self.target {
                None => {
                    return Err(ConfigError::MissingTarget {
                        variable: self.name.clone(),
                    }
                    .into())
                }
                Some(t) if t.len() != horizon => {
                    return Err(ConfigError::TargetLength {
                        variable: self.name.clone(),
                        expected: horizon,
                        found: t.len(),
                    }
                    .into())
                }
                Some(t) => {
                    if let Some(period) = t.iter().position(|v| !v.is_finite()) {
                        return Err(ConfigError::NonFiniteTarget {
                            variable: self.name.clone(),
                            period,
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Weighted score of this variable's series.
    #[inline]
    pub fn score(&self, series: &[f64]) -> f64 {
        self.weight * self.strategy.score(series, self.target.as_deref())
    }
}

/// Fleet-wide outcomes, `[period][variable]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeTable {
    periods: usize,
    variables: usize,
    values: Vec<f64>,
}

impl OutcomeTable {
    /// A table of zeros.
    pub fn zeros(periods: usize, variables: usize) -> Self {
        Self {
            periods,
            variables,
            values: vec![0.0; periods * variables],
        }
    }

    /// Wraps a period-major buffer of `periods * variables` values.
    ///
    /// # Panics
    /// Panics if the buffer length does not match.
    pub fn from_values(periods: usize, variables: usize, values: Vec<f64>) -> Self {
        assert_eq!(values.len(), periods * variables, "outcome table size mismatch");
        Self {
            periods,
            variables,
            values,
        }
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn variables(&self) -> usize {
        self.variables
    }

    pub fn get(&self, period: usize, variable: usize) -> f64 {
        self.values[period * self.variables + variable]
    }

    /// All variables of one period.
    pub fn row(&self, period: usize) -> &[f64] {
        let start = period * self.variables;
        &self.values[start..start + self.variables]
    }

    /// One variable over all periods.
    pub fn column(&self, variable: usize) -> Vec<f64> {
        (0..self.periods).map(|p| self.get(p, variable)).collect()
    }

    /// Per-variable totals over the horizon.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.variables];
        for row in self.values.chunks_exact(self.variables.max(1)) {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        sums
    }

    /// Per-variable means over the horizon (zeros for an empty horizon).
    pub fn column_means(&self) -> Vec<f64> {
        let n = self.periods.max(1) as f64;
        self.column_sums().into_iter().map(|s| s / n).collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.periods).map(|p| self.row(p).to_vec()).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }
}
