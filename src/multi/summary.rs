//! Read-only reductions over a batch of runs.

use std::collections::BTreeMap;

use crate::anneal::ScheduleResult;
use crate::error::{ConfigError, Result};
use crate::objective::OutcomeTable;

/// How stable the solutions of a batch are.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiRunSummary {
    pub runs: usize,
    pub mean_score: f64,
    pub min_score: f64,
    pub max_score: f64,

    /// Index of the run with the highest score (first on ties).
    pub best_run: usize,

    /// Element-wise mean of the runs' outcome tables.
    pub mean_outcomes: OutcomeTable,

    /// Most frequent regime per stand (lowest index on ties).
    pub modal_assignment: Vec<usize>,

    /// Fraction of runs that chose the modal regime, per stand.
    pub agreement: Vec<f64>,
}

impl MultiRunSummary {
    /// Reduces a non-empty batch of results of the same problem.
    pub fn from_results(results: &[ScheduleResult]) -> Result<Self> {
        let first = results.first().ok_or(ConfigError::NoRuns)?;
        let runs = results.len();
        let n = runs as f64;

        let mut best_run = 0;
        let mut min_score = f64::INFINITY;
        let mut max_score = f64::NEG_INFINITY;
        let mut total = 0.0;
        for (i, result) in results.iter().enumerate() {
            if result.best_score > max_score {
                max_score = result.best_score;
                best_run = i;
            }
            min_score = min_score.min(result.best_score);
            total += result.best_score;
        }

        let table = &first.outcome_table;
        let mut sums = vec![0.0; table.as_slice().len()];
        for result in results {
            for (s, v) in sums.iter_mut().zip(result.outcome_table.as_slice()) {
                *s += v;
            }
        }
        let mean_outcomes = OutcomeTable::from_values(
            table.periods(),
            table.variables(),
            sums.into_iter().map(|s| s / n).collect(),
        );

        let stands = first.assignment.len();
        let mut modal_assignment = Vec::with_capacity(stands);
        let mut agreement = Vec::with_capacity(stands);
        for stand in 0..stands {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for result in results {
                *counts.entry(result.assignment[stand]).or_default() += 1;
            }
            let (mgmt, count) = counts
                .into_iter()
                .fold((0, 0), |best, (m, c)| if c > best.1 { (m, c) } else { best });
            modal_assignment.push(mgmt);
            agreement.push(count as f64 / n);
        }

        Ok(Self {
            runs,
            mean_score: total / n,
            min_score,
            max_score,
            best_run,
            mean_outcomes,
            modal_assignment,
            agreement,
        })
    }

    /// Mean agreement over all stands; 1.0 when every run chose the same
    /// assignment.
    pub fn stability(&self) -> f64 {
        if self.agreement.is_empty() {
            return 1.0;
        }
        self.agreement.iter().sum::<f64>() / self.agreement.len() as f64
    }
}
