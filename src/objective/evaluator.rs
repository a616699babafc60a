//! Objective evaluation: fleet-wide reduction plus weighted strategy scores.
//!
//! [`evaluate`] is the pure contract. [`Evaluator`] gives the same
//! results incrementally: it holds the running totals of the current
//! assignment and scores a single-stand change in
//! `O(periods * variables)` without touching any other stand.

use super::types::{Objective, OutcomeTable};
use crate::data::OutcomeArray;

/// Sums each stand's chosen trajectory into a fleet table and scores it.
pub fn evaluate(
    outcomes: &OutcomeArray,
    objectives: &[Objective],
    assignment: &[usize],
) -> (OutcomeTable, f64) {
    let mut table = OutcomeTable::zeros(outcomes.n_periods(), outcomes.n_variables());
    accumulate(outcomes, assignment, table.as_mut_slice());
    let mut column = Vec::with_capacity(outcomes.n_periods());
    let score = score_values(objectives, table.as_slice(), outcomes.n_variables(), &mut column);
    (table, score)
}

fn accumulate(outcomes: &OutcomeArray, assignment: &[usize], totals: &mut [f64]) {
    totals.fill(0.0);
    for (stand, &mgmt) in assignment.iter().enumerate() {
        for (t, v) in totals.iter_mut().zip(outcomes.trajectory(stand, mgmt)) {
            *t += v;
        }
    }
}

/// Weighted score of a period-major table. `column` is scratch space.
fn score_values(
    objectives: &[Objective],
    values: &[f64],
    variables: usize,
    column: &mut Vec<f64>,
) -> f64 {
    let mut score = 0.0;
    for (variable, objective) in objectives.iter().enumerate() {
        column.clear();
        column.extend(values.iter().skip(variable).step_by(variables.max(1)));
        score += objective.score(column);
    }
    score
}

/// Incremental evaluator owned by a single run.
///
/// Buffers are allocated once; no call after construction allocates.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    outcomes: &'a OutcomeArray,
    objectives: &'a [Objective],
    totals: OutcomeTable,
    candidate: Vec<f64>,
    column: Vec<f64>,
}

impl<'a> Evaluator<'a> {
    pub fn new(outcomes: &'a OutcomeArray, objectives: &'a [Objective]) -> Self {
        let periods = outcomes.n_periods();
        let variables = outcomes.n_variables();
        Self {
            outcomes,
            objectives,
            totals: OutcomeTable::zeros(periods, variables),
            candidate: vec![0.0; periods * variables],
            column: Vec::with_capacity(periods),
        }
    }

    /// Recomputes the totals from scratch for `assignment` and returns
    /// its score.
    pub fn load(&mut self, assignment: &[usize]) -> f64 {
        accumulate(self.outcomes, assignment, self.totals.as_mut_slice());
        self.score_totals()
    }

    /// Score of the loaded assignment with `stand` moved from regime
    /// `from` to `to`. The result stays pending until [`commit`](Self::commit).
    pub fn score_move(&mut self, stand: usize, from: usize, to: usize) -> f64 {
        let old = self.outcomes.trajectory(stand, from);
        let new = self.outcomes.trajectory(stand, to);
        for (((c, t), o), n) in self
            .candidate
            .iter_mut()
            .zip(self.totals.as_slice())
            .zip(old)
            .zip(new)
        {
            *c = t - o + n;
        }
        let variables = self.outcomes.n_variables();
        score_values(self.objectives, &self.candidate, variables, &mut self.column)
    }

    /// Makes the last scored move the current totals.
    pub fn commit(&mut self) {
        self.totals.as_mut_slice().copy_from_slice(&self.candidate);
    }

    /// Score of the current totals.
    pub fn score_totals(&mut self) -> f64 {
        let variables = self.outcomes.n_variables();
        score_values(
            self.objectives,
            self.totals.as_slice(),
            variables,
            &mut self.column,
        )
    }

    /// Totals of the loaded assignment, including committed moves.
    pub fn totals(&self) -> &OutcomeTable {
        &self.totals
    }
}
