//! Multi-objective forest stand scheduling by simulated annealing.
//!
//! Given an outcome array `[stand][mgmt][period][variable]`, the feasible
//! regimes of every stand, and one scoring [`Strategy`](objective::Strategy)
//! per variable, the scheduler picks one regime per stand so that the
//! fleet-wide trajectory scores as high as possible.
//!
//! - [`data`]: input array, axis map, feasible regimes, artifact cache
//! - [`objective`]: strategy library and objective evaluator
//! - [`neighbor`]: single-stand moves and the adjacency filter
//! - [`anneal`]: the annealing optimizer
//! - [`multi`]: independent parallel runs and their aggregation
//!
//! # Examples
//!
//! ```
//! use u_harvest::anneal::ScheduleConfig;
//! use u_harvest::data::synthetic;
//! use u_harvest::objective::{Objective, Strategy};
//!
//! let data = synthetic::random(50, 4, 6, 2, 4, 14, 42).unwrap();
//! let objectives = Objective::from_parts(
//!     &[Strategy::CumulativeMaximize, Strategy::Evenflow],
//!     &[1.0, 4.0],
//!     &["carbon", "harvest flow"],
//!     &[None, None],
//! )
//! .unwrap();
//! let config = ScheduleConfig::for_weights(&[1.0, 4.0], 100.0)
//!     .with_steps(5_000)
//!     .with_seed(42);
//!
//! let result = u_harvest::schedule(&data, objectives, None, config).unwrap();
//! assert_eq!(result.assignment.len(), 50);
//! assert_eq!(result.outcome_table.periods(), 6);
//! ```

pub mod anneal;
pub mod data;
pub mod error;
pub mod multi;
pub mod neighbor;
pub mod objective;
pub mod random;

pub use error::{ConfigError, DataShapeError, Result, ScheduleError};

use anneal::{ScheduleConfig, ScheduleResult, Scheduler};
use data::StandData;
use neighbor::AdjacencyConstraint;
use objective::Objective;

/// Validates the problem and runs one annealer on stream 0.
pub fn schedule(
    data: &StandData,
    objectives: Vec<Objective>,
    adjacency: Option<&AdjacencyConstraint>,
    config: ScheduleConfig,
) -> Result<ScheduleResult> {
    let scheduler = Scheduler::new(data, objectives, adjacency, config)?;
    Ok(scheduler.run(0))
}

/// Validates the problem and runs `n_runs` independent annealers,
/// returning their results in stream order.
pub fn schedule_many(
    data: &StandData,
    objectives: Vec<Objective>,
    adjacency: Option<&AdjacencyConstraint>,
    config: ScheduleConfig,
    n_runs: usize,
) -> Result<Vec<ScheduleResult>> {
    if n_runs == 0 {
        return Err(ConfigError::NoRuns.into());
    }
    let scheduler = Scheduler::new(data, objectives, adjacency, config)?;
    Ok(multi::MultiRunner::run(&scheduler, n_runs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;
    use crate::multi::MultiRunSummary;
    use crate::objective::Strategy;

    fn objectives() -> Vec<Objective> {
        Objective::from_parts(
            &[
                Strategy::CumulativeMaximize,
                Strategy::EvenflowTarget,
                Strategy::CumulativeMinimize,
            ],
            &[1.0, 4.0, 1.0],
            &["carbon", "harvest flow", "cost"],
            &[None, Some(vec![30.0; 5]), None],
        )
        .unwrap()
    }

    fn config() -> ScheduleConfig {
        ScheduleConfig::for_weights(&[1.0, 4.0, 1.0], 1000.0)
            .with_steps(3_000)
            .with_report_interval(1_000)
            .with_seed(7)
    }

    #[test]
    fn test_schedule_improves_on_start() {
        let data = synthetic::random(40, 5, 5, 3, 0, 10, 42).unwrap();
        let result = schedule(&data, objectives(), None, config()).unwrap();
        assert_eq!(result.history.len(), 3);
        assert!(result.best_score >= result.history[0].best_score - 1e-6);
        assert!(result.improved > 0);
    }

    #[test]
    fn test_schedule_many_and_summary() {
        let data = synthetic::random(40, 5, 5, 3, 0, 10, 42).unwrap();
        let results = schedule_many(&data, objectives(), None, config(), 4).unwrap();
        assert_eq!(results.len(), 4);

        let summary = MultiRunSummary::from_results(&results).unwrap();
        assert_eq!(summary.runs, 4);
        assert!(summary.min_score <= summary.mean_score && summary.mean_score <= summary.max_score);
        assert_eq!(summary.mean_outcomes.periods(), 5);
        assert_eq!(summary.modal_assignment.len(), 40);
    }

    #[test]
    fn test_schedule_many_rejects_zero_runs() {
        let data = synthetic::random(4, 2, 5, 3, 0, 10, 42).unwrap();
        assert_eq!(
            schedule_many(&data, objectives(), None, config(), 0).unwrap_err(),
            ScheduleError::Config(ConfigError::NoRuns)
        );
    }

    #[test]
    fn test_schedule_fails_fast_on_bad_target() {
        let data = synthetic::random(4, 2, 5, 3, 0, 10, 42).unwrap();
        let mut objectives = objectives();
        objectives[1].target = Some(vec![30.0; 4]);
        assert!(matches!(
            schedule(&data, objectives, None, config()),
            Err(ScheduleError::Config(ConfigError::TargetLength { expected: 5, found: 4, .. }))
        ));
    }
}
