//! Independent runs over a shared, read-only problem.

use std::sync::atomic::AtomicBool;

use tracing::info;

use crate::anneal::{NoReport, Reporter, ScheduleResult, Scheduler};

/// Executes many annealing runs of one [`Scheduler`].
///
/// Run `i` uses random stream `i` of the scheduler's seed, so a batch is
/// reproducible and no run observes another. Results come back in
/// stream order regardless of completion order.
pub struct MultiRunner;

impl MultiRunner {
    /// Runs `n_runs` independent annealers.
    pub fn run(scheduler: &Scheduler<'_>, n_runs: usize) -> Vec<ScheduleResult> {
        Self::run_with(scheduler, n_runs, &NoReport, None)
    }

    /// Runs `n_runs` annealers sharing one reporter and one cancellation
    /// flag.
    ///
    /// With the `parallel` feature runs are spread over the rayon pool;
    /// otherwise they execute one after another.
    pub fn run_with<R: Reporter + ?Sized>(
        scheduler: &Scheduler<'_>,
        n_runs: usize,
        reporter: &R,
        cancel: Option<&AtomicBool>,
    ) -> Vec<ScheduleResult> {
        #[cfg(feature = "parallel")]
        let results: Vec<ScheduleResult> = {
            use rayon::prelude::*;
            (0..n_runs)
                .into_par_iter()
                .map(|stream| scheduler.run_with(stream as u64, reporter, cancel))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: Vec<ScheduleResult> = (0..n_runs)
            .map(|stream| scheduler.run_with(stream as u64, reporter, cancel))
            .collect();

        let best = results
            .iter()
            .map(|r| r.best_score)
            .fold(f64::NEG_INFINITY, f64::max);
        info!(
            event = "runs_joined",
            seed = scheduler.seed(),
            runs = results.len() as u64,
            best_score = best,
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::ScheduleConfig;
    use crate::data::synthetic;
    use crate::objective::{Objective, Strategy};
    use std::sync::mpsc;

    fn scheduler_for(data: &crate::data::StandData) -> Scheduler<'_> {
        let objectives = vec![
            Objective::new("yield", Strategy::CumulativeMaximize, 1.0),
            Objective::new("flow", Strategy::Evenflow, 4.0),
        ];
        let config = ScheduleConfig::default()
            .with_temperatures(0.01, 100.0)
            .with_steps(2_000)
            .with_report_interval(500)
            .with_seed(42);
        Scheduler::new(data, objectives, None, config).unwrap()
    }

    #[test]
    fn test_results_in_stream_order() {
        let data = synthetic::random(30, 4, 5, 2, 0, 20, 42).unwrap();
        let scheduler = scheduler_for(&data);
        let results = MultiRunner::run(&scheduler, 4);

        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.stream, i as u64);
            assert_eq!(result.seed, 42);
        }
    }

    #[test]
    fn test_batch_matches_individual_runs() {
        let data = synthetic::random(30, 4, 5, 2, 0, 20, 42).unwrap();
        let scheduler = scheduler_for(&data);
        let batch = MultiRunner::run(&scheduler, 3);
        for (i, result) in batch.iter().enumerate() {
            assert_eq!(result, &scheduler.run(i as u64));
        }
    }

    #[test]
    fn test_streams_explore_differently() {
        let data = synthetic::random(30, 4, 5, 2, 0, 20, 42).unwrap();
        let scheduler = scheduler_for(&data);
        let results = MultiRunner::run(&scheduler, 4);
        assert!(results
            .iter()
            .any(|r| r.assignment != results[0].assignment || r.accepted != results[0].accepted));
    }

    #[test]
    fn test_zero_runs() {
        let data = synthetic::random(3, 2, 2, 2, 0, 20, 42).unwrap();
        let scheduler = scheduler_for(&data);
        assert!(MultiRunner::run(&scheduler, 0).is_empty());
    }

    #[test]
    fn test_shared_reporter_and_cancel() {
        let data = synthetic::random(10, 3, 5, 2, 0, 20, 42).unwrap();
        let scheduler = scheduler_for(&data);

        let (tx, rx) = mpsc::channel();
        let results = MultiRunner::run_with(&scheduler, 3, &tx, None);
        drop(tx);
        assert_eq!(rx.iter().count(), 3 * 4);
        assert!(results.iter().all(|r| r.history.len() == 4));

        let cancel = AtomicBool::new(true);
        let results = MultiRunner::run_with(&scheduler, 3, &NoReport, Some(&cancel));
        assert!(results.iter().all(|r| r.cancelled && r.steps_run == 0));
    }
}
