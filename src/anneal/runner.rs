//! Annealing search loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use super::config::ScheduleConfig;
use super::types::{NoReport, Progress, Reporter, RunState, ScheduleResult};
use crate::data::StandData;
use crate::error::{ConfigError, Result};
use crate::neighbor::{Adjacency, AdjacencyConstraint, NeighborGenerator, Proposal};
use crate::objective::{evaluate, Evaluator, Objective};
use crate::random::{create_rng, entropy_seed, RunRng};

/// A validated scheduling problem.
///
/// All checks happen in [`Scheduler::new`]; runs cannot fail. The
/// scheduler only reads its inputs, so one instance can drive any number
/// of concurrent runs.
#[derive(Debug)]
pub struct Scheduler<'a> {
    data: &'a StandData,
    objectives: Vec<Objective>,
    adjacency: Option<Adjacency>,
    config: ScheduleConfig,
    seed: u64,
}

impl<'a> Scheduler<'a> {
    /// Validates `objectives`, `adjacency` and `config` against `data`.
    ///
    /// There must be exactly one objective per outcome variable.
    pub fn new(
        data: &'a StandData,
        objectives: Vec<Objective>,
        adjacency: Option<&AdjacencyConstraint>,
        config: ScheduleConfig,
    ) -> Result<Self> {
        config.validate()?;
        if objectives.len() != data.n_variables() {
            return Err(ConfigError::ObjectiveCount {
                objectives: objectives.len(),
                variables: data.n_variables(),
            }
            .into());
        }
        for objective in &objectives {
            objective.validate(data.n_periods())?;
        }
        let adjacency = match adjacency {
            Some(constraint) => constraint.compile(data.axis_map(), data.n_variables())?,
            None => None,
        };
        let seed = config.seed.unwrap_or_else(entropy_seed);

        Ok(Self {
            data,
            objectives,
            adjacency,
            config,
            seed,
        })
    }

    pub fn data(&self) -> &StandData {
        self.data
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Seed shared by every run; runs differ by stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Compiled adjacency, `None` when unconstrained.
    pub fn adjacency(&self) -> Option<&Adjacency> {
        self.adjacency.as_ref()
    }

    /// Creates a fresh annealer on random stream `stream`.
    pub fn annealer(&self, stream: u64) -> Annealer<'_> {
        Annealer::new(self, stream)
    }

    /// Runs to completion on random stream `stream`.
    pub fn run(&self, stream: u64) -> ScheduleResult {
        self.run_with(stream, &NoReport, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is checked before each step. A cancelled run returns the
    /// best assignment found so far.
    pub fn run_with_cancel(&self, stream: u64, cancel: Option<Arc<AtomicBool>>) -> ScheduleResult {
        self.run_with(stream, &NoReport, cancel.as_deref())
    }

    /// Runs with a progress reporter and an optional cancellation flag.
    pub fn run_with<R: Reporter + ?Sized>(
        &self,
        stream: u64,
        reporter: &R,
        cancel: Option<&AtomicBool>,
    ) -> ScheduleResult {
        let mut annealer = self.annealer(stream);
        annealer.initialize();
        while annealer.state() == RunState::Searching {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                annealer.cancel();
                break;
            }
            annealer.step(reporter);
        }
        annealer.finish()
    }
}

/// One annealing run.
///
/// Owns the mutable state of the run: assignment, random stream and
/// evaluator buffers. Moves through [`RunState::Initializing`],
/// [`RunState::Searching`] and [`RunState::Terminated`].
pub struct Annealer<'s> {
    scheduler: &'s Scheduler<'s>,
    generator: NeighborGenerator<'s>,
    evaluator: Evaluator<'s>,
    rng: RunRng,
    stream: u64,
    state: RunState,
    step: usize,

    current: Vec<usize>,
    current_score: f64,
    current_violations: usize,
    best: Vec<usize>,
    best_score: f64,

    accepted: usize,
    improved: usize,
    rejected_by_adjacency: usize,
    cancelled: bool,
    history: Vec<Progress>,
}

impl<'s> Annealer<'s> {
    fn new(scheduler: &'s Scheduler<'s>, stream: u64) -> Self {
        let data = scheduler.data;
        let generator = NeighborGenerator::new(
            data.valid_mgmts(),
            data.outcomes(),
            scheduler.adjacency.as_ref(),
            scheduler.config.exclude_current,
        );
        let evaluator = Evaluator::new(data.outcomes(), &scheduler.objectives);
        let report_slots = match scheduler.config.report_interval {
            0 => 0,
            n => scheduler.config.steps / n,
        };

        Self {
            scheduler,
            generator,
            evaluator,
            rng: create_rng(scheduler.seed, stream),
            stream,
            state: RunState::Initializing,
            step: 0,
            current: Vec::new(),
            current_score: f64::NEG_INFINITY,
            current_violations: 0,
            best: Vec::new(),
            best_score: f64::NEG_INFINITY,
            accepted: 0,
            improved: 0,
            rejected_by_adjacency: 0,
            cancelled: false,
            history: Vec::with_capacity(report_slots),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Steps executed so far.
    pub fn step_count(&self) -> usize {
        self.step
    }

    pub fn current(&self) -> &[usize] {
        &self.current
    }

    pub fn current_score(&self) -> f64 {
        self.current_score
    }

    /// Conflicting neighbor pairs in the current assignment.
    pub(crate) fn current_violations(&self) -> usize {
        self.current_violations
    }

    pub fn best(&self) -> &[usize] {
        &self.best
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    fn penalty(&self, violations: usize) -> f64 {
        self.scheduler
            .adjacency
            .as_ref()
            .map_or(0.0, |adj| adj.penalty(violations))
    }

    /// Builds and scores the starting assignment. No-op after the first
    /// call.
    pub fn initialize(&mut self) {
        if self.state != RunState::Initializing {
            return;
        }
        let scheduler = self.scheduler;
        let config = &scheduler.config;
        let outcomes = scheduler.data.outcomes();

        self.current = self.generator.initial(config.initial, &mut self.rng);
        self.generator.repair(&mut self.current);
        self.current_violations = scheduler
            .adjacency
            .as_ref()
            .map_or(0, |adj| adj.total_violations(outcomes, &self.current));
        self.current_score = self.evaluator.load(&self.current) - self.penalty(self.current_violations);
        self.best.clone_from(&self.current);
        self.best_score = self.current_score;

        info!(
            event = "run_start",
            seed = scheduler.seed,
            stream = self.stream,
            stands = outcomes.n_stands() as u64,
            mgmts = outcomes.n_mgmts() as u64,
            periods = outcomes.n_periods() as u64,
            variables = outcomes.n_variables() as u64,
            steps = config.steps as u64,
            initial_score = self.current_score,
        );

        self.state = if config.steps == 0 {
            RunState::Terminated
        } else {
            RunState::Searching
        };
    }

    /// Executes one proposal/acceptance step.
    ///
    /// Initializes first if needed; does nothing once terminated.
    pub fn step<R: Reporter + ?Sized>(&mut self, reporter: &R) {
        if self.state == RunState::Initializing {
            self.initialize();
        }
        if self.state != RunState::Searching {
            return;
        }
        let scheduler = self.scheduler;
        let config = &scheduler.config;

        self.step += 1;
        let temperature = config.temperature(self.step);

        if let Some(mv) = self.generator.propose(&self.current, &mut self.rng) {
            match self.generator.filter(&self.current, mv) {
                Proposal::Rejected(_) => self.rejected_by_adjacency += 1,
                Proposal::Candidate {
                    mv,
                    conflicts_added,
                } => {
                    let violations = (self.current_violations as i64 + conflicts_added).max(0) as usize;
                    let score = self.evaluator.score_move(mv.stand, mv.from, mv.to)
                        - self.penalty(violations);

                    if accept(score, self.current_score, temperature, &mut self.rng) {
                        self.evaluator.commit();
                        mv.apply(&mut self.current);
                        self.current_score = score;
                        self.current_violations = violations;
                        self.accepted += 1;

                        if score > self.best_score {
                            self.best.copy_from_slice(&self.current);
                            self.best_score = score;
                            self.improved += 1;
                        }
                    }
                }
            }
        }

        if config.report_interval > 0 && self.step % config.report_interval == 0 {
            self.emit(temperature, reporter);
        }
        if self.step >= config.steps {
            self.state = RunState::Terminated;
        }
    }

    fn emit<R: Reporter + ?Sized>(&mut self, temperature: f64, reporter: &R) {
        let progress = Progress {
            stream: self.stream,
            step: self.step,
            temperature,
            score: self.current_score,
            best_score: self.best_score,
        };
        debug!(
            event = "progress",
            stream = self.stream,
            step = self.step as u64,
            temperature,
            score = self.current_score,
            best_score = self.best_score,
        );
        reporter.report(&progress);
        self.history.push(progress);
    }

    /// Stops the run before its budget is spent.
    pub fn cancel(&mut self) {
        if self.state != RunState::Terminated {
            self.state = RunState::Terminated;
            self.cancelled = true;
        }
    }

    /// Consumes the run and reports its best assignment, rescored from
    /// scratch.
    pub fn finish(mut self) -> ScheduleResult {
        self.initialize();
        let scheduler = self.scheduler;
        let outcomes = scheduler.data.outcomes();

        let (outcome_table, raw_score) = evaluate(outcomes, &scheduler.objectives, &self.best);
        let violations = scheduler
            .adjacency
            .as_ref()
            .map_or(0, |adj| adj.total_violations(outcomes, &self.best));
        let best_score = raw_score - self.penalty(violations);

        info!(
            event = "run_end",
            seed = scheduler.seed,
            stream = self.stream,
            steps = self.step as u64,
            best_score,
            accepted = self.accepted as u64,
            improved = self.improved as u64,
            rejected_by_adjacency = self.rejected_by_adjacency as u64,
            violations = violations as u64,
            cancelled = self.cancelled,
        );

        ScheduleResult {
            best_score,
            assignment: self.best,
            outcome_table,
            seed: scheduler.seed,
            stream: self.stream,
            steps_run: self.step,
            accepted: self.accepted,
            improved: self.improved,
            rejected_by_adjacency: self.rejected_by_adjacency,
            violations,
            cancelled: self.cancelled,
            history: self.history,
        }
    }
}

/// Metropolis criterion on higher-is-better scores.
fn accept<R: Rng>(candidate: f64, current: f64, temperature: f64, rng: &mut R) -> bool {
    if candidate >= current {
        return true;
    }
    if !(temperature > 0.0 && temperature.is_finite()) {
        return false;
    }
    let probability = ((candidate - current) / temperature).exp();
    rng.random::<f64>() < probability
}
