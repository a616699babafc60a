//! Annealing configuration and temperature schedules.

use crate::error::{ConfigError, Result};
use crate::neighbor::InitialAssignment;

/// Temperature schedule from `temp_max` at step 1 to `temp_min` at the
/// last step.
///
/// Acceptance probabilities depend on the schedule, so it is fixed per
/// run rather than adapted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// Exponential decay:
    /// `T(k) = temp_max * (temp_min / temp_max)^((k - 1) / (steps - 1))`.
    #[default]
    Geometric,

    /// Uniform decrease:
    /// `T(k) = temp_max - (temp_max - temp_min) * (k - 1) / (steps - 1)`.
    Linear,
}

impl CoolingSchedule {
    /// Temperature at 1-based `step` of `steps`.
    ///
    /// A single-step run stays at `temp_max`. When `temp_min >= temp_max`
    /// the schedule is flat at the smaller (positive) value, which makes
    /// the search close to greedy.
    pub fn temperature(self, step: usize, steps: usize, temp_max: f64, temp_min: f64) -> f64 {
        if temp_min >= temp_max || !temp_max.is_finite() {
            return temp_max.min(temp_min).max(f64::MIN_POSITIVE);
        }
        if steps <= 1 {
            return temp_max;
        }
        let frac = (step.saturating_sub(1) as f64 / (steps - 1) as f64).clamp(0.0, 1.0);
        match self {
            CoolingSchedule::Geometric if temp_min > 0.0 => {
                temp_max * (temp_min / temp_max).powf(frac)
            }
            _ => temp_max - (temp_max - temp_min) * frac,
        }
    }
}

/// Configuration for one annealing run.
///
/// # Examples
///
/// ```
/// use u_harvest::anneal::{CoolingSchedule, ScheduleConfig};
///
/// let config = ScheduleConfig::default()
///     .with_temperatures(0.17, 1700.0)
///     .with_steps(200_000)
///     .with_report_interval(10_000)
///     .with_cooling(CoolingSchedule::Linear)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleConfig {
    /// Final temperature, reached at the last step. Must be positive.
    pub temp_min: f64,

    /// Initial temperature. Must exceed `temp_min`.
    pub temp_max: f64,

    /// Number of proposals. 0 returns the starting assignment.
    pub steps: usize,

    /// Emit a progress record every this many steps. 0 = never.
    pub report_interval: usize,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Random seed. `None` draws one from OS entropy per scheduler.
    pub seed: Option<u64>,

    /// How the starting assignment is built.
    pub initial: InitialAssignment,

    /// Never re-propose the current regime of a stand that has an
    /// alternative.
    pub exclude_current: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            temp_min: 0.01,
            temp_max: 1000.0,
            steps: 10_000,
            report_interval: 1_000,
            cooling: CoolingSchedule::default(),
            seed: None,
            initial: InitialAssignment::default(),
            exclude_current: true,
        }
    }
}

impl ScheduleConfig {
    /// Temperatures scaled to the objective weights: `sum(weights) / spread`
    /// to `sum(weights) * spread`.
    pub fn for_weights(weights: &[f64], spread: f64) -> Self {
        let total: f64 = weights.iter().sum();
        Self::default().with_temperatures(total / spread, total * spread)
    }

    pub fn with_temperatures(mut self, temp_min: f64, temp_max: f64) -> Self {
        self.temp_min = temp_min;
        self.temp_max = temp_max;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_initial(mut self, initial: InitialAssignment) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_exclude_current(mut self, exclude: bool) -> Self {
        self.exclude_current = exclude;
        self
    }

    /// Temperature at 1-based `step`.
    pub fn temperature(&self, step: usize) -> f64 {
        self.cooling
            .temperature(step, self.steps, self.temp_max, self.temp_min)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let ok = self.temp_min.is_finite()
            && self.temp_max.is_finite()
            && self.temp_min > 0.0
            && self.temp_max > self.temp_min;
        if !ok {
            return Err(ConfigError::Temperature {
                min: self.temp_min,
                max: self.temp_max,
            }
            .into());
        }
        Ok(())
    }
}
