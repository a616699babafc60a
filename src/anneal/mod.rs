//! Simulated annealing over stand assignments.
//!
//! Each step reassigns one stand, scores the change incrementally and
//! applies the Metropolis criterion on a higher-is-better score: moves
//! that do not lower the score are always taken, others with probability
//! `exp(delta / T)`. The temperature falls from `temp_max` at the first
//! step to `temp_min` at the last, following a fixed
//! [`CoolingSchedule`].
//!
//! A run is strictly sequential. Parallelism lives one level up, in
//! [`crate::multi`].
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast Computing Machines"

mod config;
mod runner;
mod types;

pub use config::{CoolingSchedule, ScheduleConfig};
pub use runner::{Annealer, Scheduler};
pub use types::{NoReport, Progress, Reporter, RunState, ScheduleResult};
