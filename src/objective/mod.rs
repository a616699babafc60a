//! Multi-objective scoring.
//!
//! Each outcome variable gets an [`Objective`]: a [`Strategy`], a weight,
//! and for target tracking a trajectory. An assignment is scored by
//! summing the chosen trajectories of all stands into an [`OutcomeTable`]
//! and adding up the weighted strategy scores of its columns.
//!
//! | Strategy              | Score                         |
//! |-----------------------|-------------------------------|
//! | `cumulative_maximize` | `sum(series)`                 |
//! | `cumulative_minimize` | `-sum(series)`                |
//! | `evenflow`            | `-stddev(series)`             |
//! | `evenflow_target`     | `-sum((series - target)^2)`   |

mod evaluator;
pub mod strategy;
mod types;

pub use evaluator::{evaluate, Evaluator};
pub use strategy::Strategy;
pub use types::{Objective, OutcomeTable};
