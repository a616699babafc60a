//! Multi-run driver.
//!
//! Simulated annealing is a heuristic, so a single run says little about
//! how good or how stable its answer is. [`MultiRunner`] executes many
//! independent runs of the same problem, each with its own random
//! stream and private state, and [`MultiRunSummary`] reduces the
//! collected results once every run has joined.

mod runner;
mod summary;

pub use runner::MultiRunner;
pub use summary::MultiRunSummary;
