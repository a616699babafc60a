//! Run states, progress records and results.

use std::sync::mpsc;

use crate::objective::OutcomeTable;

/// Lifecycle of a single annealing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No assignment yet.
    Initializing,
    /// Proposals remain in the step budget.
    Searching,
    /// Budget exhausted or cancelled.
    Terminated,
}

/// Snapshot emitted every `report_interval` steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progress {
    /// Stream (run) number that produced the record.
    pub stream: u64,
    pub step: usize,
    pub temperature: f64,
    pub score: f64,
    pub best_score: f64,
}

/// Receiver of progress records.
///
/// Called from inside the search loop, so implementations must not
/// block.
pub trait Reporter: Send + Sync {
    fn report(&self, progress: &Progress);
}

/// Discards progress records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReport;

impl Reporter for NoReport {
    fn report(&self, _progress: &Progress) {}
}

/// Unbounded channel: never blocks. A closed receiver is ignored.
impl Reporter for mpsc::Sender<Progress> {
    fn report(&self, progress: &Progress) {
        let _ = self.send(*progress);
    }
}

/// Bounded channel: records are dropped rather than waiting for space.
impl Reporter for mpsc::SyncSender<Progress> {
    fn report(&self, progress: &Progress) {
        let _ = self.try_send(*progress);
    }
}

/// Outcome of one annealing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleResult {
    /// Score of the best assignment, recomputed from scratch. Includes
    /// the adjacency penalty when one is configured.
    pub best_score: f64,

    /// Best assignment: one mgmt index per stand.
    pub assignment: Vec<usize>,

    /// Aggregated `[period][variable]` outcomes of the best assignment.
    pub outcome_table: OutcomeTable,

    /// Seed shared by all runs of the scheduler.
    pub seed: u64,

    /// Stream number of this run.
    pub stream: u64,

    /// Steps actually executed.
    pub steps_run: usize,

    /// Accepted proposals, including improving ones.
    pub accepted: usize,

    /// Proposals that produced a new best.
    pub improved: usize,

    /// Proposals discarded by the adjacency filter.
    pub rejected_by_adjacency: usize,

    /// Conflicting neighbor pairs in the best assignment.
    pub violations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Progress records in emission order.
    pub history: Vec<Progress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(step: usize) -> Progress {
        Progress {
            stream: 0,
            step,
            temperature: 1.0,
            score: 2.0,
            best_score: 3.0,
        }
    }

    #[test]
    fn test_sender_reporter() {
        let (tx, rx) = mpsc::channel();
        tx.report(&progress(10));
        tx.report(&progress(20));
        let steps: Vec<usize> = rx.try_iter().map(|p| p.step).collect();
        assert_eq!(steps, vec![10, 20]);
    }

    #[test]
    fn test_sync_sender_drops_when_full() {
        let (tx, rx) = mpsc::sync_channel(1);
        tx.report(&progress(1));
        tx.report(&progress(2));
        let steps: Vec<usize> = rx.try_iter().map(|p| p.step).collect();
        assert_eq!(steps, vec![1]);
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        tx.report(&progress(1));
        NoReport.report(&progress(1));
    }
}
