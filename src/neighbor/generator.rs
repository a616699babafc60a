//! Single-stand move proposals.

use rand::Rng;

use super::adjacency::{Adjacency, ViolationPolicy};
use crate::data::OutcomeArray;

/// How the starting assignment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialAssignment {
    /// A uniformly random feasible regime per stand.
    #[default]
    Random,

    /// The first listed feasible regime of every stand.
    FirstFeasible,
}

/// Reassignment of one stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub stand: usize,
    pub from: usize,
    pub to: usize,
}

impl Move {
    /// A move that keeps the current regime.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    pub fn apply(&self, assignment: &mut [usize]) {
        assignment[self.stand] = self.to;
    }
}

/// Outcome of the constraint filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proposal {
    /// Worth evaluating. `conflicts_added` is the change in the number of
    /// conflicting neighbor pairs (never positive under
    /// [`ViolationPolicy::Reject`]).
    Candidate { mv: Move, conflicts_added: i64 },

    /// Conflicts with a neighbor under [`ViolationPolicy::Reject`].
    Rejected(Move),
}

/// Proposes feasible single-stand moves, filtered by adjacency.
#[derive(Debug, Clone)]
pub struct NeighborGenerator<'a> {
    valid_mgmts: &'a [Vec<usize>],
    outcomes: &'a OutcomeArray,
    adjacency: Option<&'a Adjacency>,
    exclude_current: bool,
}

impl<'a> NeighborGenerator<'a> {
    pub fn new(
        valid_mgmts: &'a [Vec<usize>],
        outcomes: &'a OutcomeArray,
        adjacency: Option<&'a Adjacency>,
        exclude_current: bool,
    ) -> Self {
        Self {
            valid_mgmts,
            outcomes,
            adjacency,
            exclude_current,
        }
    }

    /// Builds a feasible starting assignment.
    pub fn initial<R: Rng>(&self, mode: InitialAssignment, rng: &mut R) -> Vec<usize> {
        self.valid_mgmts
            .iter()
            .map(|feasible| match mode {
                InitialAssignment::FirstFeasible => feasible[0],
                InitialAssignment::Random => feasible[rng.random_range(0..feasible.len())],
            })
            .collect()
    }

    /// Under [`ViolationPolicy::Reject`], moves each conflicting stand to
    /// its first feasible regime that conflicts with no neighbor, in stand
    /// order. Stands without such a regime are left as they are.
    pub fn repair(&self, assignment: &mut [usize]) {
        let Some(adjacency) = self.adjacency else {
            return;
        };
        if adjacency.policy() != ViolationPolicy::Reject {
            return;
        }
        for stand in 0..assignment.len() {
            if adjacency.conflicts(self.outcomes, assignment, stand, assignment[stand]) == 0 {
                continue;
            }
            let free = self.valid_mgmts[stand]
                .iter()
                .copied()
                .find(|&m| adjacency.conflicts(self.outcomes, assignment, stand, m) == 0);
            if let Some(mgmt) = free {
                assignment[stand] = mgmt;
            }
        }
    }

    /// Picks a stand uniformly, then a regime uniformly from its feasible
    /// set.
    ///
    /// With `exclude_current` the current regime is skipped whenever the
    /// stand has an alternative; a stand with a single feasible regime
    /// yields a no-op move. Returns `None` only when there are no stands.
    pub fn propose<R: Rng>(&self, assignment: &[usize], rng: &mut R) -> Option<Move> {
        if assignment.is_empty() {
            return None;
        }
        let stand = rng.random_range(0..assignment.len());
        let feasible = &self.valid_mgmts[stand];
        let from = assignment[stand];

        let to = if self.exclude_current && feasible.len() > 1 {
            let pos = feasible.iter().position(|&m| m == from);
            match pos {
                Some(pos) => {
                    let mut i = rng.random_range(0..feasible.len() - 1);
                    if i >= pos {
                        i += 1;
                    }
                    feasible[i]
                }
                None => feasible[rng.random_range(0..feasible.len())],
            }
        } else {
            feasible[rng.random_range(0..feasible.len())]
        };

        Some(Move { stand, from, to })
    }

    /// Applies the adjacency policy to `mv` against the current neighbors.
    pub fn filter(&self, assignment: &[usize], mv: Move) -> Proposal {
        let Some(adjacency) = self.adjacency else {
            return Proposal::Candidate {
                mv,
                conflicts_added: 0,
            };
        };
        if mv.is_noop() {
            return Proposal::Candidate {
                mv,
                conflicts_added: 0,
            };
        }

        match adjacency.policy() {
            ViolationPolicy::Reject => {
                if adjacency.conflicts(self.outcomes, assignment, mv.stand, mv.to) > 0 {
                    Proposal::Rejected(mv)
                } else {
                    // may clear a conflict left over from the initial assignment
                    let before = adjacency.conflicts(self.outcomes, assignment, mv.stand, mv.from);
                    Proposal::Candidate {
                        mv,
                        conflicts_added: -(before as i64),
                    }
                }
            }
            ViolationPolicy::Penalize { .. } => {
                let after = adjacency.conflicts(self.outcomes, assignment, mv.stand, mv.to);
                let before = adjacency.conflicts(self.outcomes, assignment, mv.stand, mv.from);
                Proposal::Candidate {
                    mv,
                    conflicts_added: after as i64 - before as i64,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AxisMap, Mgmt};
    use crate::neighbor::{AdjacencyConstraint, AdjacencyGraph, ConcurrentActivity};
    use crate::random::create_rng;

    fn outcomes(stands: usize, mgmts: usize) -> OutcomeArray {
        // regime m harvests (value 1) in period m only
        let stand: Vec<Vec<Vec<f64>>> = (0..mgmts)
            .map(|m| (0..mgmts).map(|p| vec![if p == m { 1.0 } else { 0.0 }]).collect())
            .collect();
        OutcomeArray::from_nested(vec![stand; stands]).unwrap()
    }

    #[test]
    fn test_initial_first_feasible() {
        let valid = vec![vec![2, 0], vec![1]];
        let arr = outcomes(2, 3);
        let gen = NeighborGenerator::new(&valid, &arr, None, true);
        let mut rng = create_rng(42, 0);
        assert_eq!(gen.initial(InitialAssignment::FirstFeasible, &mut rng), vec![2, 1]);
    }

    #[test]
    fn test_initial_random_is_feasible() {
        let valid = vec![vec![2, 0], vec![1], vec![0, 1, 2]];
        let arr = outcomes(3, 3);
        let gen = NeighborGenerator::new(&valid, &arr, None, true);
        let mut rng = create_rng(42, 0);
        for _ in 0..50 {
            let a = gen.initial(InitialAssignment::Random, &mut rng);
            for (s, m) in a.iter().enumerate() {
                assert!(valid[s].contains(m));
            }
        }
    }

    #[test]
    fn test_propose_stays_feasible_and_excludes_current() {
        let valid = vec![vec![0, 2], vec![1], vec![0, 1, 2]];
        let arr = outcomes(3, 3);
        let gen = NeighborGenerator::new(&valid, &arr, None, true);
        let mut rng = create_rng(7, 0);
        let mut assignment = vec![0, 1, 2];

        for _ in 0..500 {
            let mv = gen.propose(&assignment, &mut rng).unwrap();
            assert!(valid[mv.stand].contains(&mv.to));
            if valid[mv.stand].len() > 1 {
                assert_ne!(mv.from, mv.to);
            } else {
                assert!(mv.is_noop());
            }
            mv.apply(&mut assignment);
        }
    }

    #[test]
    fn test_propose_with_current_allowed() {
        let valid = vec![vec![0, 1]];
        let arr = outcomes(1, 2);
        let gen = NeighborGenerator::new(&valid, &arr, None, false);
        let mut rng = create_rng(1, 0);
        let noops = (0..400)
            .filter(|_| gen.propose(&[0], &mut rng).unwrap().is_noop())
            .count();
        assert!(noops > 100 && noops < 300, "noops = {noops}");
    }

    #[test]
    fn test_propose_no_stands() {
        let valid: Vec<Vec<usize>> = vec![];
        let arr = OutcomeArray::from_vec([0, 0, 0, 0], vec![]).unwrap();
        let gen = NeighborGenerator::new(&valid, &arr, None, true);
        assert!(gen.propose(&[], &mut create_rng(0, 0)).is_none());
    }

    fn adjacency(policy: ViolationPolicy) -> crate::neighbor::Adjacency {
        let axis = AxisMap::new(vec![0, 1], vec![Mgmt::new(0, 0), Mgmt::new(1, 0)]);
        AdjacencyConstraint::new(AdjacencyGraph::from([(0, vec![1])]), ConcurrentActivity::new(0, 0.5))
            .with_policy(policy)
            .compile(&axis, 1)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_filter_reject() {
        let valid = vec![vec![0, 1], vec![0, 1]];
        let arr = outcomes(2, 2);
        let adj = adjacency(ViolationPolicy::Reject);
        let gen = NeighborGenerator::new(&valid, &arr, Some(&adj), true);

        let clash = Move { stand: 0, from: 1, to: 0 };
        assert_eq!(gen.filter(&[1, 0], clash), Proposal::Rejected(clash));

        let fine = Move { stand: 0, from: 0, to: 1 };
        assert_eq!(
            gen.filter(&[0, 0], fine),
            Proposal::Candidate { mv: fine, conflicts_added: -1 }
        );
    }

    #[test]
    fn test_repair_clears_conflicts() {
        let valid = vec![vec![0, 1], vec![0, 1]];
        let arr = outcomes(2, 2);
        let adj = adjacency(ViolationPolicy::Reject);
        let gen = NeighborGenerator::new(&valid, &arr, Some(&adj), true);

        let mut assignment = vec![0, 0];
        gen.repair(&mut assignment);
        assert_eq!(assignment, vec![1, 0]);
        assert_eq!(adj.total_violations(&arr, &assignment), 0);
    }

    #[test]
    fn test_repair_ignored_when_penalizing() {
        let valid = vec![vec![0, 1], vec![0, 1]];
        let arr = outcomes(2, 2);
        let adj = adjacency(ViolationPolicy::Penalize { weight: 1.0 });
        let gen = NeighborGenerator::new(&valid, &arr, Some(&adj), true);

        let mut assignment = vec![0, 0];
        gen.repair(&mut assignment);
        assert_eq!(assignment, vec![0, 0]);
    }

    #[test]
    fn test_filter_penalize_counts_delta() {
        let valid = vec![vec![0, 1], vec![0, 1]];
        let arr = outcomes(2, 2);
        let adj = adjacency(ViolationPolicy::Penalize { weight: 1.0 });
        let gen = NeighborGenerator::new(&valid, &arr, Some(&adj), true);

        let into = Move { stand: 0, from: 1, to: 0 };
        assert_eq!(
            gen.filter(&[1, 0], into),
            Proposal::Candidate { mv: into, conflicts_added: 1 }
        );
        let out = Move { stand: 0, from: 0, to: 1 };
        assert_eq!(
            gen.filter(&[0, 0], out),
            Proposal::Candidate { mv: out, conflicts_added: -1 }
        );
    }
}
