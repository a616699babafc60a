//! Spatial adjacency constraints between stands.
//!
//! An [`AdjacencyConstraint`] pairs a neighbor graph with a violation
//! rule and a policy. Before a run starts it is compiled against the
//! axis map into index-based neighbor lists ([`Adjacency`]).
//!
//! The graph is treated as undirected: declaring `a -> b` also makes `b`
//! a neighbor of `a`. Rules are expected to be symmetric.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::data::{AxisMap, OutcomeArray, StandId};
use crate::error::{ConfigError, Result};

/// Neighbor lists keyed by stand identifier. A missing entry means the
/// stand has no constrained neighbors.
pub type AdjacencyGraph = HashMap<StandId, Vec<StandId>>;

/// A stand together with the regime chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub stand: usize,
    pub mgmt: usize,
}

/// Decides whether two neighboring placements conflict.
pub trait AdjacencyRule: Send + Sync {
    /// Returns `true` if `a` and `b` may not be chosen together.
    fn violates(&self, outcomes: &OutcomeArray, a: Placement, b: Placement) -> bool;

    /// Checks the rule against the outcome array dimensions.
    fn validate(&self, _variables: usize) -> Result<()> {
        Ok(())
    }
}

impl<F> AdjacencyRule for F
where
    F: Fn(&OutcomeArray, Placement, Placement) -> bool + Send + Sync,
{
    fn violates(&self, outcomes: &OutcomeArray, a: Placement, b: Placement) -> bool {
        self(outcomes, a, b)
    }
}

/// Neighbors conflict when, in the same period, both exceed `threshold`
/// on `variable`. With a harvest variable and threshold `0.0` this is the
/// usual "no adjacent harvests in the same period" rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcurrentActivity {
    pub variable: usize,
    pub threshold: f64,
}

impl ConcurrentActivity {
    pub fn new(variable: usize, threshold: f64) -> Self {
        Self {
            variable,
            threshold,
        }
    }
}

impl AdjacencyRule for ConcurrentActivity {
    fn violates(&self, outcomes: &OutcomeArray, a: Placement, b: Placement) -> bool {
        let variables = outcomes.n_variables();
        let ta = outcomes.trajectory(a.stand, a.mgmt);
        let tb = outcomes.trajectory(b.stand, b.mgmt);
        ta.iter()
            .zip(tb)
            .skip(self.variable)
            .step_by(variables.max(1))
            .any(|(&x, &y)| x > self.threshold && y > self.threshold)
    }

    fn validate(&self, variables: usize) -> Result<()> {
        if self.variable >= variables {
            return Err(ConfigError::RuleVariable {
                variable: self.variable,
                variables,
            }
            .into());
        }
        Ok(())
    }
}

/// What happens to a proposal that violates the rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViolationPolicy {
    /// Discard the proposal before it is evaluated.
    #[default]
    Reject,

    /// Subtract `weight` from the score per violating neighbor pair.
    Penalize { weight: f64 },
}

/// Neighbor graph, rule and policy, keyed by stand identifier.
#[derive(Clone)]
pub struct AdjacencyConstraint {
    pub graph: AdjacencyGraph,
    pub rule: Arc<dyn AdjacencyRule>,
    pub policy: ViolationPolicy,
}

impl fmt::Debug for AdjacencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyConstraint")
            .field("graph", &self.graph)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AdjacencyConstraint {
    pub fn new(graph: AdjacencyGraph, rule: impl AdjacencyRule + 'static) -> Self {
        Self {
            graph,
            rule: Arc::new(rule),
            policy: ViolationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves stand ids to indices and validates rule and policy.
    ///
    /// Returns `None` when the graph declares no neighbor pairs.
    pub fn compile(&self, axis_map: &AxisMap, variables: usize) -> Result<Option<Adjacency>> {
        self.rule.validate(variables)?;
        if let ViolationPolicy::Penalize { weight } = self.policy {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::PenaltyWeight(weight).into());
            }
        }

        let mut index: HashMap<StandId, usize> = HashMap::with_capacity(axis_map.standids.len());
        for (i, &id) in axis_map.standids.iter().enumerate() {
            // first occurrence wins, as in `AxisMap::stand_index`
            index.entry(id).or_insert(i);
        }
        let resolve = |id: StandId| {
            index
                .get(&id)
                .copied()
                .ok_or(ConfigError::UnknownStand(id))
        };

        let mut neighbors = vec![Vec::new(); axis_map.standids.len()];
        for (&id, ids) in &self.graph {
            let a = resolve(id)?;
            for &other in ids {
                let b = resolve(other)?;
                if a != b {
                    neighbors[a].push(b);
                    neighbors[b].push(a);
                }
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        if neighbors.iter().all(Vec::is_empty) {
            return Ok(None);
        }
        Ok(Some(Adjacency {
            neighbors,
            rule: Arc::clone(&self.rule),
            policy: self.policy,
        }))
    }
}

/// Index-resolved adjacency used inside a run.
#[derive(Clone)]
pub struct Adjacency {
    neighbors: Vec<Vec<usize>>,
    rule: Arc<dyn AdjacencyRule>,
    policy: ViolationPolicy,
}

impl fmt::Debug for Adjacency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adjacency")
            .field("neighbors", &self.neighbors)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Adjacency {
    pub fn policy(&self) -> ViolationPolicy {
        self.policy
    }

    pub fn neighbors(&self, stand: usize) -> &[usize] {
        &self.neighbors[stand]
    }

    /// Number of neighbors whose current regime conflicts with `mgmt`
    /// placed on `stand`.
    pub fn conflicts(
        &self,
        outcomes: &OutcomeArray,
        assignment: &[usize],
        stand: usize,
        mgmt: usize,
    ) -> usize {
        let placed = Placement { stand, mgmt };
        self.neighbors[stand]
            .iter()
            .filter(|&&n| {
                self.rule.violates(
                    outcomes,
                    placed,
                    Placement {
                        stand: n,
                        mgmt: assignment[n],
                    },
                )
            })
            .count()
    }

    /// Number of conflicting neighbor pairs in a whole assignment.
    pub fn total_violations(&self, outcomes: &OutcomeArray, assignment: &[usize]) -> usize {
        (0..self.neighbors.len())
            .map(|stand| {
                let placed = Placement {
                    stand,
                    mgmt: assignment[stand],
                };
                self.neighbors[stand]
                    .iter()
                    .filter(|&&n| n > stand)
                    .filter(|&&n| {
                        self.rule.violates(
                            outcomes,
                            placed,
                            Placement {
                                stand: n,
                                mgmt: assignment[n],
                            },
                        )
                    })
                    .count()
            })
            .sum()
    }

    /// Score penalty for `violations` conflicting pairs (zero under
    /// [`ViolationPolicy::Reject`]).
    pub fn penalty(&self, violations: usize) -> f64 {
        match self.policy {
            ViolationPolicy::Reject => 0.0,
            ViolationPolicy::Penalize { weight } => weight * violations as f64,
        }
    }
}
