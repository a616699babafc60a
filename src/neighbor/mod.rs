//! Neighbor generation and the adjacency constraint filter.
//!
//! A move reassigns one stand to another regime from its feasible set,
//! so every assignment reached by the search stays feasible. Moves on
//! stands with declared neighbors then pass through the adjacency
//! filter, which either rejects them outright or reports how many
//! conflicting pairs they add, depending on the [`ViolationPolicy`].

mod adjacency;
mod generator;

pub use adjacency::{
    Adjacency, AdjacencyConstraint, AdjacencyGraph, AdjacencyRule, ConcurrentActivity, Placement,
    ViolationPolicy,
};
pub use generator::{InitialAssignment, Move, NeighborGenerator, Proposal};
