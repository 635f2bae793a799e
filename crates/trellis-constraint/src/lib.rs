//! Anchor and chain solver for free-form containers.
//!
//! Turns pixel adjacency between the children of a container into symbolic
//! position constraints:
//! - Bias of a child between two reference edges
//! - Pairwise edge relations (touch, align, center, neighbor, baseline)
//! - Transitive closure from the parent outward, with literal fallbacks
//! - Chains and their distribution style
//! - Radial placement of floating layers

pub mod adjacency;
pub mod bias;
pub mod chain;
pub mod radial;
pub mod solver;

pub use adjacency::{candidates, Candidate, Frame, Member, RelationKind};
pub use bias::{axis_bias, bias, is_centered, CENTER_TOLERANCE};
pub use chain::{cumulative_percents, detect_chains, distribute, Chain, Distribution};
pub use radial::{angle, radius};
pub use solver::{solve_container, ContainerSolution, Placement};
