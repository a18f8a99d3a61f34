
mod clause;
mod errors;
mod grid;
mod group;
mod lifted_bool;
mod literal;
mod puzzlink;
mod simple_propagator;
mod solver;
mod watched;

pub mod doublechoco;
pub mod evolmino;
pub mod web;


// Re-exported items
pub use errors::Error;
pub use grid::Grid;
pub use group::GroupInfo;
pub use lifted_bool::LiftedBool;
pub use literal::{Literal, LiteralSet, LiteralVector};
pub use simple_propagator::{SimplePropagator, SubPropagator};
pub use solver::{Constraint, ConstraintRef, Solver, SolverConfig, SolverStatistics};


/// The name (index) of a SAT variable. Each variable `v` gives rise to two `Literal`s,
/// packed as `2*v` (plain) and `2*v + 1` (negated); a puzzle board allocates its border or
/// cell variables as one contiguous run starting at an origin.
pub type BoolVariable       = usize;
pub type BoolVariableVector = Vec<BoolVariable>;
pub type UIntSet            = bit_set::BitSet;
