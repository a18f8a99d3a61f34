/*!

  Evolmino: place squares on the grid so that square cells form blocks (4-connected
  components), every block contains exactly one arrow cell, and along each arrow the
  successive blocks are strict extensions of one another: each is obtained from the previous
  by adding at least one square, without rotation or reflection.

*/

mod board;
mod problem;
mod propagator;
mod solver;

pub use board::{BoardInfoDetailed, BoardInfoSimple, BoardManager, Cell, CellKind};
pub use problem::{Arrow, Problem, ProblemCell};
pub use propagator::Propagator;
pub use solver::{find_answer, solve, Answer};
