/*!

  The Doublechoco solver driver: variable allocation, the SAT-level vertex clauses, the
  theory propagator, and the projection-unique refinement loop.

*/

use std::collections::BTreeMap;

use tracing::debug;

use crate::{BoolVariable, LiftedBool, Literal, SimplePropagator, Solver};
use crate::grid::Grid;
use super::balancer::Balancer;
use super::board::{BoardManager, Border};
use super::problem::Problem;
use super::propagator::Propagator;

#[derive(Copy, Clone, Debug, Default)]
pub struct Config {
  /// Register the black/white balance constraint. Off by default: the propagator subsumes
  /// it and the extra bridge analysis usually slows the search down.
  pub use_balancer: bool,
}

/// The projected answer: tri-state border grids of sizes H x (W-1) and (H-1) x W.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Answer {
  pub horizontal: Grid<Border>,
  pub vertical  : Grid<Border>,
}

fn add_constraints<'p>(problem: &'p Problem, solver: &mut Solver<'p>, origin: BoolVariable,
                       config: Config) -> bool {
  let height = problem.height();
  let width = problem.width();

  if !solver.add_constraint(Box::new(SimplePropagator::new(Propagator::new(problem, origin)))) {
    return false;
  }
  if config.use_balancer {
    if !solver.add_constraint(Box::new(Balancer::new(problem, origin))) {
      return false;
    }
  }

  // Walls cannot dead-end: of the four borders around an interior vertex, a wall implies
  // another wall.
  let board = BoardManager::new(problem, origin);
  for y in 0..height - 1 {
    for x in 0..width - 1 {
      let vars = [
        board.horizontal_var(y, x),
        board.horizontal_var(y + 1, x),
        board.vertical_var(y, x),
        board.vertical_var(y, x + 1),
      ];
      for i in 0..4 {
        let clause: Vec<Literal> =
          (0..4).map(|j| Literal::new(vars[j], i == j)).collect();
        if !solver.add_clause(&clause) {
          return false;
        }
      }
    }
  }

  true
}

fn read_borders(board: &BoardManager) -> Answer {
  let height = board.height();
  let width = board.width();
  let mut horizontal = Grid::new(height, width - 1, Border::Undecided);
  let mut vertical = Grid::new(height - 1, width, Border::Undecided);
  for y in 0..height {
    for x in 0..width - 1 {
      horizontal.set(y, x, board.horizontal(y, x));
    }
  }
  for y in 0..height - 1 {
    for x in 0..width {
      vertical.set(y, x, board.vertical(y, x));
    }
  }
  Answer { horizontal, vertical }
}

/// Find any single satisfying division of the board.
pub fn find_answer(problem: &Problem) -> Option<Answer> {
  let mut solver = Solver::new();
  let origin = BoardManager::allocate_variables(&mut solver, problem.height(), problem.width());

  if !add_constraints(problem, &mut solver, origin, Config::default()) {
    return None;
  }
  if !solver.solve() {
    return None;
  }

  let mut board = BoardManager::new(problem, origin);
  for v in board.related_variables() {
    board.decide(Literal::new(v, solver.model_value(v) == LiftedBool::False));
  }
  Some(read_borders(&board))
}

/// Solve and keep only the projection-unique part of the answer: every border still carrying
/// a value in the result is forced by the instance.
pub fn solve(problem: &Problem) -> Option<Answer> {
  solve_with_config(problem, Config::default())
}

pub fn solve_with_config(problem: &Problem, config: Config) -> Option<Answer> {
  let mut solver = Solver::new();
  let origin = BoardManager::allocate_variables(&mut solver, problem.height(), problem.width());

  if !add_constraints(problem, &mut solver, origin, config) {
    return None;
  }
  if !solver.solve() {
    return None;
  }

  let mut board = BoardManager::new(problem, origin);
  let mut assignment: BTreeMap<BoolVariable, bool> = board
    .related_variables()
    .into_iter()
    .map(|v| (v, solver.model_value(v) == LiftedBool::True))
    .collect();

  loop {
    let refutation: Vec<Literal> =
      assignment.iter().map(|(&var, &val)| Literal::new(var, val)).collect();
    solver.add_clause(&refutation);

    if !solver.solve() {
      break;
    }
    debug!(locked = assignment.len(), "projection refinement round");
    assignment.retain(|&var, val| (solver.model_value(var) == LiftedBool::True) == *val);
  }

  for (&var, &val) in &assignment {
    board.decide(Literal::new(var, !val));
  }
  Some(read_borders(&board))
}
