/*!

  The Evolmino solver driver: variable allocation, the SAT-level arrow clauses, the theory
  propagator, and the projection-unique refinement loop.

*/

use std::collections::BTreeMap;

use tracing::debug;

use crate::{BoolVariable, LiftedBool, Literal, SimplePropagator, Solver};
use crate::grid::Grid;
use super::board::{BoardManager, Cell};
use super::problem::{Problem, ProblemCell};
use super::propagator::Propagator;

/// The projected answer: a tri-state cell grid.
pub type Answer = Grid<Cell>;

fn add_constraints<'p>(problem: &'p Problem, solver: &mut Solver<'p>,
                       origin: BoolVariable) -> bool {
  let height = problem.height();
  let width = problem.width();

  if !solver.add_constraint(Box::new(SimplePropagator::new(Propagator::new(problem, origin)))) {
    return false;
  }

  // Initially placed black cells / squares.
  for y in 0..height {
    for x in 0..width {
      let var = origin + (y * width + x) as usize;
      let forced = match problem.cell(y, x) {
        ProblemCell::Black  => Some(Literal::new(var, true)),
        ProblemCell::Square => Some(Literal::new(var, false)),
        ProblemCell::Empty  => None,
      };
      if let Some(lit) = forced {
        if !solver.add_clause(&[lit]) {
          return false;
        }
      }
    }
  }

  for i in 0..problem.num_arrows() {
    let arrow = problem.arrow(i);

    // Adjacent cells of an arrow cannot both be squares.
    for j in 1..arrow.len() {
      let a = origin + (arrow[j - 1].0 * width + arrow[j - 1].1) as usize;
      let b = origin + (arrow[j].0 * width + arrow[j].1) as usize;
      if !solver.add_clause(&[Literal::new(a, true), Literal::new(b, true)]) {
        return false;
      }
    }

    // At least two squares on each arrow.
    for j in 0..arrow.len() {
      let clause: Vec<Literal> = (0..arrow.len())
        .filter(|&k| k != j)
        .map(|k| Literal::new(origin + (arrow[k].0 * width + arrow[k].1) as usize, false))
        .collect();
      if !solver.add_clause(&clause) {
        return false;
      }
    }
  }

  true
}

/// Find any single satisfying placement.
pub fn find_answer(problem: &Problem) -> Option<Answer> {
  let mut solver = Solver::new();
  let origin = BoardManager::allocate_variables(&mut solver, problem.height(), problem.width());

  if !add_constraints(problem, &mut solver, origin) {
    return None;
  }
  if !solver.solve() {
    return None;
  }

  let height = problem.height();
  let width = problem.width();
  let mut ret = Grid::new(height, width, Cell::Undecided);
  for y in 0..height {
    for x in 0..width {
      let var = origin + (y * width + x) as usize;
      if solver.model_value(var) == LiftedBool::True {
        ret.set(y, x, Cell::Square);
      } else {
        ret.set(y, x, Cell::Empty);
      }
    }
  }
  Some(ret)
}

/// Solve and keep only the projection-unique part of the answer.
pub fn solve(problem: &Problem) -> Option<Answer> {
  let mut solver = Solver::new();
  let origin = BoardManager::allocate_variables(&mut solver, problem.height(), problem.width());

  if !add_constraints(problem, &mut solver, origin) {
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

  let height = problem.height();
  let width = problem.width();
  let mut ret = Grid::new(height, width, Cell::Undecided);
  for y in 0..height {
    for x in 0..width {
      ret.set(y, x, board.cell(y, x));
    }
  }
  Some(ret)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strict_growth_refutes_tight_strip() {
    // 1x3 board, arrow over all cells, both endpoints forced Square: the second block is
    // capped at one cell and can never strictly outgrow the first, so there is no answer.
    let mut problem = Problem::new(1, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.set_cell(0, 2, ProblemCell::Square);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);
    assert!(solve(&problem).is_none());
  }

  #[test]
  fn deduces_growth_cell() {
    // 2x3 board, arrow along the top row, endpoints forced Square and (1,0) forced empty:
    // the first block is pinned to one cell, so the second must grow into (1,2). The cell
    // (1,1) stays genuinely open.
    let mut problem = Problem::new(2, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.set_cell(0, 2, ProblemCell::Square);
    problem.set_cell(1, 0, ProblemCell::Black);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);

    let answer = solve(&problem).expect("solvable");
    assert_eq!(answer.get(0, 0), Cell::Square);
    assert_eq!(answer.get(0, 1), Cell::Empty);
    assert_eq!(answer.get(0, 2), Cell::Square);
    assert_eq!(answer.get(1, 0), Cell::Empty);
    assert_eq!(answer.get(1, 2), Cell::Square);
    assert_eq!(answer.get(1, 1), Cell::Undecided);
  }

  #[test]
  fn find_answer_returns_full_assignment() {
    let mut problem = Problem::new(2, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.set_cell(0, 2, ProblemCell::Square);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);

    let answer = find_answer(&problem).expect("solvable");
    for y in 0..2 {
      for x in 0..3 {
        assert_ne!(answer.get(y, x), Cell::Undecided);
      }
    }
    assert_eq!(answer.get(0, 1), Cell::Empty);
  }

  #[test]
  fn arrow_with_too_few_squares_is_unsat() {
    // A 1x2 board whose arrow spans both cells: adjacent arrow cells cannot both carry
    // squares, but each arrow needs two, so the clauses alone are contradictory.
    let mut problem = Problem::new(1, 2);
    problem.add_arrow(vec![(0, 0), (0, 1)]);
    assert!(solve(&problem).is_none());
  }

  #[test]
  fn parse_and_solve_round_trip() {
    let mut problem = Problem::new(2, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.set_cell(0, 2, ProblemCell::Square);
    problem.set_cell(1, 0, ProblemCell::Black);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);

    let reparsed = Problem::parse_url(&problem.url()).expect("well-formed");
    assert_eq!(problem, reparsed);
    let answer = solve(&reparsed).expect("solvable");
    assert_eq!(answer.get(1, 2), Cell::Square);
  }
}
