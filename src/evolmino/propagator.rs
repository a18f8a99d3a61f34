/*!

  The Evolmino theory propagator.

  At every quiescent point: every potential block holding a square must reach an arrow cell;
  no block may hold two arrow cells; along each arrow, every block must be obtainable by
  placing the previous block's exact shape (no rotation or reflection) inside the current
  block's expansion region; and the block sizes must admit the strictly increasing chain the
  arrow demands.

*/

use crate::{BoolVariableVector, Literal, LiteralVector};
use crate::simple_propagator::SubPropagator;
use super::board::{BoardManager, Cell, CellKind};
use super::problem::Problem;

const FOUR_NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

pub struct Propagator<'p> {
  problem: &'p Problem,
  board  : BoardManager<'p>,
}

impl<'p> Propagator<'p> {
  pub fn new(problem: &'p Problem, origin: crate::BoolVariable) -> Self {
    Propagator {
      problem,
      board: BoardManager::new(problem, origin),
    }
  }
}

impl<'p> SubPropagator for Propagator<'p> {
  fn related_variables(&self) -> BoolVariableVector {
    self.board.related_variables()
  }

  fn decide(&mut self, p: Literal) {
    self.board.decide(p);
  }

  fn undo(&mut self, p: Literal) {
    self.board.undo(p);
  }

  fn detect_inconsistency(&mut self) -> Option<LiteralVector> {
    let board = &self.board;
    let height = board.height();
    let width = board.width();
    let simple = board.compute_board_info_simple();

    // Every square must be able to reach an arrow cell.
    for i in 0..simple.potential_blocks.num_groups() {
      let mut square_cell = None;
      let mut has_arrow = false;
      for &(y, x) in simple.potential_blocks.group(i) {
        if self.problem.arrow_id(y, x) >= 0 {
          has_arrow = true;
        }
        if board.cell(y, x) == Cell::Square {
          square_cell = Some((y, x));
        }
      }
      if let Some((y, x)) = square_cell {
        if !has_arrow {
          let mut ret = board.reason_for_potential_block_boundary(&simple, i);
          ret.push(Literal::new(board.cell_var(y, x), false));
          return Some(ret);
        }
      }
    }

    // No block may contain two arrow cells.
    for i in 0..simple.blocks.num_groups() {
      let mut arrow_cell: Option<(i32, i32)> = None;
      for &(y, x) in simple.blocks.group(i) {
        if self.problem.arrow_id(y, x) >= 0 {
          match arrow_cell {
            None => arrow_cell = Some((y, x)),
            Some((ya, xa)) => {
              return Some(board.reason_for_path(y, x, ya, xa));
            }
          }
        }
      }
    }

    // Each arrow needs at least two blocks; that much is expressed as SAT clauses.

    let detailed = board.compute_board_info_detailed(&simple);

    // Extension check: walking an arrow, the previous block's shape must be placeable
    // (translation only) inside the current block's expansion region.
    for i in 0..self.problem.num_arrows() {
      let arrow = self.problem.arrow(i);
      let mut last_block_id: i32 = -1;

      for &(y, x) in arrow.iter() {
        if board.cell(y, x) != Cell::Square {
          continue;
        }
        debug_assert_eq!(detailed.cell_info.at(y, x).0, CellKind::Block);
        let block_id = detailed.cell_info.at(y, x).1;

        let mut allowed_floatings = vec![false; detailed.floatings.len()];
        for &(ny, nx) in &detailed.block_neighbors[block_id as usize] {
          for &(dy, dx) in &FOUR_NEIGHBORS {
            let (y2, x2) = (ny + dy, nx + dx);
            if !detailed.cell_info.contains(y2, x2) {
              continue;
            }
            let (kind, id) = *detailed.cell_info.at(y2, x2);
            if kind == CellKind::Floating {
              allowed_floatings[id as usize] = true;
            }
          }
        }

        if last_block_id != -1 {
          let last_block = &detailed.blocks[last_block_id as usize];
          assert!(!last_block.is_empty());

          let mut placeable = false;
          'placement: for py in 0..height {
            for px in 0..width {
              // Try to place `last_block` with its first cell on (py, px).
              let dy = py - last_block[0].0;
              let dx = px - last_block[0].1;
              let mut fits = true;

              for &(by, bx) in last_block.iter() {
                let (y2, x2) = (by + dy, bx + dx);
                if !detailed.cell_info.contains(y2, x2) {
                  fits = false;
                  break;
                }
                let (kind, id) = *detailed.cell_info.at(y2, x2);
                let ok = if kind == CellKind::Floating {
                  allowed_floatings[id as usize]
                } else {
                  id == block_id
                };
                if !ok {
                  fits = false;
                  break;
                }
              }

              if fits {
                placeable = true;
                break 'placement;
              }
            }
          }

          if !placeable {
            let mut ret = board.reason_for_block(&detailed, last_block_id);
            ret.push(Literal::new(board.cell_var(y, x), false));
            ret.extend(board.reason_for_adjacent_floating_boundary(&detailed, block_id));
            return Some(ret);
          }
        }

        last_block_id = block_id;
      }
    }

    // Size-bound arithmetic along each arrow.
    let mut potential_block_size = vec![0usize; detailed.blocks.len()];
    for i in 0..detailed.blocks.len() {
      let mut neighbor_floatings: Vec<i32> = Vec::new();
      for &(ny, nx) in &detailed.block_neighbors[i] {
        for &(dy, dx) in &FOUR_NEIGHBORS {
          let (y2, x2) = (ny + dy, nx + dx);
          if !detailed.cell_info.contains(y2, x2) {
            continue;
          }
          let (kind, id) = *detailed.cell_info.at(y2, x2);
          if kind == CellKind::Floating {
            neighbor_floatings.push(id);
          }
        }
      }
      neighbor_floatings.sort_unstable();
      neighbor_floatings.dedup();

      let mut ub = detailed.blocks[i].len() + detailed.block_neighbors[i].len();
      for f in neighbor_floatings {
        ub += detailed.floatings[f as usize].len();
      }
      potential_block_size[i] = ub;
    }

    for i in 0..self.problem.num_arrows() {
      let arrow = self.problem.arrow(i);
      let mut last_block_idx: Option<usize> = None; // index in `arrow`

      for j in 0..arrow.len() {
        if board.cell_at(arrow[j]) != Cell::Square {
          continue;
        }
        debug_assert_eq!(detailed.cell_info.at(arrow[j].0, arrow[j].1).0, CellKind::Block);

        if let Some(last_idx) = last_block_idx {
          let last_block_id = detailed.cell_info.at(arrow[last_idx].0, arrow[last_idx].1).1;
          let cur_block_id = detailed.cell_info.at(arrow[j].0, arrow[j].1).1;
          assert_ne!(last_block_id, cur_block_id);

          // Between the two blocks, at most every other undecided arrow cell can start a
          // further block.
          let mut gap_ub = 1;
          let mut k = last_idx + 2;
          while k + 1 < j {
            if board.cell_at(arrow[k]) == Cell::Undecided {
              gap_ub += 1;
              k += 1;
            }
            k += 1;
          }

          let last_lb = detailed.blocks[last_block_id as usize].len();
          let last_ub = potential_block_size[last_block_id as usize];
          let cur_lb = detailed.blocks[cur_block_id as usize].len();
          let cur_ub = potential_block_size[cur_block_id as usize];

          if cur_ub < last_lb + 1 {
            // The current block can never grow strictly beyond the previous one.
            let mut ret = board.reason_for_block(&detailed, last_block_id);
            ret.push(Literal::new(board.cell_var(arrow[j].0, arrow[j].1), false));
            ret.extend(board.reason_for_adjacent_floating_boundary(&detailed, cur_block_id));
            return Some(ret);
          }
          if last_ub + gap_ub < cur_lb {
            // The previous chain can never climb up to the current block's size.
            let mut ret = board.reason_for_block(&detailed, cur_block_id);
            ret.push(Literal::new(board.cell_var(arrow[last_idx].0, arrow[last_idx].1), false));
            ret.extend(board.reason_for_adjacent_floating_boundary(&detailed, last_block_id));
            let mut k = last_idx + 2;
            while k + 1 < j {
              if board.cell_at(arrow[k]) == Cell::Empty {
                ret.push(Literal::new(board.cell_var(arrow[k].0, arrow[k].1), true));
              }
              k += 1;
            }
            return Some(ret);
          }
        }

        last_block_idx = Some(j);
      }
    }

    None
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::SubPropagator;
  use crate::evolmino::ProblemCell;

  fn square(board_width: i32, y: i32, x: i32) -> Literal {
    Literal::new((y * board_width + x) as usize, false)
  }

  fn empty(board_width: i32, y: i32, x: i32) -> Literal {
    Literal::new((y * board_width + x) as usize, true)
  }

  #[test]
  fn orphan_square_is_detected() {
    // 1x5 strip, arrow over cells 0..2; a square at cell 4 walled off by an empty at
    // cell 3 can never reach the arrow.
    let mut problem = Problem::new(1, 5);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);
    let mut prop = Propagator::new(&problem, 0);
    prop.decide(square(5, 0, 4));
    prop.decide(empty(5, 0, 3));
    let reason = prop.detect_inconsistency().expect("orphan square");
    assert!(reason.contains(&square(5, 0, 4)));
    assert!(reason.contains(&empty(5, 0, 3)));
  }

  #[test]
  fn merged_arrow_cells_are_detected() {
    // Two arrows side by side; squares connecting their cells into one block.
    let mut problem = Problem::new(2, 2);
    problem.add_arrow(vec![(0, 0), (0, 1)]);
    problem.add_arrow(vec![(1, 0), (1, 1)]);
    let mut prop = Propagator::new(&problem, 0);
    prop.decide(square(2, 0, 0));
    prop.decide(square(2, 1, 0));
    let reason = prop.detect_inconsistency().expect("two arrow cells in one block");
    // The path between the two arrow cells, as Square literals.
    assert!(reason.contains(&square(2, 0, 0)));
    assert!(reason.contains(&square(2, 1, 0)));
    for lit in reason {
      assert!(!lit.sign());
    }
  }

  #[test]
  fn size_chain_violation_is_detected() {
    // 2x5 board, arrow along the top row. The first block is boxed in (upper bound 1),
    // but the block after the gap already has size 3: 1 + gap cannot climb to 3.
    let mut problem = Problem::new(2, 5);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
    let mut prop = Propagator::new(&problem, 0);
    prop.decide(square(5, 0, 0));
    prop.decide(empty(5, 0, 1));
    prop.decide(empty(5, 1, 0));
    prop.decide(square(5, 0, 2));
    prop.decide(square(5, 1, 2));
    prop.decide(square(5, 1, 3));
    let reason = prop.detect_inconsistency().expect("size chain violation");
    // The current block's squares and the previous block's anchor must be mentioned.
    assert!(reason.contains(&square(5, 0, 2)));
    assert!(reason.contains(&square(5, 1, 2)));
    assert!(reason.contains(&square(5, 1, 3)));
    assert!(reason.contains(&square(5, 0, 0)));
  }

  #[test]
  fn extension_mismatch_is_detected() {
    // 2x5 board, arrow along the top row. First block is a vertical domino; the second
    // block region is confined to the top row, where a vertical domino can never fit.
    let mut problem = Problem::new(2, 5);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
    let mut prop = Propagator::new(&problem, 0);
    prop.decide(square(5, 0, 0));
    prop.decide(square(5, 1, 0));
    prop.decide(empty(5, 0, 1));
    prop.decide(square(5, 0, 2));
    // Bottom row next to the second block is empty: the region of block 2 stays flat.
    prop.decide(empty(5, 1, 1));
    prop.decide(empty(5, 1, 2));
    prop.decide(empty(5, 1, 3));
    prop.decide(empty(5, 1, 4));
    let reason = prop.detect_inconsistency().expect("no placement for the previous shape");
    // The previous block's squares and the triggering square must be mentioned.
    assert!(reason.contains(&square(5, 0, 0)));
    assert!(reason.contains(&square(5, 1, 0)));
    assert!(reason.contains(&square(5, 0, 2)));
  }

  #[test]
  fn consistent_states_pass() {
    // 2x3 board, arrow along the top row; blocks {(0,0)} and {(0,2),(1,2)} grow 1 -> 2.
    let mut problem = Problem::new(2, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.set_cell(0, 2, ProblemCell::Square);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);
    let mut prop = Propagator::new(&problem, 0);
    assert!(prop.detect_inconsistency().is_none());
    prop.decide(square(3, 0, 0));
    assert!(prop.detect_inconsistency().is_none());
    prop.decide(empty(3, 0, 1));
    prop.decide(square(3, 0, 2));
    prop.decide(square(3, 1, 2));
    assert!(prop.detect_inconsistency().is_none());
  }

  #[test]
  fn stalled_chain_is_detected() {
    // 1x3 strip, arrow over everything, squares at both ends: the second block is capped
    // at size 1 and can never strictly outgrow the first.
    let mut problem = Problem::new(1, 3);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);
    let mut prop = Propagator::new(&problem, 0);
    prop.decide(square(3, 0, 0));
    prop.decide(empty(3, 0, 1));
    prop.decide(square(3, 0, 2));
    assert!(prop.detect_inconsistency().is_some());
  }
}
