/*!

  The Doublechoco theory propagator.

  At every quiescent point it recomputes the connectivity snapshots and checks, per block:
  unit multiplicity, clue agreement, size feasibility against the potential units, and
  finally whether each unit's shape can still be matched by an opposite-color unit in some
  neighboring potential unit (under any of the 8 symmetries).

*/

use std::collections::BTreeSet;

use crate::{BoolVariableVector, Literal, LiteralSet, LiteralVector};
use crate::simple_propagator::SubPropagator;
use super::board::{BoardManager, Border};
use super::problem::Problem;
use super::shape::Shape;

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
    let height = self.problem.height();
    let width = self.problem.width();
    let board = &self.board;
    let info = board.compute_board_info();

    // Block-local checks: units, clues, sizes.
    for i in 0..info.blocks.num_groups() {
      let mut num = -1;
      let mut has_num = [false, false];
      let mut size_by_color = [0usize, 0usize];
      let mut potential_unit_id = [-1, -1];

      for &(y, x) in info.blocks.group(i) {
        let c = self.problem.color(y, x) as usize;
        let pu_id = info.potential_units.group_id(y, x);
        if potential_unit_id[c] == -1 {
          potential_unit_id[c] = pu_id;
        } else if potential_unit_id[c] != pu_id {
          // Multiple units of the same color in a block.
          let mut ret = board.reason_for_block(&info, i);
          ret.extend(board.reason_for_potential_unit_boundary(&info, pu_id));
          return Some(ret);
        }

        size_by_color[c] += 1;
        let n = self.problem.num(y, x);
        if n > 0 {
          has_num[c] = true;
          if num == -1 {
            num = n;
          } else if num != n {
            // Two distinct clue numbers in a block.
            return Some(board.reason_for_block(&info, i));
          }
        }
      }

      // A color's reachable area is already smaller than the other color's current size.
      for c in 0..2 {
        let pu = potential_unit_id[c];
        if pu != -1 && info.potential_units.group(pu).len() < size_by_color[1 - c] {
          let mut ret = board.reason_for_block(&info, i);
          ret.extend(board.reason_for_potential_unit_boundary(&info, pu));
          return Some(ret);
        }
      }

      if num != -1 {
        // A unit already grew beyond the clue.
        if (num as usize) < size_by_color[0] || (num as usize) < size_by_color[1] {
          return Some(board.reason_for_block(&info, i));
        }

        // The clue is unreachable within the potential unit.
        for c in 0..2 {
          let pu = potential_unit_id[c];
          if pu != -1 && num as usize > info.potential_units.group(pu).len() {
            let mut ret = board.reason_for_potential_unit_boundary(&info, pu);
            if !has_num[c] {
              ret.extend(board.reason_for_block(&info, i));
            }
            return Some(ret);
          }
        }
      }
    }

    // Shape check: each unit must still find a placement of its own shape (under some
    // symmetry) inside a neighboring potential unit of the opposite color.
    let mut adjacent_potential_units_set: BTreeSet<(i32, i32)> = BTreeSet::new();
    for y in 0..height {
      for x in 0..width {
        if y < height - 1
          && self.problem.color(y, x) != self.problem.color(y + 1, x)
          && board.vertical(y, x) != Border::Wall
        {
          let i = info.potential_units.group_id(y, x);
          let j = info.potential_units.group_id(y + 1, x);
          adjacent_potential_units_set.insert((i, j));
          adjacent_potential_units_set.insert((j, i));
        }
        if x < width - 1
          && self.problem.color(y, x) != self.problem.color(y, x + 1)
          && board.horizontal(y, x) != Border::Wall
        {
          let i = info.potential_units.group_id(y, x);
          let j = info.potential_units.group_id(y, x + 1);
          adjacent_potential_units_set.insert((i, j));
          adjacent_potential_units_set.insert((j, i));
        }
      }
    }
    let mut adjacent_potential_units =
      vec![Vec::new(); info.potential_units.num_groups() as usize];
    for &(i, j) in &adjacent_potential_units_set {
      adjacent_potential_units[i as usize].push(j);
    }

    for i in 0..info.units.num_groups() {
      let mut connections = Vec::new();
      for &(y, x) in info.units.group(i) {
        if y < height - 1 && info.units.group_id(y + 1, x) == i {
          connections.push((y * 2 + 1, x * 2));
        }
        if x < width - 1 && info.units.group_id(y, x + 1) == i {
          connections.push((y * 2, x * 2 + 1));
        }
      }

      let one_cell = info.units.group(i)[0];
      let potential_unit_id = info.potential_units.group_id(one_cell.0, one_cell.1);
      let mut origins: Vec<(i32, i32)> = Vec::new();
      for &g in &adjacent_potential_units[potential_unit_id as usize] {
        origins.extend(info.potential_units.group(g).iter().copied());
      }

      let shape = Shape::new(info.units.group(i).to_vec(), connections);
      let transforms = shape.enumerate_transforms();

      let mut found = false;
      let mut blockers = LiteralSet::new();
      'transforms: for t in &transforms {
        for &(origin_y, origin_x) in &origins {
          let mut invalid = false;
          let mut blocker_cand = None;

          for &(dy, dx) in &t.connections {
            let py = origin_y * 2 + dy;
            let px = origin_x * 2 + dx;

            if !(0 <= py && py <= (height - 1) * 2 && 0 <= px && px <= (width - 1) * 2) {
              invalid = true;
              blocker_cand = None;
              break;
            }
            if self.problem.color(py >> 1, px >> 1)
              != self.problem.color((py + 1) >> 1, (px + 1) >> 1)
            {
              invalid = true;
              blocker_cand = None;
              break;
            }
            if (py & 1) == 1 {
              if board.vertical(py >> 1, px >> 1) == Border::Wall {
                invalid = true;
                blocker_cand = Some(Literal::new(board.vertical_var(py >> 1, px >> 1), false));
              }
            } else {
              if board.horizontal(py >> 1, px >> 1) == Border::Wall {
                invalid = true;
                blocker_cand = Some(Literal::new(board.horizontal_var(py >> 1, px >> 1), false));
              }
            }
          }

          if !invalid {
            found = true;
            break 'transforms;
          }
          if let Some(blocker) = blocker_cand {
            blockers.insert(blocker);
          }
        }
      }

      if !found {
        let mut reason = blockers;
        reason.extend(board.reason_for_unit(&info, i));
        reason.extend(board.reason_for_potential_unit_boundary(&info, potential_unit_id));
        for &g in &adjacent_potential_units[potential_unit_id as usize] {
          reason.extend(board.reason_for_potential_unit_boundary(&info, g));
        }
        // Walls towards differently colored cells whose potential unit never became a
        // neighbor: without them the reachable area could have been wider.
        for &(y, x) in info.potential_units.group(potential_unit_id) {
          if y > 0
            && board.vertical(y - 1, x) == Border::Wall
            && self.problem.color(y, x) != self.problem.color(y - 1, x)
            && !adjacent_potential_units_set
              .contains(&(potential_unit_id, info.potential_units.group_id(y - 1, x)))
          {
            reason.insert(Literal::new(board.vertical_var(y - 1, x), false));
          }
          if y < height - 1
            && board.vertical(y, x) == Border::Wall
            && self.problem.color(y, x) != self.problem.color(y + 1, x)
            && !adjacent_potential_units_set
              .contains(&(potential_unit_id, info.potential_units.group_id(y + 1, x)))
          {
            reason.insert(Literal::new(board.vertical_var(y, x), false));
          }
          if x > 0
            && board.horizontal(y, x - 1) == Border::Wall
            && self.problem.color(y, x) != self.problem.color(y, x - 1)
            && !adjacent_potential_units_set
              .contains(&(potential_unit_id, info.potential_units.group_id(y, x - 1)))
          {
            reason.insert(Literal::new(board.horizontal_var(y, x - 1), false));
          }
          if x < width - 1
            && board.horizontal(y, x) == Border::Wall
            && self.problem.color(y, x) != self.problem.color(y, x + 1)
            && !adjacent_potential_units_set
              .contains(&(potential_unit_id, info.potential_units.group_id(y, x + 1)))
          {
            reason.insert(Literal::new(board.horizontal_var(y, x), false));
          }
        }

        return Some(reason.to_vector());
      }
    }

    None
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::SubPropagator;

  fn decide_wall(p: &mut Propagator, var: crate::BoolVariable) {
    SubPropagator::decide(p, Literal::new(var, false));
  }

  fn decide_connected(p: &mut Propagator, var: crate::BoolVariable) {
    SubPropagator::decide(p, Literal::new(var, true));
  }

  #[test]
  fn clue_overflow_is_detected() {
    // 1x4 strip, colors 0011, clue 1 at (0, 0): connecting the two color-0 cells makes the
    // color-0 unit larger than the clue allows.
    let mut problem = Problem::new(1, 4);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 0);
    problem.set_color(0, 2, 1);
    problem.set_color(0, 3, 1);
    problem.set_num(0, 0, 1);

    let mut prop = Propagator::new(&problem, 0);
    let h00 = 0; // horizontal border between (0,0) and (0,1)
    decide_connected(&mut prop, h00);
    let reason = prop.detect_inconsistency().expect("clue overflow");
    assert!(!reason.is_empty());
    // The reason must mention the connection that built the oversized unit.
    assert!(reason.contains(&Literal::new(h00, true)));
  }

  #[test]
  fn unreachable_clue_is_detected() {
    // 1x4 strip, colors 0011, clue 2 at (0, 0): walling off (0,1) caps the color-0
    // potential unit at a single cell.
    let mut problem = Problem::new(1, 4);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 0);
    problem.set_color(0, 2, 1);
    problem.set_color(0, 3, 1);
    problem.set_num(0, 0, 2);

    let mut prop = Propagator::new(&problem, 0);
    decide_wall(&mut prop, 0);
    let reason = prop.detect_inconsistency().expect("unreachable clue");
    assert!(reason.contains(&Literal::new(0, false)));
  }

  #[test]
  fn walled_in_unit_has_no_partner() {
    // 1x2 board, colors 01, wall between the cells: the white unit can never pair with a
    // black unit, and the reason is exactly the isolating wall.
    let mut problem = Problem::new(1, 2);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 1);
    let mut prop = Propagator::new(&problem, 0);
    decide_wall(&mut prop, 0);
    let reason = prop.detect_inconsistency().expect("isolated unit");
    assert_eq!(reason, vec![Literal::new(0, false)]);
  }

  #[test]
  fn block_size_imbalance_is_detected() {
    // 2x3 board:
    //   0 0 1
    //   1 1 1
    // Connecting everything makes one block with 2 white and 4 black cells; the white
    // potential unit can never reach the black unit's size.
    let mut problem = Problem::new(2, 3);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 0);
    problem.set_color(0, 2, 1);
    problem.set_color(1, 0, 1);
    problem.set_color(1, 1, 1);
    problem.set_color(1, 2, 1);

    let mut prop = Propagator::new(&problem, 0);
    let board = BoardManager::new(&problem, 0);
    for y in 0..2 {
      for x in 0..2 {
        decide_connected(&mut prop, board.horizontal_var(y, x));
      }
    }
    for x in 0..3 {
      decide_connected(&mut prop, board.vertical_var(0, x));
    }
    assert!(prop.detect_inconsistency().is_some());
  }

  #[test]
  fn consistent_partial_state_passes() {
    let mut problem = Problem::new(1, 2);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 1);
    let mut prop = Propagator::new(&problem, 0);
    assert!(prop.detect_inconsistency().is_none());
    decide_connected(&mut prop, 0);
    assert!(prop.detect_inconsistency().is_none());
  }
}
