/*!

  The Doublechoco board as the propagators see it.

  A board of height H and width W uses H*(W-1) + (H-1)*W SAT variables: first the
  "horizontal" connections (between (y, x) and (y, x+1)), then the "vertical" ones (between
  (y, x) and (y+1, x)). A variable assigned true means there is a border ("wall") at the
  corresponding location; false means the two adjacent cells are connected.

*/

use std::collections::VecDeque;

use crate::{BoolVariable, BoolVariableVector, Literal, LiteralVector};
use crate::grid::Grid;
use crate::group::GroupInfo;
use crate::solver::Solver;
use super::problem::Problem;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Border {
  Undecided,
  Wall,
  Connected,
}

/// Connectivity snapshots of the board.
///
/// "unit": connected components of cells of one color (connections between differently
/// colored cells are ignored). "block": connected components of cells of both colors.
/// "potential" components are computed assuming every undecided border connects.
pub struct BoardInfo {
  pub units          : GroupInfo,
  pub blocks         : GroupInfo,
  pub potential_units: GroupInfo,
}

pub struct BoardManager<'p> {
  height    : i32,
  width     : i32,
  problem   : &'p Problem,
  origin    : BoolVariable,
  horizontal: Vec<Border>,
  vertical  : Vec<Border>,
  decisions : LiteralVector,
}

impl<'p> BoardManager<'p> {
  pub fn new(problem: &'p Problem, origin: BoolVariable) -> Self {
    let height = problem.height();
    let width = problem.width();
    BoardManager {
      height,
      width,
      problem,
      origin,
      horizontal: vec![Border::Undecided; (height * (width - 1)) as usize],
      vertical  : vec![Border::Undecided; ((height - 1) * width) as usize],
      decisions : Vec::new(),
    }
  }

  pub fn height(&self) -> i32 {
    self.height
  }

  pub fn width(&self) -> i32 {
    self.width
  }

  pub fn problem(&self) -> &Problem {
    self.problem
  }

  pub fn horizontal(&self, y: i32, x: i32) -> Border {
    assert!(0 <= y && y < self.height && 0 <= x && x < self.width - 1);
    self.horizontal[(y * (self.width - 1) + x) as usize]
  }

  pub fn vertical(&self, y: i32, x: i32) -> Border {
    assert!(0 <= y && y < self.height - 1 && 0 <= x && x < self.width);
    self.vertical[(y * self.width + x) as usize]
  }

  pub fn horizontal_var(&self, y: i32, x: i32) -> BoolVariable {
    assert!(0 <= y && y < self.height && 0 <= x && x < self.width - 1);
    self.origin + (y * (self.width - 1) + x) as usize
  }

  pub fn vertical_var(&self, y: i32, x: i32) -> BoolVariable {
    assert!(0 <= y && y < self.height - 1 && 0 <= x && x < self.width);
    self.origin + (self.height * (self.width - 1) + y * self.width + x) as usize
  }

  fn num_border_vars(&self) -> usize {
    (self.height * (self.width - 1) + (self.height - 1) * self.width) as usize
  }

  pub fn decide(&mut self, lit: Literal) {
    let v = lit.var();
    assert!(v >= self.origin);
    let ofs = v - self.origin;
    assert!(ofs < self.num_border_vars());
    let new_value = if lit.sign() { Border::Connected } else { Border::Wall };

    let n_horizontal = (self.height * (self.width - 1)) as usize;
    if ofs < n_horizontal {
      assert_eq!(self.horizontal[ofs], Border::Undecided);
      self.horizontal[ofs] = new_value;
    } else {
      assert_eq!(self.vertical[ofs - n_horizontal], Border::Undecided);
      self.vertical[ofs - n_horizontal] = new_value;
    }
    self.decisions.push(lit);
  }

  pub fn undo(&mut self, lit: Literal) {
    assert_eq!(self.decisions.pop(), Some(lit));

    let ofs = lit.var() - self.origin;
    assert!(ofs < self.num_border_vars());

    let n_horizontal = (self.height * (self.width - 1)) as usize;
    if ofs < n_horizontal {
      self.horizontal[ofs] = Border::Undecided;
    } else {
      self.vertical[ofs - n_horizontal] = Border::Undecided;
    }
  }

  pub fn related_variables(&self) -> BoolVariableVector {
    (0..self.num_border_vars()).map(|i| self.origin + i).collect()
  }

  pub fn allocate_variables(solver: &mut Solver, height: i32, width: i32) -> BoolVariable {
    let n_vars = height * (width - 1) + (height - 1) * width;
    let head = solver.new_var();
    for _ in 1..n_vars {
      solver.new_var();
    }
    head
  }

  // region Reason builders

  /// Literals asserting every connection inside block `block_id`: their conjunction implies
  /// the block contains at least these cells.
  pub fn reason_for_block(&self, info: &BoardInfo, block_id: i32) -> LiteralVector {
    let mut ret = Vec::new();
    for &(y, x) in info.blocks.group(block_id) {
      if y < self.height - 1
        && info.blocks.group_id(y + 1, x) == block_id
        && self.vertical(y, x) == Border::Connected
      {
        ret.push(Literal::new(self.vertical_var(y, x), true));
      }
      if x < self.width - 1
        && info.blocks.group_id(y, x + 1) == block_id
        && self.horizontal(y, x) == Border::Connected
      {
        ret.push(Literal::new(self.horizontal_var(y, x), true));
      }
    }
    ret
  }

  /// Same as `reason_for_block`, restricted to the same-color connections of a unit.
  pub fn reason_for_unit(&self, info: &BoardInfo, unit_id: i32) -> LiteralVector {
    let mut ret = Vec::new();
    for &(y, x) in info.units.group(unit_id) {
      if y < self.height - 1
        && info.units.group_id(y + 1, x) == unit_id
        && self.vertical(y, x) == Border::Connected
      {
        ret.push(Literal::new(self.vertical_var(y, x), true));
      }
      if x < self.width - 1
        && info.units.group_id(y, x + 1) == unit_id
        && self.horizontal(y, x) == Border::Connected
      {
        ret.push(Literal::new(self.horizontal_var(y, x), true));
      }
    }
    ret
  }

  /// The wall literals capping a potential unit: their conjunction prevents the unit from
  /// expanding into adjacent same-color cells.
  pub fn reason_for_potential_unit_boundary(&self, info: &BoardInfo,
                                            potential_unit_id: i32) -> LiteralVector {
    let mut ret = Vec::new();
    for &(y, x) in info.potential_units.group(potential_unit_id) {
      if y > 0
        && info.potential_units.group_id(y - 1, x) != potential_unit_id
        && self.problem.color(y, x) == self.problem.color(y - 1, x)
        && self.vertical(y - 1, x) == Border::Wall
      {
        ret.push(Literal::new(self.vertical_var(y - 1, x), false));
      }
      if y < self.height - 1
        && info.potential_units.group_id(y + 1, x) != potential_unit_id
        && self.problem.color(y, x) == self.problem.color(y + 1, x)
        && self.vertical(y, x) == Border::Wall
      {
        ret.push(Literal::new(self.vertical_var(y, x), false));
      }
      if x > 0
        && info.potential_units.group_id(y, x - 1) != potential_unit_id
        && self.problem.color(y, x) == self.problem.color(y, x - 1)
        && self.horizontal(y, x - 1) == Border::Wall
      {
        ret.push(Literal::new(self.horizontal_var(y, x - 1), false));
      }
      if x < self.width - 1
        && info.potential_units.group_id(y, x + 1) != potential_unit_id
        && self.problem.color(y, x) == self.problem.color(y, x + 1)
        && self.horizontal(y, x) == Border::Wall
      {
        ret.push(Literal::new(self.horizontal_var(y, x), false));
      }
    }
    ret
  }

  /// The Connected literals along some path of decided connections from (ya, xa) to
  /// (yb, xb). The two cells must already be connected.
  pub fn reason_for_path(&self, ya: i32, xa: i32, yb: i32, xb: i32) -> LiteralVector {
    let mut from: Grid<(i32, i32)> = Grid::new(self.height, self.width, (-1, -1));
    from.set(ya, xa, (-2, -2));

    let mut queue = VecDeque::new();
    queue.push_back((ya, xa));
    while let Some((y, x)) = queue.pop_front() {
      if y == yb && x == xb {
        break;
      }

      if y > 0 && self.vertical(y - 1, x) == Border::Connected && from.get(y - 1, x).0 == -1 {
        from.set(y - 1, x, (y, x));
        queue.push_back((y - 1, x));
      }
      if y < self.height - 1
        && self.vertical(y, x) == Border::Connected
        && from.get(y + 1, x).0 == -1
      {
        from.set(y + 1, x, (y, x));
        queue.push_back((y + 1, x));
      }
      if x > 0 && self.horizontal(y, x - 1) == Border::Connected && from.get(y, x - 1).0 == -1 {
        from.set(y, x - 1, (y, x));
        queue.push_back((y, x - 1));
      }
      if x < self.width - 1
        && self.horizontal(y, x) == Border::Connected
        && from.get(y, x + 1).0 == -1
      {
        from.set(y, x + 1, (y, x));
        queue.push_back((y, x + 1));
      }
    }

    assert_ne!(from.get(yb, xb).0, -1);

    let mut ret = Vec::new();
    let (mut y, mut x) = (yb, xb);
    while !(y == ya && x == xa) {
      let (y_from, x_from) = from.get(y, x);
      if y == y_from {
        ret.push(Literal::new(self.horizontal_var(y, x.min(x_from)), true));
      } else {
        ret.push(Literal::new(self.vertical_var(y.min(y_from), x), true));
      }
      y = y_from;
      x = x_from;
    }
    ret
  }

  /// The most straightforward reason: every known decision is relevant.
  pub fn calc_reason_simple(&self, p: Option<Literal>, extra: Option<Literal>,
                            out_reason: &mut LiteralVector) {
    out_reason.extend(self.decisions.iter().copied());
    if let Some(e) = extra {
      assert!(p.is_none());
      out_reason.push(e);
    }
  }

  // endregion

  // region Connectivity

  fn compute_connected_components(&self, ignore_color: bool, is_potential: bool) -> GroupInfo {
    let mut group_id: Grid<i32> = Grid::new(self.height, self.width, -1);
    let mut stack: Vec<(i32, i32)> = Vec::new();
    let mut id_last = 0;

    for y0 in 0..self.height {
      for x0 in 0..self.width {
        if group_id.get(y0, x0) != -1 {
          continue;
        }
        group_id.set(y0, x0, id_last);
        stack.push((y0, x0));

        while let Some((y, x)) = stack.pop() {
          let mut maybe_traverse = |y2: i32, x2: i32, border: Border,
                                    group_id: &mut Grid<i32>, stack: &mut Vec<(i32, i32)>| {
            if !ignore_color && self.problem.color(y2, x2) != self.problem.color(y, x) {
              return;
            }
            if border == Border::Connected || (is_potential && border == Border::Undecided) {
              if group_id.get(y2, x2) == -1 {
                group_id.set(y2, x2, id_last);
                stack.push((y2, x2));
              }
            }
          };

          if y > 0 {
            maybe_traverse(y - 1, x, self.vertical(y - 1, x), &mut group_id, &mut stack);
          }
          if y < self.height - 1 {
            maybe_traverse(y + 1, x, self.vertical(y, x), &mut group_id, &mut stack);
          }
          if x > 0 {
            maybe_traverse(y, x - 1, self.horizontal(y, x - 1), &mut group_id, &mut stack);
          }
          if x < self.width - 1 {
            maybe_traverse(y, x + 1, self.horizontal(y, x), &mut group_id, &mut stack);
          }
        }
        id_last += 1;
      }
    }

    GroupInfo::new(group_id)
  }

  pub fn compute_board_info(&self) -> BoardInfo {
    BoardInfo {
      units          : self.compute_connected_components(false, false),
      blocks         : self.compute_connected_components(true, false),
      potential_units: self.compute_connected_components(false, true),
    }
  }

  // endregion
}

impl<'p> std::fmt::Display for BoardManager<'p> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for y in 0..=(self.height - 1) * 2 {
      for x in 0..=(self.width - 1) * 2 {
        if y % 2 == 0 && x % 2 == 0 {
          write!(f, " ")?;
        } else if y % 2 == 1 && x % 2 == 1 {
          write!(f, "+")?;
        } else if y % 2 == 1 {
          match self.vertical(y / 2, x / 2) {
            Border::Undecided => write!(f, "?")?,
            Border::Wall      => write!(f, "-")?,
            Border::Connected => write!(f, " ")?,
          }
        } else {
          match self.horizontal(y / 2, x / 2) {
            Border::Undecided => write!(f, "?")?,
            Border::Wall      => write!(f, "|")?,
            Border::Connected => write!(f, " ")?,
          }
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn checker_2x2() -> Problem {
    let mut problem = Problem::new(2, 2);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 1);
    problem.set_color(1, 0, 1);
    problem.set_color(1, 1, 0);
    problem
  }

  #[test]
  fn variable_translation_is_contiguous() {
    let mut problem = Problem::new(3, 4);
    for y in 0..3 {
      for x in 0..4 {
        problem.set_color(y, x, 0);
      }
    }
    let board = BoardManager::new(&problem, 10);
    assert_eq!(board.horizontal_var(0, 0), 10);
    assert_eq!(board.horizontal_var(2, 2), 10 + 2 * 3 + 2);
    assert_eq!(board.vertical_var(0, 0), 10 + 9);
    assert_eq!(board.vertical_var(1, 3), 10 + 9 + 7);
    assert_eq!(board.related_variables().len(), 9 + 8);
  }

  #[test]
  fn decide_and_undo_restore_tristate() {
    let problem = checker_2x2();
    let mut board = BoardManager::new(&problem, 0);
    let wall = Literal::new(board.horizontal_var(0, 0), false);
    let conn = Literal::new(board.vertical_var(0, 1), true);

    board.decide(wall);
    board.decide(conn);
    assert_eq!(board.horizontal(0, 0), Border::Wall);
    assert_eq!(board.vertical(0, 1), Border::Connected);

    board.undo(conn);
    assert_eq!(board.vertical(0, 1), Border::Undecided);
    board.undo(wall);
    assert_eq!(board.horizontal(0, 0), Border::Undecided);
  }

  #[test]
  fn connectivity_snapshots() {
    let problem = checker_2x2();
    let mut board = BoardManager::new(&problem, 0);
    // Wall between the rows, connections inside each row.
    board.decide(Literal::new(board.vertical_var(0, 0), false));
    board.decide(Literal::new(board.vertical_var(0, 1), false));
    board.decide(Literal::new(board.horizontal_var(0, 0), true));
    board.decide(Literal::new(board.horizontal_var(1, 0), true));

    let info = board.compute_board_info();
    // Two blocks (the rows)...
    assert_eq!(info.blocks.group_id(0, 0), info.blocks.group_id(0, 1));
    assert_ne!(info.blocks.group_id(0, 0), info.blocks.group_id(1, 0));
    // ...and four units (each cell its own color region).
    assert_ne!(info.units.group_id(0, 0), info.units.group_id(0, 1));
    assert_ne!(info.units.group_id(1, 0), info.units.group_id(1, 1));
    // Potential units ignore the undecided state but respect walls and colors: the walls
    // here separate rows, so (0,0) and (1,1) stay apart despite equal colors.
    assert_ne!(info.potential_units.group_id(0, 0), info.potential_units.group_id(1, 1));
  }

  #[test]
  fn reason_for_path_returns_true_connected_literals() {
    let mut problem = Problem::new(1, 4);
    for x in 0..4 {
      problem.set_color(0, x, 0);
    }
    let mut board = BoardManager::new(&problem, 0);
    for x in 0..3 {
      board.decide(Literal::new(board.horizontal_var(0, x), true));
    }
    let reason = board.reason_for_path(0, 0, 0, 3);
    assert_eq!(reason.len(), 3);
    for lit in reason {
      assert!(lit.sign(), "path reasons must be Connected literals");
      assert_eq!(board.horizontal(0, (lit.var()) as i32), Border::Connected);
    }
  }

}
