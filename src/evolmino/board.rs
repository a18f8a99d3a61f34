/*!

  The Evolmino board as the propagator sees it.

  A board of height H and width W uses H*W SAT variables, one per cell, row-major from the
  origin. A variable assigned true means the cell carries a square; false means it stays
  empty.

*/

use std::collections::VecDeque;

use crate::{BoolVariable, BoolVariableVector, Literal, LiteralSet, LiteralVector};
use crate::grid::Grid;
use crate::group::GroupInfo;
use crate::solver::Solver;
use super::problem::Problem;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Cell {
  Undecided,
  Square,
  Empty,
}

/// Connectivity snapshots over square cells.
///
/// A block is a connected component of squares; potential blocks treat undecided cells as
/// squares as well.
pub struct BoardInfoSimple {
  pub blocks          : GroupInfo,
  pub potential_blocks: GroupInfo,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CellKind {
  /// Decided empty, or an undecided cell wedged between two different blocks.
  Empty,
  /// A square cell in a component that contains an arrow cell.
  Block,
  /// An undecided cell adjacent to exactly one block.
  BlockNeighbor,
  /// Any other square or undecided cell, component-labeled.
  Floating,
}

/// Per-cell classification refining `BoardInfoSimple`. Must not be built while some block
/// contains more than one arrow cell.
pub struct BoardInfoDetailed {
  pub cell_info      : Grid<(CellKind, i32)>,
  pub blocks         : Vec<Vec<(i32, i32)>>,
  pub block_neighbors: Vec<Vec<(i32, i32)>>,
  pub floatings      : Vec<Vec<(i32, i32)>>,
}

const FOUR_NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

pub struct BoardManager<'p> {
  height   : i32,
  width    : i32,
  problem  : &'p Problem,
  origin   : BoolVariable,
  cells    : Vec<Cell>,
  decisions: LiteralVector,
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
      cells    : vec![Cell::Undecided; (height * width) as usize],
      decisions: Vec::new(),
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

  pub fn cell(&self, y: i32, x: i32) -> Cell {
    assert!(0 <= y && y < self.height && 0 <= x && x < self.width);
    self.cells[(y * self.width + x) as usize]
  }

  pub fn cell_at(&self, p: (i32, i32)) -> Cell {
    self.cell(p.0, p.1)
  }

  pub fn cell_var(&self, y: i32, x: i32) -> BoolVariable {
    assert!(0 <= y && y < self.height && 0 <= x && x < self.width);
    self.origin + (y * self.width + x) as usize
  }

  pub fn decide(&mut self, lit: Literal) {
    let v = lit.var();
    assert!(v >= self.origin);
    let ofs = v - self.origin;
    assert!(ofs < (self.height * self.width) as usize);
    let new_value = if lit.sign() { Cell::Empty } else { Cell::Square };

    assert_eq!(self.cells[ofs], Cell::Undecided);
    self.cells[ofs] = new_value;
    self.decisions.push(lit);
  }

  pub fn undo(&mut self, lit: Literal) {
    assert_eq!(self.decisions.pop(), Some(lit));

    let ofs = lit.var() - self.origin;
    assert!(ofs < (self.height * self.width) as usize);
    self.cells[ofs] = Cell::Undecided;
  }

  pub fn related_variables(&self) -> BoolVariableVector {
    (0..(self.height * self.width) as usize).map(|i| self.origin + i).collect()
  }

  /// The most straightforward reason: every known decision is relevant.
  pub fn reason_naive(&self) -> LiteralVector {
    self.decisions.clone()
  }

  pub fn allocate_variables(solver: &mut Solver, height: i32, width: i32) -> BoolVariable {
    let n_vars = height * width;
    let head = solver.new_var();
    for _ in 1..n_vars {
      solver.new_var();
    }
    head
  }

  // region Reason builders

  /// The Square literals along some path of squares from (ya, xa) to (yb, xb). The two
  /// cells must already be connected through squares.
  pub fn reason_for_path(&self, ya: i32, xa: i32, yb: i32, xb: i32) -> LiteralVector {
    assert_eq!(self.cell(ya, xa), Cell::Square);
    assert_eq!(self.cell(yb, xb), Cell::Square);

    let mut bfs: Grid<(i32, i32)> = Grid::new(self.height, self.width, (-1, -1));
    bfs.set(ya, xa, (-2, -2));
    let mut queue = VecDeque::new();
    queue.push_back((ya, xa));

    while let Some((y, x)) = queue.pop_front() {
      if y == yb && x == xb {
        break;
      }
      for &(dy, dx) in &FOUR_NEIGHBORS {
        let (y2, x2) = (y + dy, x + dx);
        if !bfs.contains(y2, x2) {
          continue;
        }
        if self.cell(y2, x2) != Cell::Square {
          continue;
        }
        if bfs.get(y2, x2).0 != -1 {
          continue;
        }
        bfs.set(y2, x2, (y, x));
        queue.push_back((y2, x2));
      }
    }

    assert_ne!(bfs.get(yb, xb).0, -1);

    let mut ret = Vec::new();
    let (mut y, mut x) = (yb, xb);
    while y >= 0 && x >= 0 {
      ret.push(Literal::new(self.cell_var(y, x), false));
      let from = bfs.get(y, x);
      y = from.0;
      x = from.1;
    }
    ret
  }

  /// The Empty literals capping a potential block.
  pub fn reason_for_potential_block_boundary(&self, info: &BoardInfoSimple,
                                             potential_block_id: i32) -> LiteralVector {
    let mut set = LiteralSet::new();
    for &(y, x) in info.potential_blocks.group(potential_block_id) {
      for &(dy, dx) in &FOUR_NEIGHBORS {
        let (y2, x2) = (y + dy, x + dx);
        if !(0 <= y2 && y2 < self.height && 0 <= x2 && x2 < self.width) {
          continue;
        }
        if self.cell(y2, x2) == Cell::Empty {
          set.insert(Literal::new(self.cell_var(y2, x2), true));
        }
      }
    }
    set.to_vector()
  }

  /// The Square literals of all cells of a block: their conjunction implies the block
  /// contains at least this shape.
  pub fn reason_for_block(&self, info: &BoardInfoDetailed, block_id: i32) -> LiteralVector {
    info.blocks[block_id as usize]
      .iter()
      .map(|&(y, x)| Literal::new(self.cell_var(y, x), false))
      .collect()
  }

  /// The literals bounding the expansion region of a block (the block itself, its
  /// neighbors, and floatings adjacent to those neighbors): decided-Empty cells on the rim
  /// contribute their Empty literal, cells of other blocks their Square literal, and cells
  /// wedged between two blocks the Square literals of the blocks pinching them.
  pub fn reason_for_adjacent_floating_boundary(&self, info: &BoardInfoDetailed,
                                               block_id: i32) -> LiteralVector {
    let mut in_region = Grid::new(self.height, self.width, false);
    let mut region: Vec<(i32, i32)> = Vec::new();

    let mut add_region = |cells: &[(i32, i32)], in_region: &mut Grid<bool>,
                          region: &mut Vec<(i32, i32)>| {
      for &(y, x) in cells {
        if !in_region.get(y, x) {
          in_region.set(y, x, true);
          region.push((y, x));
        }
      }
    };

    add_region(&info.blocks[block_id as usize], &mut in_region, &mut region);
    add_region(&info.block_neighbors[block_id as usize], &mut in_region, &mut region);
    for &(y, x) in &info.block_neighbors[block_id as usize] {
      for &(dy, dx) in &FOUR_NEIGHBORS {
        let (y2, x2) = (y + dy, x + dx);
        if !in_region.contains(y2, x2) {
          continue;
        }
        let (kind, id) = *info.cell_info.at(y2, x2);
        if kind == CellKind::Floating {
          add_region(&info.floatings[id as usize], &mut in_region, &mut region);
        }
      }
    }

    let mut set = LiteralSet::new();
    for &(y, x) in &region {
      for &(dy, dx) in &FOUR_NEIGHBORS {
        let (y2, x2) = (y + dy, x + dx);
        if !in_region.contains(y2, x2) || in_region.get(y2, x2) {
          continue;
        }
        match self.cell(y2, x2) {
          Cell::Empty => {
            set.insert(Literal::new(self.cell_var(y2, x2), true));
          }
          Cell::Square => {
            // A square outside the region belongs to a different block.
            set.insert(Literal::new(self.cell_var(y2, x2), false));
          }
          Cell::Undecided => {
            // Excluded because two different blocks pinch it; pin those squares.
            for &(dy2, dx2) in &FOUR_NEIGHBORS {
              let (y3, x3) = (y2 + dy2, x2 + dx2);
              if !in_region.contains(y3, x3) {
                continue;
              }
              if info.cell_info.at(y3, x3).0 == CellKind::Block {
                set.insert(Literal::new(self.cell_var(y3, x3), false));
              }
            }
          }
        }
      }
    }
    set.to_vector()
  }

  // endregion

  // region Connectivity

  fn compute_connected_components(&self, is_potential: bool) -> GroupInfo {
    let mut group_id: Grid<i32> = Grid::new(self.height, self.width, -1);
    let mut stack: Vec<(i32, i32)> = Vec::new();
    let mut id_last = 0;

    let included = |cell: Cell| {
      if is_potential {
        cell != Cell::Empty
      } else {
        cell == Cell::Square
      }
    };

    for y0 in 0..self.height {
      for x0 in 0..self.width {
        if group_id.get(y0, x0) != -1 || !included(self.cell(y0, x0)) {
          continue;
        }
        group_id.set(y0, x0, id_last);
        stack.push((y0, x0));

        while let Some((y, x)) = stack.pop() {
          for &(dy, dx) in &FOUR_NEIGHBORS {
            let (y2, x2) = (y + dy, x + dx);
            if !group_id.contains(y2, x2) {
              continue;
            }
            if group_id.get(y2, x2) == -1 && included(self.cell(y2, x2)) {
              group_id.set(y2, x2, id_last);
              stack.push((y2, x2));
            }
          }
        }
        id_last += 1;
      }
    }

    GroupInfo::new(group_id)
  }

  pub fn compute_board_info_simple(&self) -> BoardInfoSimple {
    BoardInfoSimple {
      blocks          : self.compute_connected_components(false),
      potential_blocks: self.compute_connected_components(true),
    }
  }

  /// Classify every cell as Empty / Block / BlockNeighbor / Floating. Blocks are numbered
  /// independently of `BoardInfoSimple` (only components containing an arrow cell count).
  pub fn compute_board_info_detailed(&self, info: &BoardInfoSimple) -> BoardInfoDetailed {
    // id -2 stands for "not classified yet".
    let mut cell_info: Grid<(CellKind, i32)> =
      Grid::new(self.height, self.width, (CellKind::Empty, -2));
    let mut blocks: Vec<Vec<(i32, i32)>> = Vec::new();

    for y in 0..self.height {
      for x in 0..self.width {
        if self.cell(y, x) == Cell::Empty {
          cell_info.set(y, x, (CellKind::Empty, -1));
        }
      }
    }

    for i in 0..info.blocks.num_groups() {
      let mut has_arrow = false;
      for &(y, x) in info.blocks.group(i) {
        if self.problem.arrow_id(y, x) >= 0 {
          assert!(!has_arrow, "a block may contain at most one arrow cell");
          has_arrow = true;
        }
      }
      if has_arrow {
        let mut group = Vec::new();
        for &(y, x) in info.blocks.group(i) {
          cell_info.set(y, x, (CellKind::Block, blocks.len() as i32));
          group.push((y, x));
        }
        blocks.push(group);
      }
    }

    let mut block_neighbors: Vec<Vec<(i32, i32)>> = vec![Vec::new(); blocks.len()];
    for y in 0..self.height {
      for x in 0..self.width {
        if self.cell(y, x) != Cell::Undecided {
          continue;
        }

        let mut neighbor_block_id = -1;
        for &(dy, dx) in &FOUR_NEIGHBORS {
          let (y2, x2) = (y + dy, x + dx);
          if !cell_info.contains(y2, x2) {
            continue;
          }
          let (kind, id) = *cell_info.at(y2, x2);
          if kind == CellKind::Block && id >= 0 {
            if neighbor_block_id == -1 {
              neighbor_block_id = id;
            } else if neighbor_block_id != id {
              neighbor_block_id = -2;
            }
          }
        }

        if neighbor_block_id >= 0 {
          cell_info.set(y, x, (CellKind::BlockNeighbor, neighbor_block_id));
          block_neighbors[neighbor_block_id as usize].push((y, x));
        } else if neighbor_block_id == -2 {
          cell_info.set(y, x, (CellKind::Empty, -1));
        }
      }
    }

    // The remaining cells form the floating components.
    let mut num_floatings = 0;
    for y0 in 0..self.height {
      for x0 in 0..self.width {
        if cell_info.at(y0, x0).1 != -2 {
          continue;
        }
        let mut stack = vec![(y0, x0)];
        cell_info.set(y0, x0, (CellKind::Floating, num_floatings));
        while let Some((y, x)) = stack.pop() {
          for &(dy, dx) in &FOUR_NEIGHBORS {
            let (y2, x2) = (y + dy, x + dx);
            if !cell_info.contains(y2, x2) {
              continue;
            }
            if cell_info.at(y2, x2).1 == -2 {
              cell_info.set(y2, x2, (CellKind::Floating, num_floatings));
              stack.push((y2, x2));
            }
          }
        }
        num_floatings += 1;
      }
    }

    let mut floatings: Vec<Vec<(i32, i32)>> = vec![Vec::new(); num_floatings as usize];
    for y in 0..self.height {
      for x in 0..self.width {
        let (kind, id) = *cell_info.at(y, x);
        if kind == CellKind::Floating {
          floatings[id as usize].push((y, x));
        }
      }
    }

    BoardInfoDetailed { cell_info, blocks, block_neighbors, floatings }
  }

  // endregion
}

impl<'p> std::fmt::Display for BoardManager<'p> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for y in 0..self.height {
      for x in 0..self.width {
        match self.cell(y, x) {
          Cell::Undecided => write!(f, ". ")?,
          Cell::Square    => write!(f, "# ")?,
          Cell::Empty     => write!(f, "x ")?,
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
  use crate::evolmino::ProblemCell;

  fn board_3x3_with_arrow(decisions: &[((i32, i32), bool)]) -> (Problem, Vec<Literal>) {
    let mut problem = Problem::new(3, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);
    let lits = decisions
      .iter()
      .map(|&((y, x), square)| Literal::new((y * 3 + x) as usize, !square))
      .collect();
    (problem, lits)
  }

  #[test]
  fn decide_and_undo_restore_tristate() {
    let (problem, lits) = board_3x3_with_arrow(&[((0, 0), true), ((1, 1), false)]);
    let mut board = BoardManager::new(&problem, 0);
    for &lit in &lits {
      board.decide(lit);
    }
    assert_eq!(board.cell(0, 0), Cell::Square);
    assert_eq!(board.cell(1, 1), Cell::Empty);
    assert_eq!(board.cell(2, 2), Cell::Undecided);

    for &lit in lits.iter().rev() {
      board.undo(lit);
    }
    assert_eq!(board.cell(0, 0), Cell::Undecided);
    assert_eq!(board.cell(1, 1), Cell::Undecided);
  }

  #[test]
  fn classifies_blocks_neighbors_and_floatings() {
    // Square at (0,0) on the arrow; empties isolate the bottom-right corner.
    let (problem, lits) = board_3x3_with_arrow(&[
      ((0, 0), true),
      ((1, 1), false),
      ((0, 2), false),
      ((2, 0), false),
    ]);
    let mut board = BoardManager::new(&problem, 0);
    for &lit in &lits {
      board.decide(lit);
    }

    let simple = board.compute_board_info_simple();
    let detailed = board.compute_board_info_detailed(&simple);

    assert_eq!(detailed.blocks.len(), 1);
    assert_eq!(detailed.cell_info.at(0, 0).0, CellKind::Block);
    // (0,1) and (1,0) touch the block.
    assert_eq!(detailed.cell_info.at(0, 1).0, CellKind::BlockNeighbor);
    assert_eq!(detailed.cell_info.at(1, 0).0, CellKind::BlockNeighbor);
    assert_eq!(detailed.block_neighbors[0].len(), 2);
    // The far corner cells are cut off: floating.
    assert_eq!(detailed.cell_info.at(2, 2).0, CellKind::Floating);
    assert_eq!(detailed.cell_info.at(0, 2).0, CellKind::Empty);
  }

  #[test]
  fn squares_without_arrows_are_floating() {
    let mut problem = Problem::new(2, 3);
    problem.add_arrow(vec![(0, 0), (0, 1)]);
    let mut board = BoardManager::new(&problem, 0);
    // A square far from any arrow cell.
    board.decide(Literal::new(5, false)); // (1, 2)
    let simple = board.compute_board_info_simple();
    let detailed = board.compute_board_info_detailed(&simple);
    assert!(detailed.blocks.is_empty());
    assert_eq!(detailed.cell_info.at(1, 2).0, CellKind::Floating);
  }

  #[test]
  fn reason_for_path_returns_square_literals() {
    let (problem, _) = board_3x3_with_arrow(&[]);
    let mut board = BoardManager::new(&problem, 0);
    for &(y, x) in &[(0, 0), (1, 0), (1, 1), (1, 2)] {
      board.decide(Literal::new((y * 3 + x) as usize, false));
    }
    let reason = board.reason_for_path(0, 0, 1, 2);
    assert!(reason.len() >= 4);
    for lit in reason {
      assert!(!lit.sign());
      let (y, x) = ((lit.var() / 3) as i32, (lit.var() % 3) as i32);
      assert_eq!(board.cell(y, x), Cell::Square);
    }
  }

  #[test]
  fn potential_block_boundary_collects_empty_rim() {
    let (problem, lits) = board_3x3_with_arrow(&[((0, 0), true), ((1, 0), false), ((0, 1), false)]);
    let mut board = BoardManager::new(&problem, 0);
    for &lit in &lits {
      board.decide(lit);
    }
    let simple = board.compute_board_info_simple();
    let pb = simple.potential_blocks.group_id(0, 0);
    let reason = board.reason_for_potential_block_boundary(&simple, pb);
    // Both empty rim cells appear, as Empty literals.
    assert_eq!(reason.len(), 2);
    for lit in &reason {
      assert!(lit.sign());
    }
  }
}
