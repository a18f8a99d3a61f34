/*!

  An Evolmino problem: per-cell kinds and the arrows, with the puzz.link URL codec
  (`https://puzz.link/p?evolmino/<W>/<H>/<cells><arrow-streams>`).

  Arrows are stored as ordered polylines of adjacent cells. In the URL they are encoded as
  two run-length streams of directed edges between adjacent cells (left/up edges first,
  right/down edges second); arrows are reconstructed by walking the edges from each cell
  that has no incoming edge. No two arrows may share a cell, and no cell may have more than
  one outgoing edge.

*/

use crate::grid::Grid;
use crate::puzzlink::{base36_to_char, char_to_base36, is_base36, split_url};

pub type Arrow = Vec<(i32, i32)>;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ProblemCell {
  Empty,
  /// Must stay empty in the answer.
  Black,
  /// Must carry a square in the answer.
  Square,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Problem {
  height  : i32,
  width   : i32,
  cell    : Grid<ProblemCell>,
  arrow_id: Grid<i32>,
  arrows  : Vec<Arrow>,
}

impl Problem {
  pub fn new(height: i32, width: i32) -> Self {
    assert!(height > 0 && width > 0);
    Problem {
      height,
      width,
      cell    : Grid::new(height, width, ProblemCell::Empty),
      arrow_id: Grid::new(height, width, -1),
      arrows  : Vec::new(),
    }
  }

  pub fn height(&self) -> i32 {
    self.height
  }

  pub fn width(&self) -> i32 {
    self.width
  }

  pub fn cell(&self, y: i32, x: i32) -> ProblemCell {
    self.cell.get(y, x)
  }

  pub fn set_cell(&mut self, y: i32, x: i32, c: ProblemCell) {
    self.cell.set(y, x, c);
  }

  pub fn num_arrows(&self) -> usize {
    self.arrows.len()
  }

  pub fn arrow(&self, idx: usize) -> &Arrow {
    &self.arrows[idx]
  }

  /// The id of the arrow passing through (y, x), or -1.
  pub fn arrow_id(&self, y: i32, x: i32) -> i32 {
    self.arrow_id.get(y, x)
  }

  pub fn add_arrow(&mut self, arrow: Arrow) {
    assert!(arrow.len() >= 2);
    for i in 1..arrow.len() {
      let (y1, x1) = arrow[i - 1];
      let (y2, x2) = arrow[i];
      assert_eq!((y1 - y2).abs() + (x1 - x2).abs(), 1, "arrow cells must be adjacent");
    }
    for &(y, x) in &arrow {
      assert_eq!(self.arrow_id.get(y, x), -1, "arrows cannot share cells");
      self.arrow_id.set(y, x, self.arrows.len() as i32);
    }
    self.arrows.push(arrow);
  }

  pub fn parse_url(url: &str) -> Option<Problem> {
    let (height, width, body) = split_url(url, "evolmino")?;
    let body = body.as_bytes();
    let n_cells = height * width;

    let mut problem = Problem::new(height, width);
    let mut p = 0;

    // Cell kinds, ternary packed three per char.
    const POW3: [i32; 3] = [1, 3, 9];
    for i in 0..(n_cells + 2) / 3 {
      if p >= body.len() || !is_base36(body[p]) {
        return None;
      }
      let n = char_to_base36(body[p]);
      p += 1;
      for j in 0..3 {
        let v = n / POW3[2 - j as usize] % 3;
        if v == 0 {
          continue;
        }
        let idx = i * 3 + j;
        if idx >= n_cells {
          return None;
        }
        problem.set_cell(
          idx / width,
          idx % width,
          if v == 1 { ProblemCell::Black } else { ProblemCell::Square },
        );
      }
    }

    // Two run-length edge streams: (left, up) then (right, down).
    let mut up = Grid::new(height - 1, width, false);
    let mut down = Grid::new(height - 1, width, false);
    let mut left = Grid::new(height, width - 1, false);
    let mut right = Grid::new(height, width - 1, false);

    let lim = (height - 1) * width + height * (width - 1);
    for t in 0..2 {
      let mut idx = 0;
      while idx < lim {
        if p >= body.len() || !is_base36(body[p]) {
          return None;
        }
        let n = char_to_base36(body[p]);
        p += 1;
        idx += n;
        if n == 35 {
          continue;
        }
        if idx >= lim {
          break;
        }
        if idx >= height * (width - 1) {
          let ofs = idx - height * (width - 1);
          let grid = if t == 0 { &mut up } else { &mut down };
          grid.set(ofs / width, ofs % width, true);
        } else {
          let grid = if t == 0 { &mut left } else { &mut right };
          grid.set(idx / (width - 1), idx % (width - 1), true);
        }
        idx += 1;
      }
    }

    // Reconstruct the arrows: start from cells without an incoming edge and follow the
    // unique outgoing edge.
    let mut visited = Grid::new(height, width, false);
    for y in 0..height {
      for x in 0..width {
        if visited.get(y, x) {
          continue;
        }

        let mut has_in_edge = false;
        if y > 0 {
          has_in_edge |= down.get(y - 1, x);
        }
        if y < height - 1 {
          has_in_edge |= up.get(y, x);
        }
        if x > 0 {
          has_in_edge |= right.get(y, x - 1);
        }
        if x < width - 1 {
          has_in_edge |= left.get(y, x);
        }
        if has_in_edge {
          continue;
        }

        let mut arrow: Arrow = Vec::new();
        let (mut yp, mut xp) = (y, x);
        loop {
          if visited.get(yp, xp) {
            return None;
          }
          visited.set(yp, xp, true);
          arrow.push((yp, xp));

          let mut next: Option<(i32, i32)> = None;
          let mut update_next = |yd: i32, xd: i32, next: &mut Option<(i32, i32)>| -> bool {
            if next.is_none() {
              *next = Some((yd, xd));
              true
            } else {
              false
            }
          };

          if yp > 0 && up.get(yp - 1, xp) && !update_next(yp - 1, xp, &mut next) {
            return None;
          }
          if yp < height - 1 && down.get(yp, xp) && !update_next(yp + 1, xp, &mut next) {
            return None;
          }
          if xp > 0 && left.get(yp, xp - 1) && !update_next(yp, xp - 1, &mut next) {
            return None;
          }
          if xp < width - 1 && right.get(yp, xp) && !update_next(yp, xp + 1, &mut next) {
            return None;
          }

          match next {
            None => break,
            Some((y2, x2)) => {
              yp = y2;
              xp = x2;
            }
          }
        }

        if arrow.len() >= 2 {
          problem.add_arrow(arrow);
        }
      }
    }

    Some(problem)
  }

  /// The canonical URL of this problem; the exact inverse of `parse_url`.
  pub fn url(&self) -> String {
    let n_cells = self.height * self.width;
    let mut body = String::new();

    const POW3: [i32; 3] = [1, 3, 9];
    let mut idx = 0;
    while idx < n_cells {
      let mut n = 0;
      for j in 0..3 {
        if idx + j < n_cells {
          let v = match self.cell.get((idx + j) / self.width, (idx + j) % self.width) {
            ProblemCell::Empty  => 0,
            ProblemCell::Black  => 1,
            ProblemCell::Square => 2,
          };
          n += v * POW3[2 - j as usize];
        }
      }
      body.push(base36_to_char(n));
      idx += 3;
    }

    // Decompose arrows into directed edge layers.
    let mut up = Grid::new(self.height - 1, self.width, false);
    let mut down = Grid::new(self.height - 1, self.width, false);
    let mut left = Grid::new(self.height, self.width - 1, false);
    let mut right = Grid::new(self.height, self.width - 1, false);
    for arrow in &self.arrows {
      for i in 1..arrow.len() {
        let (y1, x1) = arrow[i - 1];
        let (y2, x2) = arrow[i];
        if y2 == y1 - 1 {
          up.set(y2, x2, true);
        } else if y2 == y1 + 1 {
          down.set(y1, x1, true);
        } else if x2 == x1 - 1 {
          left.set(y2, x2, true);
        } else {
          right.set(y1, x1, true);
        }
      }
    }

    let lim = (self.height - 1) * self.width + self.height * (self.width - 1);
    let edge_at = |horizontal: &Grid<bool>, vertical: &Grid<bool>, idx: i32| -> bool {
      if idx >= self.height * (self.width - 1) {
        let ofs = idx - self.height * (self.width - 1);
        vertical.get(ofs / self.width, ofs % self.width)
      } else {
        horizontal.get(idx / (self.width - 1), idx % (self.width - 1))
      }
    };

    for t in 0..2 {
      let (horizontal, vertical) = if t == 0 { (&left, &up) } else { (&right, &down) };
      let mut idx = 0;
      while idx < lim {
        let mut gap = 0;
        while idx + gap < lim && !edge_at(horizontal, vertical, idx + gap) {
          gap += 1;
        }
        while gap >= 35 {
          body.push('z');
          gap -= 35;
          idx += 35;
        }
        if idx < lim {
          body.push(base36_to_char(gap));
          idx += gap + 1;
        }
      }
    }

    format!("https://puzz.link/p?evolmino/{}/{}/{}", self.width, self.height, body)
  }
}
