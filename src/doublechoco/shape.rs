/*!

  The shape of a unit: its cells, plus the internal links ("connections") between adjacent
  cells of the unit. Connections live on the half-integer grid: the link between (y, x) and
  (y + 1, x) sits at (2y + 1, 2x), the link between (y, x) and (y, x + 1) at (2y, 2x + 1).

  Invariant: `cells` is sorted and its first element is (0, 0) after normalization.

*/

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct Shape {
  pub cells      : Vec<(i32, i32)>,
  pub connections: Vec<(i32, i32)>,
}

impl Shape {
  pub fn new(cells: Vec<(i32, i32)>, connections: Vec<(i32, i32)>) -> Self {
    let mut shape = Shape { cells, connections };
    shape.cells.sort_unstable();
    shape.normalize();
    shape
  }

  pub fn size(&self) -> usize {
    self.cells.len()
  }

  /// Mirror/rotate by the signs (yk, xk) ∈ {-1, 1}² and an optional transposition, then
  /// renormalize. The eight combinations generate the dihedral group of the square.
  pub fn transform(&self, yk: i32, xk: i32, flip: bool) -> Shape {
    let trans = |(y, x): (i32, i32)| {
      let (y, x) = (y * yk, x * xk);
      if flip {
        (x, y)
      } else {
        (y, x)
      }
    };

    Shape::new(
      self.cells.iter().map(|&c| trans(c)).collect(),
      self.connections.iter().map(|&c| trans(c)).collect(),
    )
  }

  /// All distinct images of this shape under the 8 symmetries of the square.
  pub fn enumerate_transforms(&self) -> Vec<Shape> {
    let mut transforms = Vec::with_capacity(8);
    for i in 0..8 {
      transforms.push(self.transform((i >> 2) * 2 - 1, ((i >> 1) & 1) * 2 - 1, (i & 1) != 0));
    }
    transforms.sort_unstable();
    transforms.dedup();
    transforms
  }

  /// Translate so that the first (lexicographically smallest) cell is at (0, 0).
  fn normalize(&mut self) {
    assert!(!self.cells.is_empty());
    let (min_y, min_x) = self.cells[0];
    for c in self.cells.iter_mut() {
      c.0 -= min_y;
      c.1 -= min_x;
    }
    for c in self.connections.iter_mut() {
      c.0 -= min_y * 2;
      c.1 -= min_x * 2;
    }
  }
}
