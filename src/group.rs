/*!

  `GroupInfo` is a flattened adjacency-list view of a labeling of grid cells into groups:
  constant-time lookup of the group id at (y, x), and iteration over the cells of one group
  as a contiguous slice. Cells labeled -1 belong to no group.

*/

use crate::grid::Grid;

pub struct GroupInfo {
  group_id     : Grid<i32>,
  groups_raw   : Vec<(i32, i32)>,
  groups_offset: Vec<usize>,
}

impl GroupInfo {
  pub fn new(group_id: Grid<i32>) -> Self {
    let mut max_group_id = 0;
    for y in 0..group_id.height() {
      for x in 0..group_id.width() {
        max_group_id = max_group_id.max(group_id.get(y, x));
      }
    }

    let mut groups_offset = vec![0usize; (max_group_id + 2) as usize];
    for y in 0..group_id.height() {
      for x in 0..group_id.width() {
        let id = group_id.get(y, x);
        if id >= 0 {
          groups_offset[(id + 1) as usize] += 1;
        }
      }
    }
    for i in 1..groups_offset.len() {
      groups_offset[i] += groups_offset[i - 1];
    }

    let mut next_pos = groups_offset.clone();
    let mut groups_raw = vec![(0, 0); *groups_offset.last().unwrap()];
    for y in 0..group_id.height() {
      for x in 0..group_id.width() {
        let id = group_id.get(y, x);
        if id >= 0 {
          groups_raw[next_pos[id as usize]] = (y, x);
          next_pos[id as usize] += 1;
        }
      }
    }

    GroupInfo { group_id, groups_raw, groups_offset }
  }

  pub fn group_id(&self, y: i32, x: i32) -> i32 {
    self.group_id.get(y, x)
  }

  pub fn num_groups(&self) -> i32 {
    (self.groups_offset.len() - 1) as i32
  }

  /// The cells of group `id`, in row-major order.
  pub fn group(&self, id: i32) -> &[(i32, i32)] {
    let id = id as usize;
    &self.groups_raw[self.groups_offset[id]..self.groups_offset[id + 1]]
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn labeling() -> Grid<i32> {
    // 0 0 1
    // 2 0 1
    // 2 2 -1
    let mut grid = Grid::new(3, 3, -1);
    grid.set(0, 0, 0);
    grid.set(0, 1, 0);
    grid.set(1, 1, 0);
    grid.set(0, 2, 1);
    grid.set(1, 2, 1);
    grid.set(1, 0, 2);
    grid.set(2, 0, 2);
    grid.set(2, 1, 2);
    grid
  }

  #[test]
  fn groups_partition_the_labeled_cells() {
    let info = GroupInfo::new(labeling());
    assert_eq!(info.num_groups(), 3);
    assert_eq!(info.group(0), &[(0, 0), (0, 1), (1, 1)]);
    assert_eq!(info.group(1), &[(0, 2), (1, 2)]);
    assert_eq!(info.group(2), &[(1, 0), (2, 0), (2, 1)]);

    // Totality: the groups cover exactly the cells with a non-negative id.
    let labeled: usize = (0..3)
      .flat_map(|y| (0..3).map(move |x| (y, x)))
      .filter(|&(y, x)| info.group_id(y, x) >= 0)
      .count();
    let total: usize = (0..info.num_groups()).map(|i| info.group(i).len()).sum();
    assert_eq!(total, labeled);

    for id in 0..info.num_groups() {
      for &(y, x) in info.group(id) {
        assert_eq!(info.group_id(y, x), id);
      }
    }
  }

  #[test]
  fn all_unlabeled_yields_one_empty_group() {
    let info = GroupInfo::new(Grid::new(2, 2, -1));
    assert_eq!(info.num_groups(), 1);
    assert!(info.group(0).is_empty());
  }
}
