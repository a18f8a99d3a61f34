/*!

  A constraint ensuring that every block has the same number of black and white cells.

  Only walls can split a component, so the balancer watches the Wall polarity of every
  border variable. At quiescence it runs one lowlink DFS over the currently connected graph:
  an imbalanced root component is an immediate conflict, and a bridge whose subtree carries a
  non-zero signed color sum must stay connected, so its border is enqueued as Connected.

  Reasons are rebuilt from scratch with a weighted union-find over the active edges, walking
  the wall decisions newest-first and keeping only those whose re-inclusion would have merged
  the two remaining imbalanced components into a balanced one.

*/

use crate::{BoolVariable, LiftedBool, Literal, LiteralVector};
use crate::solver::{Constraint, Solver};
use super::problem::Problem;

struct WeightedUnionFind {
  parent: Vec<i32>,
  weight: Vec<i32>,
}

impl WeightedUnionFind {
  fn new(weight: Vec<i32>) -> Self {
    WeightedUnionFind { parent: vec![-1; weight.len()], weight }
  }

  fn root(&mut self, p: usize) -> usize {
    let mut r = p;
    while self.parent[r] >= 0 {
      r = self.parent[r] as usize;
    }
    // Path compression.
    let mut q = p;
    while self.parent[q] >= 0 {
      let next = self.parent[q] as usize;
      self.parent[q] = r as i32;
      q = next;
    }
    r
  }

  fn union(&mut self, p: usize, q: usize) -> bool {
    let mut p = self.root(p);
    let mut q = self.root(q);
    if p == q {
      return false;
    }
    if self.parent[p] > self.parent[q] {
      std::mem::swap(&mut p, &mut q);
    }
    self.parent[p] += self.parent[q];
    self.parent[q] = p as i32;
    self.weight[p] += self.weight[q];
    true
  }

  fn weight(&mut self, p: usize) -> i32 {
    let r = self.root(p);
    self.weight[r]
  }
}

pub struct Balancer<'p> {
  problem         : &'p Problem,
  origin          : BoolVariable,
  adj_edges       : Vec<Vec<(usize, usize)>>, // per vertex: (edge id, other endpoint)
  edges           : Vec<(usize, usize)>,
  edge_deactivated: Vec<bool>,
  color           : Vec<i32>, // +1 / -1
  rank            : Vec<i32>,
  lowlink         : Vec<i32>,
  subtree_sum     : Vec<i32>,
  decision_order  : Vec<usize>,
  next_rank       : i32,
}

impl<'p> Balancer<'p> {
  pub fn new(problem: &'p Problem, origin: BoolVariable) -> Self {
    let height = problem.height();
    let width = problem.width();
    let n_cells = (height * width) as usize;

    let mut edges = Vec::new();
    for y in 0..height {
      for x in 0..width - 1 {
        edges.push(((y * width + x) as usize, (y * width + x + 1) as usize));
      }
    }
    for y in 0..height - 1 {
      for x in 0..width {
        edges.push(((y * width + x) as usize, ((y + 1) * width + x) as usize));
      }
    }

    let mut adj_edges = vec![Vec::new(); n_cells];
    for (i, &(u, v)) in edges.iter().enumerate() {
      adj_edges[u].push((i, v));
      adj_edges[v].push((i, u));
    }

    let mut color = vec![0; n_cells];
    for y in 0..height {
      for x in 0..width {
        color[(y * width + x) as usize] = problem.color(y, x) * 2 - 1;
      }
    }

    Balancer {
      problem,
      origin,
      adj_edges,
      edge_deactivated: vec![false; edges.len()],
      edges,
      color,
      rank            : vec![-1; n_cells],
      lowlink         : vec![-1; n_cells],
      subtree_sum     : vec![0; n_cells],
      decision_order  : Vec::new(),
      next_rank       : 0,
    }
  }

  /// Lowlink DFS over the active graph starting at `root`, with an explicit stack so deep
  /// boards cannot overflow the call stack.
  fn traverse(&mut self, root: usize) {
    struct Frame {
      vertex: usize,
      parent: i32,
      next  : usize,
    }

    self.rank[root] = self.next_rank;
    self.lowlink[root] = self.next_rank;
    self.next_rank += 1;
    self.subtree_sum[root] = self.color[root];

    let mut stack = vec![Frame { vertex: root, parent: -1, next: 0 }];
    while let Some(frame) = stack.last_mut() {
      let u = frame.vertex;
      if frame.next < self.adj_edges[u].len() {
        let (edge_id, v) = self.adj_edges[u][frame.next];
        frame.next += 1;
        if self.edge_deactivated[edge_id] || v as i32 == frame.parent {
          continue;
        }
        if self.rank[v] == -1 {
          self.rank[v] = self.next_rank;
          self.lowlink[v] = self.next_rank;
          self.next_rank += 1;
          self.subtree_sum[v] = self.color[v];
          stack.push(Frame { vertex: v, parent: u as i32, next: 0 });
        } else {
          self.lowlink[u] = self.lowlink[u].min(self.rank[v]);
        }
      } else {
        let parent = frame.parent;
        stack.pop();
        if parent >= 0 {
          let p = parent as usize;
          self.subtree_sum[p] += self.subtree_sum[u];
          self.lowlink[p] = self.lowlink[p].min(self.lowlink[u]);
        }
      }
    }
  }

  fn calc_reason_impl(&mut self) -> LiteralVector {
    let mut uf = WeightedUnionFind::new(self.color.clone());

    for i in 0..self.edges.len() {
      if !self.edge_deactivated[i] {
        uf.union(self.edges[i].0, self.edges[i].1);
      }
    }

    let mut n_imbalance = 0;
    for i in 0..self.color.len() {
      if uf.root(i) == i && uf.weight(i) != 0 {
        n_imbalance += 1;
      }
    }
    assert!(n_imbalance > 0);

    let mut ret = Vec::new();
    for i in (0..self.decision_order.len()).rev() {
      let (u, v) = self.edges[self.decision_order[i]];
      let u = uf.root(u);
      let v = uf.root(v);
      if u == v {
        continue;
      }

      let weight_u = uf.weight(u);
      let weight_v = uf.weight(v);
      if weight_u != 0 && weight_u + weight_v == 0 && n_imbalance == 2 {
        // This wall is what keeps the two imbalanced components apart.
        ret.push(Literal::new(self.origin + self.decision_order[i], false));
      } else {
        uf.union(u, v);
        n_imbalance += (if weight_u == 0 { 0 } else { -1 })
          + (if weight_v == 0 { 0 } else { -1 })
          + (if weight_u + weight_v == 0 { 0 } else { 1 });
      }
    }
    ret
  }
}

impl<'p> Constraint<'p> for Balancer<'p> {
  fn initialize(&mut self, solver: &mut Solver<'p>) -> bool {
    for i in 0..self.edges.len() {
      solver.add_watch(Literal::new(self.origin + i, false));
    }

    for i in 0..self.edges.len() {
      let var = self.origin + i;
      if solver.value(var) == LiftedBool::True {
        if !self.propagate(solver, Literal::new(var, false)) {
          return false;
        }
      }
    }

    true
  }

  fn propagate(&mut self, solver: &mut Solver<'p>, p: Literal) -> bool {
    solver.register_undo(p.var());
    assert!(!p.sign());
    let edge_id = p.var() - self.origin;
    self.decision_order.push(edge_id);
    assert!(!self.edge_deactivated[edge_id]);
    self.edge_deactivated[edge_id] = true;

    if solver.num_pending_propagation() > 0 {
      // Lazy: re-check once the trail quiesces.
      return true;
    }

    for r in self.rank.iter_mut() {
      *r = -1;
    }
    self.next_rank = 0;
    for v in 0..self.rank.len() {
      if self.rank[v] != -1 {
        continue;
      }
      self.traverse(v);
      if self.subtree_sum[v] != 0 {
        // The connected component containing `v` is not balanced.
        return false;
      }
    }

    for i in 0..self.edges.len() {
      if self.edge_deactivated[i] {
        continue;
      }
      let (mut u, mut v) = self.edges[i];
      if self.rank[u] > self.rank[v] {
        std::mem::swap(&mut u, &mut v);
      }
      if self.lowlink[v] > self.rank[u] {
        // (u, v) is a bridge: v's subtree separates if it is removed.
        if self.subtree_sum[v] != 0 {
          if !solver.enqueue(Literal::new(self.origin + i, true)) {
            return false;
          }
        }
      }
    }

    true
  }

  fn calc_reason(&mut self, _solver: &mut Solver<'p>, p: Option<Literal>, extra: Option<Literal>,
                 out_reason: &mut LiteralVector) {
    // Explaining an implied Connected literal: pretend its edge were a wall. Explaining a
    // conflict from a failed enqueue: the extra Wall literal joins the decisions.
    if let Some(p) = p {
      assert!(p.sign());
      let edge_id = p.var() - self.origin;
      assert!(!self.edge_deactivated[edge_id]);
      self.edge_deactivated[edge_id] = true;
    }
    if let Some(extra) = extra {
      assert!(!extra.sign());
      let edge_id = extra.var() - self.origin;
      assert!(!self.edge_deactivated[edge_id]);
      self.edge_deactivated[edge_id] = true;
      self.decision_order.push(edge_id);
    }

    let reason = self.calc_reason_impl();
    out_reason.extend(reason);

    if let Some(p) = p {
      self.edge_deactivated[p.var() - self.origin] = false;
    }
    if let Some(extra) = extra {
      self.edge_deactivated[extra.var() - self.origin] = false;
      self.decision_order.pop();
    }
  }

  fn undo(&mut self, _solver: &mut Solver<'p>, p: Literal) {
    let edge_id = p.var() - self.origin;
    assert_eq!(self.decision_order.pop(), Some(edge_id));
    assert!(self.edge_deactivated[edge_id]);
    self.edge_deactivated[edge_id] = false;
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{LiftedBool, Solver};

  fn strip_0110() -> Problem {
    let mut problem = Problem::new(1, 4);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 1);
    problem.set_color(0, 2, 1);
    problem.set_color(0, 3, 0);
    problem
  }

  #[test]
  fn union_find_tracks_component_weights() {
    let mut uf = WeightedUnionFind::new(vec![-1, 1, 1, -1]);
    assert!(uf.union(0, 1));
    assert_eq!(uf.weight(0), 0);
    assert!(uf.union(2, 3));
    assert!(!uf.union(3, 2));
    assert_eq!(uf.weight(3), 0);
    assert!(uf.union(1, 2));
    assert_eq!(uf.weight(0), 0);
    assert_eq!(uf.root(0), uf.root(3));
  }

  #[test]
  fn balanced_split_is_allowed() {
    // Wall between cells 1 and 2 leaves two balanced components.
    let problem = strip_0110();
    let mut solver = Solver::new();
    let origin = solver.new_var();
    solver.new_var();
    solver.new_var();
    assert!(solver.add_constraint(Box::new(Balancer::new(&problem, origin))));
    assert!(solver.add_clause(&[Literal::new(origin + 1, false)]));
    assert!(solver.solve());
    assert_eq!(solver.model_value(origin + 1), LiftedBool::True);
    // The bridges on either side must have been forced Connected.
    assert_eq!(solver.model_value(origin), LiftedBool::False);
    assert_eq!(solver.model_value(origin + 2), LiftedBool::False);
  }

  #[test]
  fn imbalanced_split_is_a_conflict() {
    // Wall between cells 0 and 1 isolates a single -1 cell.
    let problem = strip_0110();
    let mut solver = Solver::new();
    let origin = solver.new_var();
    solver.new_var();
    solver.new_var();
    assert!(solver.add_constraint(Box::new(Balancer::new(&problem, origin))));
    solver.add_clause(&[Literal::new(origin, false)]);
    assert!(!solver.solve());
  }
}
