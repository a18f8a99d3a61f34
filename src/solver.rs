/*!

  A MiniSat-lineage CDCL solver extended with custom theory constraints.

  Clauses are propagated with the usual two-watched-literal scheme. In addition, a
  `Constraint` trait object can register persistent watches on literals; whenever a watched
  literal becomes true on the trail the constraint's `propagate` runs and may enqueue further
  implied literals or report a conflict. Conflicts are explained through `calc_reason` and
  learned with first-UIP resolution, exactly as for clause conflicts.

  Heuristics are deliberately minimal: activity-ordered branching with phase saving,
  geometric restarts, no learned-clause deletion.

*/

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{BoolVariable, LiftedBool, Literal, LiteralVector};
use crate::clause::{Clause, ClauseRef};
use crate::lifted_bool::LiftedBoolVector;
use crate::watched::{Watched, WatchList};

/// Index of a registered constraint in the solver. During `initialize` and `propagate` the
/// solver remembers which constraint it is currently running, so `enqueue`, `add_watch` and
/// `register_undo` always act on behalf of the active constraint.
pub type ConstraintRef = usize;

const ACTIVITY_RESCALE_LIMIT: f64 = 1e100;

/// A theory constraint cooperating with the SAT search.
///
/// The host guarantees: `propagate` is invoked in trail order for every watched literal that
/// becomes true; `undo` is invoked in strict reverse order on backtrack for every variable
/// the constraint registered an undo hook for; after `propagate` returns `false`, exactly one
/// `calc_reason` call with `p == None` follows before any further `propagate` or `undo`.
pub trait Constraint<'p> {
  /// Register watches and replay literals that already have a value on the trail. Returns
  /// `false` if the replay uncovers a conflict.
  fn initialize(&mut self, _solver: &mut Solver<'p>) -> bool {
    true
  }

  /// Called after the watched literal `p` became true. Returns `false` on conflict.
  fn propagate(&mut self, solver: &mut Solver<'p>, p: Literal) -> bool;

  /// Produce the set of currently-true literals explaining the conflict (`p == None`) or the
  /// earlier implication of `p`. A non-`None` `extra` literal must be appended verbatim.
  fn calc_reason(&mut self, solver: &mut Solver<'p>, p: Option<Literal>, extra: Option<Literal>,
                 out_reason: &mut LiteralVector);

  /// Called when the assignment that triggered `propagate(p)` is undone.
  fn undo(&mut self, solver: &mut Solver<'p>, p: Literal);
}

/// Knobs of the search loop. The defaults mirror classic MiniSat values.
#[derive(Copy, Clone, Debug)]
pub struct SolverConfig {
  pub variable_decay: f64,
  pub restart_first : u64,
  pub restart_inc   : f64,
}

impl Default for SolverConfig {
  fn default() -> Self {
    SolverConfig {
      variable_decay: 0.95,
      restart_first : 100,
      restart_inc   : 1.5,
    }
  }
}

/// Statistics collected about the SAT search.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SolverStatistics {
  pub starts         : u64,
  pub decisions      : u64,
  pub propagations   : u64,
  pub conflicts      : u64,
  pub learned_clauses: u64,
}

/// Why a variable holds its current value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Reason {
  Clause(ClauseRef),
  Constraint(ConstraintRef),
}

/// The source of a conflict, carried from propagation into analysis.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Conflict {
  Clause(ClauseRef),
  Constraint {
    constraint: ConstraintRef,
    extra     : Option<Literal>,
  },
}

pub struct Solver<'p> {
  config: SolverConfig,
  stats : SolverStatistics,

  clauses           : Vec<Clause>,
  watches           : Vec<WatchList>,          // indexed by literal index
  constraint_watches: Vec<Vec<ConstraintRef>>, // indexed by literal index
  constraints       : Vec<Option<Box<dyn Constraint<'p> + 'p>>>,

  assigns     : Vec<LiftedBool>,
  phase       : Vec<bool>,
  activity    : Vec<f64>,
  variable_inc: f64,
  reason      : Vec<Option<Reason>>,
  level       : Vec<usize>,
  undo_hooks  : Vec<Vec<ConstraintRef>>,

  trail     : LiteralVector,
  trail_lim : Vec<usize>,
  queue_head: usize,

  active_constraint: Option<ConstraintRef>,
  conflict_extra   : Option<Literal>,

  model: LiftedBoolVector,
  ok   : bool,
}

impl<'p> Solver<'p> {
  pub fn new() -> Self {
    Self::with_config(SolverConfig::default())
  }

  pub fn with_config(config: SolverConfig) -> Self {
    Solver {
      config,
      stats             : SolverStatistics::default(),
      clauses           : Vec::new(),
      watches           : Vec::new(),
      constraint_watches: Vec::new(),
      constraints       : Vec::new(),
      assigns           : Vec::new(),
      phase             : Vec::new(),
      activity          : Vec::new(),
      variable_inc      : 1.0,
      reason            : Vec::new(),
      level             : Vec::new(),
      undo_hooks        : Vec::new(),
      trail             : Vec::new(),
      trail_lim         : Vec::new(),
      queue_head        : 0,
      active_constraint : None,
      conflict_extra    : None,
      model             : Vec::new(),
      ok                : true,
    }
  }

  // region Variables and values

  pub fn new_var(&mut self) -> BoolVariable {
    let v = self.assigns.len();
    self.assigns.push(LiftedBool::Undefined);
    self.phase.push(false);
    self.activity.push(0.0);
    self.reason.push(None);
    self.level.push(0);
    self.undo_hooks.push(Vec::new());
    self.watches.push(Vec::new());
    self.watches.push(Vec::new());
    self.constraint_watches.push(Vec::new());
    self.constraint_watches.push(Vec::new());
    v
  }

  pub fn num_variables(&self) -> usize {
    self.assigns.len()
  }

  pub fn value(&self, v: BoolVariable) -> LiftedBool {
    self.assigns[v]
  }

  pub fn value_literal(&self, p: Literal) -> LiftedBool {
    self.assigns[p.var()].apply_sign(p.sign())
  }

  /// The value of `v` in the most recently found model.
  pub fn model_value(&self, v: BoolVariable) -> LiftedBool {
    self.model[v]
  }

  pub fn model_value_literal(&self, p: Literal) -> LiftedBool {
    self.model[p.var()].apply_sign(p.sign())
  }

  pub fn decision_level(&self) -> usize {
    self.trail_lim.len()
  }

  /// Number of literals enqueued on the trail but not yet dispatched to the watch lists.
  /// Theory constraints use this to defer whole-board checks until the trail quiesces.
  pub fn num_pending_propagation(&self) -> usize {
    self.trail.len() - self.queue_head
  }

  pub fn is_ok(&self) -> bool {
    self.ok
  }

  pub fn statistics(&self) -> &SolverStatistics {
    &self.stats
  }

  // endregion

  // region Clauses and constraints

  /// Add a clause at the root level. Returns `false` if the clause makes the instance
  /// unsatisfiable outright.
  pub fn add_clause(&mut self, literals: &[Literal]) -> bool {
    assert_eq!(self.decision_level(), 0);
    if !self.ok {
      return false;
    }

    let mut lits: LiteralVector = literals.to_vec();
    lits.sort_unstable();
    lits.dedup();

    // A literal and its negation have adjacent indices, so a tautology survives sorting as a
    // neighboring pair.
    if lits.windows(2).any(|w| w[1] == !w[0]) {
      return true;
    }
    if lits.iter().any(|&l| self.value_literal(l) == LiftedBool::True) {
      return true;
    }
    lits.retain(|&l| self.value_literal(l) != LiftedBool::False);

    match lits.len() {
      0 => {
        self.ok = false;
        false
      }
      1 => {
        if !self.enqueue_internal(lits[0], None) {
          self.ok = false;
        }
        self.ok
      }
      _ => {
        self.attach_clause(lits, false);
        true
      }
    }
  }

  fn attach_clause(&mut self, lits: LiteralVector, is_learned: bool) -> ClauseRef {
    let cr = self.clauses.len();
    self.watches[(!lits[0]).index()].push(Watched { blocker: lits[1], clause: cr });
    self.watches[(!lits[1]).index()].push(Watched { blocker: lits[0], clause: cr });
    self.clauses.push(Clause::new(lits, is_learned));
    cr
  }

  /// Register a theory constraint and run its `initialize`. A `false` result from
  /// `initialize` marks the instance unsatisfiable.
  pub fn add_constraint(&mut self, constraint: Box<dyn Constraint<'p> + 'p>) -> bool {
    if !self.ok {
      return false;
    }
    let cref = self.constraints.len();
    self.constraints.push(Some(constraint));

    let mut c = self.constraints[cref].take().expect("constraint slot");
    self.active_constraint = Some(cref);
    let ok = c.initialize(self);
    self.active_constraint = None;
    self.constraints[cref] = Some(c);

    self.conflict_extra = None;
    if !ok {
      self.ok = false;
    }
    self.ok
  }

  /// Watch `p` on behalf of the active constraint: its `propagate` will run whenever `p`
  /// becomes true. Only valid inside `Constraint::initialize`.
  pub fn add_watch(&mut self, p: Literal) {
    let cref = self.active();
    self.constraint_watches[p.index()].push(cref);
  }

  /// Arrange for the active constraint's `undo` to run when `v` is unassigned. Only valid
  /// inside `Constraint::propagate`.
  pub fn register_undo(&mut self, v: BoolVariable) {
    let cref = self.active();
    self.undo_hooks[v].push(cref);
  }

  /// Enqueue a literal implied by the active constraint. Returns `false` if the literal is
  /// already false; the constraint must then report a conflict by returning `false` from its
  /// `propagate`, and the host will ask it for a reason with `extra = ¬p`.
  pub fn enqueue(&mut self, p: Literal) -> bool {
    let reason = self.active_constraint.map(Reason::Constraint);
    if self.enqueue_internal(p, reason) {
      true
    } else {
      self.conflict_extra = Some(!p);
      false
    }
  }

  fn active(&self) -> ConstraintRef {
    self.active_constraint.expect("no active constraint")
  }

  fn enqueue_internal(&mut self, p: Literal, reason: Option<Reason>) -> bool {
    match self.value_literal(p) {
      LiftedBool::True  => true,
      LiftedBool::False => false,
      LiftedBool::Undefined => {
        let v = p.var();
        self.assigns[v] = LiftedBool::from(!p.sign());
        self.level[v] = self.decision_level();
        self.reason[v] = reason;
        self.trail.push(p);
        true
      }
    }
  }

  // endregion

  // region Propagation

  fn propagate_all(&mut self) -> Option<Conflict> {
    while self.queue_head < self.trail.len() {
      let p = self.trail[self.queue_head];
      self.queue_head += 1;
      self.stats.propagations += 1;

      if let Some(cr) = self.propagate_clauses(p) {
        self.queue_head = self.trail.len();
        return Some(Conflict::Clause(cr));
      }

      // Constraint watch lists are only extended during `initialize`, so a clone here is a
      // snapshot of a stable list.
      let watchers = self.constraint_watches[p.index()].clone();
      for cref in watchers {
        let mut c = self.constraints[cref].take().expect("constraint reentrancy");
        self.active_constraint = Some(cref);
        self.conflict_extra = None;
        let ok = c.propagate(self, p);
        self.active_constraint = None;
        self.constraints[cref] = Some(c);

        if !ok {
          let extra = self.conflict_extra.take();
          self.queue_head = self.trail.len();
          return Some(Conflict::Constraint { constraint: cref, extra });
        }
      }
    }
    None
  }

  fn propagate_clauses(&mut self, p: Literal) -> Option<ClauseRef> {
    let mut ws = std::mem::take(&mut self.watches[p.index()]);
    let false_lit = !p;
    let mut conflict = None;

    let mut i = 0;
    let mut j = 0;
    while i < ws.len() {
      let w = ws[i];
      i += 1;

      if self.value_literal(w.blocker) == LiftedBool::True {
        ws[j] = w;
        j += 1;
        continue;
      }

      let cr = w.clause;
      if self.clauses[cr][0] == false_lit {
        self.clauses[cr].swap(0, 1);
      }
      debug_assert_eq!(self.clauses[cr][1], false_lit);

      let first = self.clauses[cr][0];
      if first != w.blocker && self.value_literal(first) == LiftedBool::True {
        ws[j] = Watched { blocker: first, clause: cr };
        j += 1;
        continue;
      }

      let mut moved = false;
      for k in 2..self.clauses[cr].len() {
        if self.value_literal(self.clauses[cr][k]) != LiftedBool::False {
          self.clauses[cr].swap(1, k);
          let new_watch = self.clauses[cr][1];
          self.watches[(!new_watch).index()].push(Watched { blocker: first, clause: cr });
          moved = true;
          break;
        }
      }
      if moved {
        continue;
      }

      // Unit or conflicting.
      ws[j] = Watched { blocker: first, clause: cr };
      j += 1;
      if !self.enqueue_internal(first, Some(Reason::Clause(cr))) {
        conflict = Some(cr);
        while i < ws.len() {
          ws[j] = ws[i];
          i += 1;
          j += 1;
        }
      }
    }
    ws.truncate(j);
    self.watches[p.index()] = ws;
    conflict
  }

  // endregion

  // region Conflict analysis and backtracking

  /// Collect the currently-true literals explaining `source`: either a conflict
  /// (`p == None`) or the implication of `p`.
  fn reason_literals_into(&mut self, source: Conflict, p: Option<Literal>,
                          out: &mut LiteralVector) {
    match source {
      Conflict::Clause(cr) => {
        let start = if p.is_some() { 1 } else { 0 };
        debug_assert!(p.is_none() || self.clauses[cr][0] == p.unwrap());
        for k in start..self.clauses[cr].len() {
          out.push(!self.clauses[cr][k]);
        }
      }
      Conflict::Constraint { constraint, extra } => {
        let mut c = self.constraints[constraint].take().expect("constraint reentrancy");
        c.calc_reason(self, p, extra, out);
        self.constraints[constraint] = Some(c);
      }
    }
  }

  /// First-UIP conflict analysis. Returns the learned clause (asserting literal first) and
  /// the backtrack level.
  fn analyze(&mut self, conflict: Conflict) -> (LiteralVector, usize) {
    let mut seen = vec![false; self.num_variables()];
    let mut lower: LiteralVector = Vec::new();
    let mut reason_buf: LiteralVector = Vec::new();

    let mut source = conflict;
    let mut p: Option<Literal> = None;
    let mut path_count: usize = 0;
    let mut index = self.trail.len();

    let asserting = loop {
      reason_buf.clear();
      self.reason_literals_into(source, p, &mut reason_buf);

      for &q in &reason_buf {
        let v = q.var();
        debug_assert_eq!(self.value_literal(q), LiftedBool::True);
        if !seen[v] && self.level[v] > 0 {
          seen[v] = true;
          self.bump_variable_activity(v);
          if self.level[v] >= self.decision_level() {
            path_count += 1;
          } else {
            lower.push(!q);
          }
        }
      }

      loop {
        index -= 1;
        if seen[self.trail[index].var()] {
          break;
        }
      }
      let pl = self.trail[index];
      path_count -= 1;
      if path_count == 0 {
        break !pl;
      }
      p = Some(pl);
      source = match self.reason[pl.var()] {
        Some(Reason::Clause(cr)) => Conflict::Clause(cr),
        Some(Reason::Constraint(c)) => Conflict::Constraint { constraint: c, extra: None },
        None => unreachable!("interior literal of the conflict graph has no reason"),
      };
    };

    let backtrack_level = lower.iter().map(|l| self.level[l.var()]).max().unwrap_or(0);
    let mut learnt = Vec::with_capacity(lower.len() + 1);
    learnt.push(asserting);
    learnt.extend(lower);
    (learnt, backtrack_level)
  }

  fn record_learnt(&mut self, mut learnt: LiteralVector) {
    self.stats.learned_clauses += 1;
    trace!(clause = %learnt.iter().join(" "), "learnt");
    if learnt.len() == 1 {
      let ok = self.enqueue_internal(learnt[0], None);
      debug_assert!(ok);
    } else {
      // The second watch must sit at the deepest remaining level so it is the last literal
      // of the clause to become false.
      let mut deepest = 1;
      for k in 2..learnt.len() {
        if self.level[learnt[k].var()] > self.level[learnt[deepest].var()] {
          deepest = k;
        }
      }
      learnt.swap(1, deepest);
      let first = learnt[0];
      let cr = self.attach_clause(learnt, true);
      let ok = self.enqueue_internal(first, Some(Reason::Clause(cr)));
      debug_assert!(ok);
    }
  }

  fn cancel_until(&mut self, level: usize) {
    while self.decision_level() > level {
      let lim = self.trail_lim.pop().expect("trail limit");
      while self.trail.len() > lim {
        let p = self.trail.pop().expect("trail");
        let v = p.var();
        self.phase[v] = !p.sign();
        self.assigns[v] = LiftedBool::Undefined;
        self.reason[v] = None;
        while let Some(cref) = self.undo_hooks[v].pop() {
          let mut c = self.constraints[cref].take().expect("constraint reentrancy");
          c.undo(self, p);
          self.constraints[cref] = Some(c);
        }
      }
    }
    self.queue_head = self.trail.len();
  }

  fn assume(&mut self, p: Literal) {
    self.trail_lim.push(self.trail.len());
    let ok = self.enqueue_internal(p, None);
    debug_assert!(ok);
  }

  // endregion

  // region Activity

  fn bump_variable_activity(&mut self, v: BoolVariable) {
    self.activity[v] += self.variable_inc;
    if self.activity[v] > ACTIVITY_RESCALE_LIMIT {
      for a in self.activity.iter_mut() {
        *a *= 1.0 / ACTIVITY_RESCALE_LIMIT;
      }
      self.variable_inc *= 1.0 / ACTIVITY_RESCALE_LIMIT;
    }
  }

  fn decay_variable_activities(&mut self) {
    self.variable_inc *= 1.0 / self.config.variable_decay;
  }

  // endregion

  // region Search

  fn pick_branch_variable(&self) -> Option<BoolVariable> {
    let mut best: Option<BoolVariable> = None;
    let mut best_activity = -1.0;
    for v in 0..self.num_variables() {
      if self.assigns[v].is_undefined() && self.activity[v] > best_activity {
        best = Some(v);
        best_activity = self.activity[v];
      }
    }
    best
  }

  fn search(&mut self, max_conflicts: u64) -> LiftedBool {
    self.stats.starts += 1;
    let mut conflicts = 0;

    loop {
      if let Some(conflict) = self.propagate_all() {
        self.stats.conflicts += 1;
        conflicts += 1;
        if self.decision_level() == 0 {
          return LiftedBool::False;
        }
        let (learnt, backtrack_level) = self.analyze(conflict);
        self.cancel_until(backtrack_level);
        self.record_learnt(learnt);
        self.decay_variable_activities();
      } else if conflicts >= max_conflicts {
        self.cancel_until(0);
        return LiftedBool::Undefined;
      } else {
        match self.pick_branch_variable() {
          None => {
            self.model = self.assigns.clone();
            self.cancel_until(0);
            return LiftedBool::True;
          }
          Some(v) => {
            self.stats.decisions += 1;
            let sign = !self.phase[v];
            self.assume(Literal::new(v, sign));
          }
        }
      }
    }
  }

  /// Run the CDCL search to completion. Returns `true` and stores a model on success;
  /// `false` marks the instance permanently unsatisfiable (clauses are only ever added).
  pub fn solve(&mut self) -> bool {
    if !self.ok {
      return false;
    }
    let mut limit = self.config.restart_first as f64;
    loop {
      match self.search(limit as u64) {
        LiftedBool::True => {
          debug!(
            conflicts = self.stats.conflicts,
            decisions = self.stats.decisions,
            learned = self.stats.learned_clauses,
            "sat"
          );
          return true;
        }
        LiftedBool::False => {
          debug!(conflicts = self.stats.conflicts, "unsat");
          self.ok = false;
          return false;
        }
        LiftedBool::Undefined => {
          limit *= self.config.restart_inc;
          debug!(conflicts = self.stats.conflicts, next_limit = limit, "restart");
        }
      }
    }
  }

  // endregion
}


#[cfg(test)]
mod tests {
  use super::*;

  fn lit(v: BoolVariable, sign: bool) -> Literal {
    Literal::new(v, sign)
  }

  #[test]
  fn unit_propagation_forces_chain() {
    let mut solver = Solver::new();
    let a = solver.new_var();
    let b = solver.new_var();
    let c = solver.new_var();
    // a, a -> b, b -> c
    assert!(solver.add_clause(&[lit(a, false)]));
    assert!(solver.add_clause(&[lit(a, true), lit(b, false)]));
    assert!(solver.add_clause(&[lit(b, true), lit(c, false)]));
    assert!(solver.solve());
    assert_eq!(solver.model_value(a), LiftedBool::True);
    assert_eq!(solver.model_value(b), LiftedBool::True);
    assert_eq!(solver.model_value(c), LiftedBool::True);
  }

  #[test]
  fn contradictory_units_are_unsat() {
    let mut solver = Solver::new();
    let a = solver.new_var();
    assert!(solver.add_clause(&[lit(a, false)]));
    assert!(!solver.add_clause(&[lit(a, true)]));
    assert!(!solver.solve());
  }

  #[test]
  fn all_sign_combinations_are_unsat() {
    // No unit clauses, so refutation requires analysis above the root level.
    let mut solver = Solver::new();
    let a = solver.new_var();
    let b = solver.new_var();
    assert!(solver.add_clause(&[lit(a, false), lit(b, false)]));
    assert!(solver.add_clause(&[lit(a, true), lit(b, false)]));
    assert!(solver.add_clause(&[lit(a, false), lit(b, true)]));
    assert!(solver.add_clause(&[lit(a, true), lit(b, true)]));
    assert!(!solver.solve());
    assert!(solver.statistics().conflicts >= 1);
  }

  #[test]
  fn learns_through_decisions() {
    // An instance with no unit clauses that needs a few conflicts to solve.
    let mut solver = Solver::new();
    let v: Vec<BoolVariable> = (0..4).map(|_| solver.new_var()).collect();
    assert!(solver.add_clause(&[lit(v[0], false), lit(v[1], false)]));
    assert!(solver.add_clause(&[lit(v[0], true), lit(v[2], false)]));
    assert!(solver.add_clause(&[lit(v[1], true), lit(v[3], false)]));
    assert!(solver.add_clause(&[lit(v[2], true), lit(v[3], true)]));
    assert!(solver.solve());
    // The model must satisfy every clause.
    let sat = |p: Literal| solver.model_value_literal(p) == LiftedBool::True;
    assert!(sat(lit(v[0], false)) || sat(lit(v[1], false)));
    assert!(sat(lit(v[0], true)) || sat(lit(v[2], false)));
    assert!(sat(lit(v[1], true)) || sat(lit(v[3], false)));
    assert!(sat(lit(v[2], true)) || sat(lit(v[3], true)));
  }

  /// A constraint that forbids its two variables from both being true, with the usual
  /// decide/undo bookkeeping. Exercises the constraint dispatch, conflict reasons, and the
  /// LIFO undo discipline.
  struct NotBoth {
    a: BoolVariable,
    b: BoolVariable,
    decided: LiteralVector,
  }

  impl<'p> Constraint<'p> for NotBoth {
    fn initialize(&mut self, solver: &mut Solver<'p>) -> bool {
      solver.add_watch(lit(self.a, false));
      solver.add_watch(lit(self.b, false));
      true
    }

    fn propagate(&mut self, solver: &mut Solver<'p>, p: Literal) -> bool {
      solver.register_undo(p.var());
      self.decided.push(p);
      self.decided.len() < 2
    }

    fn calc_reason(&mut self, _solver: &mut Solver<'p>, _p: Option<Literal>,
                   extra: Option<Literal>, out_reason: &mut LiteralVector) {
      out_reason.extend(self.decided.iter().copied());
      if let Some(e) = extra {
        out_reason.push(e);
      }
    }

    fn undo(&mut self, _solver: &mut Solver<'p>, p: Literal) {
      assert_eq!(self.decided.pop(), Some(p));
    }
  }

  #[test]
  fn constraint_conflict_is_learned() {
    let mut solver = Solver::new();
    let a = solver.new_var();
    let d = solver.new_var();
    let b = solver.new_var();
    assert!(solver.add_constraint(Box::new(NotBoth { a, b, decided: Vec::new() })));
    assert!(solver.add_clause(&[lit(a, false)]));
    // The default phase decides d false, which forces b true and trips the constraint;
    // learning ¬b then forces d true.
    assert!(solver.add_clause(&[lit(d, false), lit(b, false)]));
    assert!(solver.solve());
    assert_eq!(solver.model_value(a), LiftedBool::True);
    assert_eq!(solver.model_value(b), LiftedBool::False);
    assert_eq!(solver.model_value(d), LiftedBool::True);
    assert!(solver.statistics().conflicts >= 1);
  }

  #[test]
  fn constraint_plus_clauses_unsat() {
    let mut solver = Solver::new();
    let a = solver.new_var();
    let b = solver.new_var();
    assert!(solver.add_constraint(Box::new(NotBoth { a, b, decided: Vec::new() })));
    solver.add_clause(&[lit(a, false)]);
    solver.add_clause(&[lit(b, false)]);
    assert!(!solver.solve());
  }
}
