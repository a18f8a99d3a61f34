/*!

  A scaffold for theory propagators that check the whole board at once.

  A `SubPropagator` only has to mirror decisions into its own state and answer one question:
  is the current partial assignment inconsistent, and if so, which currently-true literals
  explain it? `SimplePropagator` wraps that into the host `Constraint` contract: it registers
  watches on both polarities of every related variable, keeps one reason frame per decision,
  and defers the (expensive) inconsistency check while the host still has literals queued —
  running it early would be wasted work, since it will run again at quiescence anyway.

*/

use crate::{BoolVariableVector, Literal, LiteralVector};
use crate::lifted_bool::LiftedBool;
use crate::solver::{Constraint, Solver};

pub trait SubPropagator {
  /// All variables this propagator watches, on both polarities.
  fn related_variables(&self) -> BoolVariableVector;

  /// The literal `p` has been decided; mirror it into internal state.
  fn decide(&mut self, p: Literal);

  /// The decision of `p` is undone. `decide`/`undo` pair up in strict LIFO order: `p` is
  /// always the most recent decided-but-not-undone literal.
  fn undo(&mut self, p: Literal);

  /// Determine whether the current decisions are inconsistent. On inconsistency, returns the
  /// "reason": a collection of literals that cannot all be true at the same time if this
  /// constraint is to be satisfied.
  fn detect_inconsistency(&mut self) -> Option<LiteralVector>;
}

pub struct SimplePropagator<T: SubPropagator> {
  sub    : T,
  reasons: Vec<LiteralVector>,
}

impl<T: SubPropagator> SimplePropagator<T> {
  pub fn new(sub: T) -> Self {
    SimplePropagator { sub, reasons: Vec::new() }
  }
}

impl<'p, T: SubPropagator> Constraint<'p> for SimplePropagator<T> {
  fn initialize(&mut self, solver: &mut Solver<'p>) -> bool {
    let related = self.sub.related_variables();

    for &v in &related {
      solver.add_watch(Literal::new(v, false));
      solver.add_watch(Literal::new(v, true));
    }

    for &v in &related {
      match solver.value(v) {
        LiftedBool::True => {
          if !self.propagate(solver, Literal::new(v, false)) {
            return false;
          }
        }
        LiftedBool::False => {
          if !self.propagate(solver, Literal::new(v, true)) {
            return false;
          }
        }
        LiftedBool::Undefined => {}
      }
    }

    // A statically impossible instance conflicts before any decision is made; its reason can
    // be empty, which conflict analysis cannot consume. Refute it here at the root instead.
    self.sub.detect_inconsistency().is_none()
  }

  fn propagate(&mut self, solver: &mut Solver<'p>, p: Literal) -> bool {
    solver.register_undo(p.var());
    self.sub.decide(p);

    if solver.num_pending_propagation() > 0 {
      self.reasons.push(Vec::new());
      return true;
    }

    match self.sub.detect_inconsistency() {
      Some(reason) => {
        self.reasons.push(reason);
        false
      }
      None => {
        self.reasons.push(Vec::new());
        true
      }
    }
  }

  fn calc_reason(&mut self, _solver: &mut Solver<'p>, _p: Option<Literal>,
                 extra: Option<Literal>, out_reason: &mut LiteralVector) {
    let reason = self.reasons.last().expect("reason frame");
    assert!(!reason.is_empty());
    out_reason.extend(reason.iter().copied());
    if let Some(e) = extra {
      out_reason.push(e);
    }
  }

  fn undo(&mut self, _solver: &mut Solver<'p>, p: Literal) {
    self.sub.undo(p);
    self.reasons.pop();
  }
}
