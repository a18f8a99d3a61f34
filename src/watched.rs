/*!

A watched element is an element of the SAT solver watch list: a pair (blocking literal,
clause reference), where the blocking literal is some literal of the clause. If the blocking
literal is already true the clause is satisfied and need not be inspected at all.

Custom theory constraints do not use blocking literals; they register persistently on a
literal and are notified whenever it becomes true. Their watch lists are plain vectors of
constraint references kept by the solver.

*/

use crate::clause::ClauseRef;
use crate::literal::Literal;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Watched {
  pub blocker: Literal,
  pub clause : ClauseRef,
}

pub type WatchList = Vec<Watched>;
