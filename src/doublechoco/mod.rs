/*!

  Doublechoco: divide the board into blocks of white and black cells so that every block
  consists of one white and one black unit of the same shape (up to rotation/reflection) and
  size; a clue number fixes the size of each unit of its block.

*/

mod balancer;
mod board;
mod problem;
mod propagator;
mod shape;
mod solver;

pub use balancer::Balancer;
pub use board::{Border, BoardInfo, BoardManager};
pub use problem::Problem;
pub use propagator::Propagator;
pub use shape::Shape;
pub use solver::{find_answer, solve, solve_with_config, Answer, Config};
