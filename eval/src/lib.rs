//! The three per-material evaluator collaborators, and the present/absent
//! wrapper the core uses to represent "this material has no such
//! evaluator" as ordinary control flow rather than an error.

mod slot;
mod traits;

pub use slot::{Roster, Slot};
pub use traits::{EosEvaluator, EvalError, SurrogateEvaluator, UqCache};
