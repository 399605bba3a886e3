//! The interface the simulator consumes from a compiled model.
//!
//! Everything behind this trait (parsing, next-state evaluation, predicate
//! evaluation) belongs to the front end. The simulator only asks for initial
//! states, successors of one action, and verdicts of named predicates.

use crate::coverage::CoverageCounts;
use crate::state::State;
use thiserror::Error;

/// Failure while evaluating part of a model against concrete states.
///
/// Distinct from a predicate evaluating to `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("type error: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("index out of bounds: {index}")]
    IndexOutOfBounds { index: i64 },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Other(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

/// A state-transition system that can be simulated.
///
/// The lists of actions, invariants and implied actions are fixed for the
/// lifetime of the model; indices passed back into the model refer to them.
pub trait Model {
    /// Variable names, in variable-index order.
    fn var_names(&self) -> &[String];

    /// Display names of the actions, in action-index order.
    fn action_names(&self) -> &[String];

    fn invariant_names(&self) -> &[String];

    fn implied_action_names(&self) -> &[String];

    /// All states satisfying the initial predicate. Called once per run.
    fn initial_states(&self) -> EvalResult<Vec<State>>;

    /// Successors of `state` under the action at `action`. May be empty.
    fn successors(&self, action: usize, state: &State) -> EvalResult<Vec<State>>;

    /// Whether every variable of `state` is determined.
    fn is_complete(&self, state: &State) -> bool {
        state.is_complete()
    }

    /// Whether `state` satisfies the state constraints of the model.
    fn in_model(&self, _state: &State) -> EvalResult<bool> {
        Ok(true)
    }

    /// Whether the step `prior -> next` satisfies the action constraints.
    fn in_actions(&self, _prior: &State, _next: &State) -> EvalResult<bool> {
        Ok(true)
    }

    fn check_invariant(&self, idx: usize, state: &State) -> EvalResult<bool>;

    fn check_implied_action(&self, idx: usize, prior: &State, next: &State) -> EvalResult<bool>;

    /// Per-location counts known before the run starts (every action location
    /// with its static count), merged into coverage reports.
    fn static_coverage(&self) -> CoverageCounts {
        CoverageCounts::new()
    }
}
