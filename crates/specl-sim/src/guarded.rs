//! Closure-backed models.
//!
//! `GuardedModel` describes a state machine directly in Rust: each action is a
//! function from the current variable values to the list of successor
//! valuations (empty when its guard is false). It is how tests, benches and
//! the bundled CLI models feed the simulator without a front end.

use crate::coverage::CoverageCounts;
use crate::model::{EvalError, EvalResult, Model};
use crate::state::{Location, State};
use crate::value::Value;

type InitFn = Box<dyn Fn() -> EvalResult<Vec<Vec<Value>>>>;
type ActionFn = Box<dyn Fn(&[Value]) -> EvalResult<Vec<Vec<Value>>>>;
type StatePred = Box<dyn Fn(&[Value]) -> EvalResult<bool>>;
type StepPred = Box<dyn Fn(&[Value], &[Value]) -> EvalResult<bool>>;

struct GuardedAction {
    location: Location,
    next: ActionFn,
}

pub struct GuardedModel {
    module: String,
    var_names: Vec<String>,
    init: Vec<Vec<Value>>,
    init_fn: Option<InitFn>,
    action_names: Vec<String>,
    actions: Vec<GuardedAction>,
    invariant_names: Vec<String>,
    invariants: Vec<StatePred>,
    implied_names: Vec<String>,
    implied: Vec<StepPred>,
    state_constraint: Option<StatePred>,
    action_constraint: Option<StepPred>,
}

impl GuardedModel {
    pub fn new(module: &str, vars: &[&str]) -> Self {
        Self {
            module: module.to_string(),
            var_names: vars.iter().map(|v| v.to_string()).collect(),
            init: Vec::new(),
            init_fn: None,
            action_names: Vec::new(),
            actions: Vec::new(),
            invariant_names: Vec::new(),
            invariants: Vec::new(),
            implied_names: Vec::new(),
            implied: Vec::new(),
            state_constraint: None,
            action_constraint: None,
        }
    }

    /// Add one initial state.
    pub fn init(mut self, vars: Vec<Value>) -> Self {
        self.init.push(vars);
        self
    }

    /// Compute the initial states with `f` instead of the fixed list.
    pub fn init_fn(mut self, f: impl Fn() -> EvalResult<Vec<Vec<Value>>> + 'static) -> Self {
        self.init_fn = Some(Box::new(f));
        self
    }

    /// Add an action; its coverage location is derived from declaration order.
    pub fn action(
        self,
        name: &str,
        next: impl Fn(&[Value]) -> EvalResult<Vec<Vec<Value>>> + 'static,
    ) -> Self {
        let line = self.actions.len() as u32 + 1;
        let location = Location::new(self.module.as_str(), line, 1);
        self.action_at(name, location, next)
    }

    pub fn action_at(
        mut self,
        name: &str,
        location: Location,
        next: impl Fn(&[Value]) -> EvalResult<Vec<Vec<Value>>> + 'static,
    ) -> Self {
        self.action_names.push(name.to_string());
        self.actions.push(GuardedAction {
            location,
            next: Box::new(next),
        });
        self
    }

    pub fn invariant(
        mut self,
        name: &str,
        pred: impl Fn(&[Value]) -> EvalResult<bool> + 'static,
    ) -> Self {
        self.invariant_names.push(name.to_string());
        self.invariants.push(Box::new(pred));
        self
    }

    pub fn implied_action(
        mut self,
        name: &str,
        pred: impl Fn(&[Value], &[Value]) -> EvalResult<bool> + 'static,
    ) -> Self {
        self.implied_names.push(name.to_string());
        self.implied.push(Box::new(pred));
        self
    }

    pub fn state_constraint(mut self, pred: impl Fn(&[Value]) -> EvalResult<bool> + 'static) -> Self {
        self.state_constraint = Some(Box::new(pred));
        self
    }

    pub fn action_constraint(
        mut self,
        pred: impl Fn(&[Value], &[Value]) -> EvalResult<bool> + 'static,
    ) -> Self {
        self.action_constraint = Some(Box::new(pred));
        self
    }

    fn check_arity(&self, vars: &[Value]) -> EvalResult<()> {
        if vars.len() != self.var_names.len() {
            return Err(EvalError::Other(format!(
                "expected {} variables, got {}",
                self.var_names.len(),
                vars.len()
            )));
        }
        Ok(())
    }
}

impl Model for GuardedModel {
    fn var_names(&self) -> &[String] {
        &self.var_names
    }

    fn action_names(&self) -> &[String] {
        &self.action_names
    }

    fn invariant_names(&self) -> &[String] {
        &self.invariant_names
    }

    fn implied_action_names(&self) -> &[String] {
        &self.implied_names
    }

    fn initial_states(&self) -> EvalResult<Vec<State>> {
        let valuations = match &self.init_fn {
            Some(f) => f()?,
            None => self.init.clone(),
        };
        valuations
            .into_iter()
            .map(|vars| {
                self.check_arity(&vars)?;
                Ok(State::new(vars))
            })
            .collect()
    }

    fn successors(&self, action: usize, state: &State) -> EvalResult<Vec<State>> {
        let action = self
            .actions
            .get(action)
            .ok_or(EvalError::IndexOutOfBounds {
                index: action as i64,
            })?;
        let next = (action.next)(&state.vars)?;
        next.into_iter()
            .map(|vars| {
                self.check_arity(&vars)?;
                Ok(State::new(vars).produced_by(action.location.clone()))
            })
            .collect()
    }

    fn in_model(&self, state: &State) -> EvalResult<bool> {
        match &self.state_constraint {
            Some(pred) => pred(&state.vars),
            None => Ok(true),
        }
    }

    fn in_actions(&self, prior: &State, next: &State) -> EvalResult<bool> {
        match &self.action_constraint {
            Some(pred) => pred(&prior.vars, &next.vars),
            None => Ok(true),
        }
    }

    fn check_invariant(&self, idx: usize, state: &State) -> EvalResult<bool> {
        match self.invariants.get(idx) {
            Some(pred) => pred(&state.vars),
            None => Err(EvalError::IndexOutOfBounds { index: idx as i64 }),
        }
    }

    fn check_implied_action(&self, idx: usize, prior: &State, next: &State) -> EvalResult<bool> {
        match self.implied.get(idx) {
            Some(pred) => pred(&prior.vars, &next.vars),
            None => Err(EvalError::IndexOutOfBounds { index: idx as i64 }),
        }
    }

    fn static_coverage(&self) -> CoverageCounts {
        self.actions
            .iter()
            .map(|a| (a.location.to_string(), 0))
            .collect()
    }
}
