//! Random behavior simulation.
//!
//! Instead of enumerating the state space, the simulator repeatedly walks one
//! random behavior from a random initial state. At every step it generates
//! the successors of a randomly chosen action, checks all of them (invariants,
//! implied actions, completeness) and continues from one of them at random.
//! Each finished behavior goes to the liveness checker and, optionally, to a
//! trace file.

use crate::coverage::{CoverageEntry, CoverageTracker};
use crate::liveness::{LivenessCheck, LivenessViolation, NoLiveness};
use crate::model::{EvalError, Model};
use crate::progress::{LogSink, ProgressEvent, ProgressReporter, ProgressSink, SimCounters};
use crate::rng::SimRng;
use crate::sampler::{random_next_states, random_state};
use crate::state::State;
use crate::trace::{trace_file_path, write_trace_module, TraceBuffer};
use crate::value::Value;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that abort a simulation before the first behavior is generated.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no initial states satisfy init predicate")]
    NoInitialStates,

    #[error("initial state is not completely specified: {state}")]
    IncompleteInitialState { state: State },

    #[error("invariant '{name}' violated by initial state {state}")]
    InitialInvariantViolation { name: String, state: State },

    #[error("error computing or checking initial states: {source}")]
    InitialEvaluation {
        source: EvalError,
        state: Option<State>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

/// Configuration for the simulator.
pub struct SimConfig {
    /// Number of behaviors to generate (0 = unlimited).
    pub num_traces: u64,
    /// Maximum number of states per behavior (0 = unlimited).
    pub trace_depth: usize,
    /// Seed of the random stream.
    pub seed: u64,
    /// Position in the random stream to start from (0 = beginning). Together
    /// with `seed` this reproduces a behavior reported at that aril.
    pub aril: u64,
    /// Keep going after a violation instead of stopping the run.
    pub continue_on_violation: bool,
    /// Whether to report deadlocks.
    pub check_deadlock: bool,
    /// Whether to count action coverage.
    pub coverage: bool,
    /// Time between progress reports.
    pub progress_interval: Duration,
    /// Time between coverage reports (rounded to whole progress intervals).
    pub coverage_interval: Duration,
    /// If set, write behavior `n` to `<prefix>n`.
    pub trace_output: Option<PathBuf>,
    /// Where progress events go (None = log them).
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_traces: 0,
            trace_depth: 100,
            seed: 0,
            aril: 0,
            continue_on_violation: false,
            check_deadlock: true,
            coverage: false,
            progress_interval: Duration::from_secs(60),
            coverage_interval: Duration::from_secs(60),
            trace_output: None,
            progress: None,
        }
    }
}

impl Clone for SimConfig {
    fn clone(&self) -> Self {
        Self {
            num_traces: self.num_traces,
            trace_depth: self.trace_depth,
            seed: self.seed,
            aril: self.aril,
            continue_on_violation: self.continue_on_violation,
            check_deadlock: self.check_deadlock,
            coverage: self.coverage,
            progress_interval: self.progress_interval,
            coverage_interval: self.coverage_interval,
            trace_output: self.trace_output.clone(),
            progress: self.progress.clone(),
        }
    }
}

impl std::fmt::Debug for SimConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimConfig")
            .field("num_traces", &self.num_traces)
            .field("trace_depth", &self.trace_depth)
            .field("seed", &self.seed)
            .field("aril", &self.aril)
            .field("continue_on_violation", &self.continue_on_violation)
            .field("check_deadlock", &self.check_deadlock)
            .field("coverage", &self.coverage)
            .field("progress_interval", &self.progress_interval)
            .field("coverage_interval", &self.coverage_interval)
            .field("trace_output", &self.trace_output)
            .field("progress", &self.progress.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Final statistics of a run; `(seed, aril)` locates the last behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub states_generated: u64,
    pub traces: u64,
    pub seed: u64,
    pub aril: u64,
}

/// What went wrong in a behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Invariant { name: String },
    InvariantEvaluation { name: String, message: String },
    ActionProperty { name: String },
    ActionPropertyEvaluation { name: String, message: String },
    Deadlock,
    IncompleteState,
    /// Any other failure while generating the behavior.
    Failure { message: String },
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::Invariant { name } => write!(f, "invariant '{}' violated", name),
            ViolationKind::InvariantEvaluation { name, message } => {
                write!(f, "error evaluating invariant '{}': {}", name, message)
            }
            ViolationKind::ActionProperty { name } => {
                write!(f, "action property '{}' violated", name)
            }
            ViolationKind::ActionPropertyEvaluation { name, message } => {
                write!(f, "error evaluating action property '{}': {}", name, message)
            }
            ViolationKind::Deadlock => write!(f, "deadlock reached"),
            ViolationKind::IncompleteState => {
                write!(f, "successor state is not completely specified")
            }
            ViolationKind::Failure { message } => write!(f, "simulation failed: {}", message),
        }
    }
}

/// A reported violation with the behavior that led to it.
#[derive(Debug, Clone)]
pub struct Violation {
    pub kind: ViolationKind,
    /// The behavior up to the offending state (the offending state last, when
    /// there is one). With unlimited trace depth, only the last state.
    pub trace: Vec<State>,
    /// 1-based number of the behavior.
    pub trace_num: u64,
    /// Random stream position at the start of the behavior.
    pub aril: u64,
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// All behaviors generated without a stopping violation.
    Completed,
    /// Stopped at the last entry of `violations`.
    Violation,
    /// A temporal property failed on a behavior.
    Liveness(LivenessViolation),
    /// Cancelled before the run started.
    Cancelled,
}

#[derive(Debug)]
pub struct SimulationReport {
    pub summary: Summary,
    pub violations: Vec<Violation>,
    pub termination: Termination,
    /// Final coverage report (only when coverage is enabled).
    pub coverage: Option<Vec<CoverageEntry>>,
}

impl SimulationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty() && self.termination == Termination::Completed
    }
}

/// Scratch bindings indexed by slot. Grows on write; reads past the end are absent.
#[derive(Debug, Default)]
pub struct LocalValues {
    values: Vec<Option<Value>>,
}

impl LocalValues {
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx).and_then(Option::as_ref)
    }

    pub fn set(&mut self, idx: usize, value: Value) {
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }
}

/// How a behavior ended.
enum TrialEnd {
    Continue,
    Stop,
}

/// Failures that end the run from inside a behavior.
enum TrialError {
    Liveness(LivenessViolation),
    Eval(EvalError),
}

impl From<EvalError> for TrialError {
    fn from(e: EvalError) -> Self {
        TrialError::Eval(e)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Random simulator over a model.
pub struct Simulator<M: Model> {
    model: M,
    config: SimConfig,
    liveness: Box<dyn LivenessCheck>,
    rng: SimRng,
    counters: Arc<SimCounters>,
    coverage: Arc<CoverageTracker>,
    cancelled: Arc<AtomicBool>,
    /// Random stream position at the start of the current behavior.
    aril: u64,
    locals: LocalValues,
}

impl<M: Model> Simulator<M> {
    pub fn new(model: M, config: SimConfig) -> Self {
        Self::with_liveness(model, config, NoLiveness)
    }

    pub fn with_liveness(
        model: M,
        config: SimConfig,
        liveness: impl LivenessCheck + 'static,
    ) -> Self {
        let coverage = CoverageTracker::new(config.coverage, model.static_coverage());
        let rng = SimRng::resume(config.seed, config.aril);
        let aril = rng.aril();
        Self {
            model,
            config,
            liveness: Box::new(liveness),
            rng,
            counters: Arc::new(SimCounters::new()),
            coverage: Arc::new(coverage),
            cancelled: Arc::new(AtomicBool::new(false)),
            aril,
            locals: LocalValues::default(),
        }
    }

    /// Cancel (or un-cancel) the next run. Only checked when a run starts.
    pub fn set_cancel_flag(&self, flag: bool) {
        self.cancelled.store(flag, Ordering::Relaxed);
    }

    /// Shared handle to the cancel flag.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn local_value(&self, idx: usize) -> Option<&Value> {
        self.locals.get(idx)
    }

    pub fn set_local_value(&mut self, idx: usize, value: Value) {
        self.locals.set(idx, value);
    }

    pub fn counters(&self) -> Arc<SimCounters> {
        Arc::clone(&self.counters)
    }

    pub fn coverage_report(&self) -> Vec<CoverageEntry> {
        self.coverage.report()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            states_generated: self.counters.states_generated(),
            traces: self.counters.traces(),
            seed: self.rng.seed(),
            aril: self.aril,
        }
    }

    /// Run the simulation.
    ///
    /// Returns `Err` only if the initial states are unusable. Every violation
    /// found while generating behaviors is part of the returned report.
    pub fn run(&mut self) -> SimResult<SimulationReport> {
        if self.cancelled.load(Ordering::Relaxed) {
            info!("simulation cancelled");
            return Ok(SimulationReport {
                summary: self.summary(),
                violations: Vec::new(),
                termination: Termination::Cancelled,
                coverage: None,
            });
        }

        let initial_states = self.initial_states()?;
        info!(count = initial_states.len(), "generated initial states");
        info!(
            seed = self.config.seed,
            aril = self.config.aril,
            traces = self.config.num_traces,
            depth = self.config.trace_depth,
            "simulating"
        );

        let sink: Arc<dyn ProgressSink> = match &self.config.progress {
            Some(sink) => Arc::clone(sink),
            None => Arc::new(LogSink),
        };
        let mut reporter = ProgressReporter::spawn(
            Arc::clone(&self.counters),
            Arc::clone(&self.coverage),
            Arc::clone(&sink),
            self.config.progress_interval,
            self.config.coverage_interval,
        );

        let start = Instant::now();
        let mut violations = Vec::new();
        let termination = self.simulate_traces(&initial_states, &mut violations);
        reporter.stop();

        let summary = self.summary();
        sink.report(&ProgressEvent::Progress {
            states_generated: summary.states_generated,
            traces: summary.traces,
            memory_mb: None,
        });
        let coverage = self.coverage.is_enabled().then(|| self.coverage.report());
        if let Some(entries) = &coverage {
            sink.report(&ProgressEvent::Coverage(entries.clone()));
        }
        info!(
            states = summary.states_generated,
            traces = summary.traces,
            seed = summary.seed,
            aril = summary.aril,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "simulation finished"
        );

        Ok(SimulationReport {
            summary,
            violations,
            termination,
            coverage,
        })
    }

    /// Compute the initial states once and check each of them.
    fn initial_states(&self) -> SimResult<Vec<State>> {
        let states = self
            .model
            .initial_states()
            .map_err(|source| SimError::InitialEvaluation {
                source,
                state: None,
            })?;
        self.counters
            .states_generated
            .store(states.len() as u64, Ordering::Relaxed);
        self.counters.traces.store(0, Ordering::Relaxed);

        for state in &states {
            if !self.model.is_complete(state) {
                return Err(SimError::IncompleteInitialState {
                    state: state.clone(),
                });
            }
            for (idx, name) in self.model.invariant_names().iter().enumerate() {
                match self.model.check_invariant(idx, state) {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(SimError::InitialInvariantViolation {
                            name: name.clone(),
                            state: state.clone(),
                        })
                    }
                    Err(source) => {
                        return Err(SimError::InitialEvaluation {
                            source,
                            state: Some(state.clone()),
                        })
                    }
                }
            }
        }

        if states.is_empty() {
            return Err(SimError::NoInitialStates);
        }
        Ok(states)
    }

    /// Generate behaviors until the configured number is reached or a
    /// violation stops the run.
    fn simulate_traces(
        &mut self,
        initial_states: &[State],
        violations: &mut Vec<Violation>,
    ) -> Termination {
        let mut trace = TraceBuffer::new(self.config.trace_depth);
        let mut trace_num = 0u64;

        while self.config.num_traces == 0 || trace_num < self.config.num_traces {
            trace_num += 1;
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                self.simulate_trace(trace_num, initial_states, &mut trace, violations)
            }));
            let message = match result {
                Ok(Ok(TrialEnd::Continue)) => continue,
                Ok(Ok(TrialEnd::Stop)) => return Termination::Violation,
                Ok(Err(TrialError::Liveness(v))) => {
                    warn!(trace = trace_num, aril = self.aril, "{}", v);
                    return Termination::Liveness(v);
                }
                Ok(Err(TrialError::Eval(e))) => e.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            self.report(
                violations,
                ViolationKind::Failure { message },
                trace.snapshot_with(None),
                trace_num,
            );
            return Termination::Violation;
        }
        Termination::Completed
    }

    /// Generate and check one behavior.
    fn simulate_trace(
        &mut self,
        trace_num: u64,
        initial_states: &[State],
        trace: &mut TraceBuffer,
        violations: &mut Vec<Violation>,
    ) -> Result<TrialEnd, TrialError> {
        self.aril = self.rng.aril();
        self.counters.traces.fetch_add(1, Ordering::Relaxed);
        trace.clear();

        let mut current = random_state(&mut self.rng, initial_states)
            .cloned()
            .ok_or_else(|| EvalError::Other("no initial state to choose from".into()))?;
        let mut in_constraints = self.model.in_model(&current)?;
        let continue_on_violation = self.config.continue_on_violation;
        let depth = self.config.trace_depth;

        while depth == 0 || trace.len() < depth {
            trace.push(current.clone());
            if !in_constraints {
                break;
            }

            let Some(next_states) = random_next_states(&self.model, &mut self.rng, &current)?
            else {
                if self.config.check_deadlock {
                    self.report(
                        violations,
                        ViolationKind::Deadlock,
                        trace.snapshot_with(None),
                        trace_num,
                    );
                    if !continue_on_violation {
                        return Ok(TrialEnd::Stop);
                    }
                }
                break;
            };

            // Check every successor before all but one are discarded.
            for state in &next_states {
                self.counters
                    .states_generated
                    .fetch_add(1, Ordering::Relaxed);
                self.coverage.record(state);

                if !self.model.is_complete(state) {
                    self.report(
                        violations,
                        ViolationKind::IncompleteState,
                        trace.snapshot_with(Some(state)),
                        trace_num,
                    );
                    return Ok(TrialEnd::Stop);
                }

                for (idx, name) in self.model.invariant_names().iter().enumerate() {
                    let kind = match self.model.check_invariant(idx, state) {
                        Ok(true) => continue,
                        Ok(false) => ViolationKind::Invariant { name: name.clone() },
                        Err(e) => ViolationKind::InvariantEvaluation {
                            name: name.clone(),
                            message: e.to_string(),
                        },
                    };
                    let fatal = !continue_on_violation
                        || matches!(kind, ViolationKind::InvariantEvaluation { .. });
                    self.report(violations, kind, trace.snapshot_with(Some(state)), trace_num);
                    if fatal {
                        return Ok(TrialEnd::Stop);
                    }
                }

                for (idx, name) in self.model.implied_action_names().iter().enumerate() {
                    let kind = match self.model.check_implied_action(idx, &current, state) {
                        Ok(true) => continue,
                        Ok(false) => ViolationKind::ActionProperty { name: name.clone() },
                        Err(e) => ViolationKind::ActionPropertyEvaluation {
                            name: name.clone(),
                            message: e.to_string(),
                        },
                    };
                    let fatal = !continue_on_violation
                        || matches!(kind, ViolationKind::ActionPropertyEvaluation { .. });
                    self.report(violations, kind, trace.snapshot_with(Some(state)), trace_num);
                    if fatal {
                        return Ok(TrialEnd::Stop);
                    }
                }
            }

            let next = random_state(&mut self.rng, &next_states)
                .cloned()
                .ok_or_else(|| EvalError::Other("empty successor set".into()))?;
            in_constraints =
                self.model.in_model(&next)? && self.model.in_actions(&current, &next)?;
            current = next;
        }

        debug!(trace = trace_num, length = trace.len(), "behavior generated");
        self.liveness
            .check_trace(trace.as_slice())
            .map_err(TrialError::Liveness)?;

        if let Some(prefix) = &self.config.trace_output {
            let path = trace_file_path(prefix, trace_num);
            if let Err(e) = write_trace_module(&path, trace.as_slice(), self.model.var_names()) {
                error!(path = %path.display(), error = %e, "failed to write trace file");
            }
        }
        Ok(TrialEnd::Continue)
    }

    fn report(
        &self,
        violations: &mut Vec<Violation>,
        kind: ViolationKind,
        mut trace: Vec<State>,
        trace_num: u64,
    ) {
        // With unlimited depth only the offending state is kept.
        if self.config.trace_depth == 0 {
            if let Some(last) = trace.pop() {
                trace = vec![last];
            }
        }
        warn!(
            trace = trace_num,
            aril = self.aril,
            length = trace.len(),
            fingerprint = ?trace.last().map(State::fingerprint),
            "{}",
            kind
        );
        violations.push(Violation {
            kind,
            trace,
            trace_num,
            aril: self.aril,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guarded::GuardedModel;

    fn quiet(config: SimConfig) -> SimConfig {
        SimConfig {
            progress: Some(Arc::new(|_: &ProgressEvent| {})),
            ..config
        }
    }

    fn counter(max: i64) -> GuardedModel {
        GuardedModel::new("Counter", &["count"])
            .init(vec![Value::int(0)])
            .action("Inc", move |v| {
                let n = v[0].as_int().unwrap_or(0);
                Ok(if n < max { vec![vec![Value::int(n + 1)]] } else { vec![] })
            })
    }

    #[test]
    fn test_local_values_grow_on_demand() {
        let mut locals = LocalValues::default();
        assert!(locals.get(0).is_none());
        assert!(locals.get(100).is_none());
        locals.set(9, Value::int(4));
        assert_eq!(locals.get(9), Some(&Value::int(4)));
        assert!(locals.get(3).is_none());
        assert!(locals.get(10).is_none());
    }

    #[test]
    fn test_simulator_local_values() {
        let mut sim = Simulator::new(counter(1), quiet(SimConfig::default()));
        sim.set_local_value(2, Value::bool(true));
        assert_eq!(sim.local_value(2), Some(&Value::bool(true)));
        assert!(sim.local_value(7).is_none());
    }

    #[test]
    fn test_cancelled_before_run_does_nothing() {
        let mut sim = Simulator::new(counter(3), quiet(SimConfig::default()));
        sim.set_cancel_flag(true);
        let report = sim.run().unwrap();
        assert_eq!(report.termination, Termination::Cancelled);
        assert_eq!(report.summary.states_generated, 0);
        assert_eq!(report.summary.traces, 0);
    }

    #[test]
    fn test_counter_deadlock_when_bounded() {
        let config = quiet(SimConfig {
            num_traces: 3,
            trace_depth: 10,
            ..Default::default()
        });
        let report = Simulator::new(counter(2), config).run().unwrap();
        assert_eq!(report.termination, Termination::Violation);
        assert_eq!(report.violations.len(), 1);
        let v = &report.violations[0];
        assert_eq!(v.kind, ViolationKind::Deadlock);
        assert_eq!(v.trace.len(), 3);
        assert_eq!(v.trace_num, 1);
    }

    #[test]
    fn test_deadlock_ignored_when_disabled() {
        let config = quiet(SimConfig {
            num_traces: 4,
            trace_depth: 10,
            check_deadlock: false,
            ..Default::default()
        });
        let report = Simulator::new(counter(2), config).run().unwrap();
        assert!(report.is_ok());
        assert_eq!(report.summary.traces, 4);
        // 1 initial state + 2 successors per behavior
        assert_eq!(report.summary.states_generated, 1 + 4 * 2);
    }

    #[test]
    fn test_state_constraint_truncates() {
        let model = counter(100).state_constraint(|v| Ok(v[0].as_int().is_some_and(|n| n < 3)));
        let config = quiet(SimConfig {
            num_traces: 2,
            trace_depth: 50,
            ..Default::default()
        });
        let report = Simulator::new(model, config).run().unwrap();
        assert!(report.is_ok());
        assert_eq!(report.summary.states_generated, 1 + 2 * 3);
    }

    #[test]
    fn test_eval_error_in_successors_is_general_failure() {
        let model = GuardedModel::new("Broken", &["x"])
            .init(vec![Value::int(0)])
            .action("Div", |_| Err(EvalError::DivisionByZero));
        let config = quiet(SimConfig {
            num_traces: 5,
            ..Default::default()
        });
        let report = Simulator::new(model, config).run().unwrap();
        assert_eq!(report.termination, Termination::Violation);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(
            report.violations[0].kind,
            ViolationKind::Failure {
                message: "division by zero".into()
            }
        );
        assert_eq!(report.violations[0].trace.len(), 1);
    }

    #[test]
    fn test_panic_in_model_is_contained() {
        let model = GuardedModel::new("Panicky", &["x"])
            .init(vec![Value::int(0)])
            .action("Boom", |_| panic!("model bug"));
        let config = quiet(SimConfig {
            num_traces: 5,
            ..Default::default()
        });
        let report = Simulator::new(model, config).run().unwrap();
        assert_eq!(
            report.violations[0].kind,
            ViolationKind::Failure {
                message: "model bug".into()
            }
        );
        assert_eq!(report.summary.traces, 1);
    }

    #[test]
    fn test_summary_reports_seed_and_aril() {
        let config = quiet(SimConfig {
            num_traces: 3,
            trace_depth: 5,
            seed: 1234,
            check_deadlock: false,
            ..Default::default()
        });
        let mut sim = Simulator::new(counter(10), config);
        let report = sim.run().unwrap();
        assert_eq!(report.summary.seed, 1234);
        assert!(report.summary.aril > 0);
        assert_eq!(report.summary, sim.summary());
    }

    #[test]
    fn test_config_debug_hides_sink() {
        let config = quiet(SimConfig::default());
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("progress: Some(\"...\")"));
    }

    #[test]
    fn test_cancel_through_shared_handle() {
        let mut sim = Simulator::new(counter(3), quiet(SimConfig::default()));
        let handle = sim.cancel_handle();
        handle.store(true, Ordering::Relaxed);
        let report = sim.run().unwrap();
        assert_eq!(report.termination, Termination::Cancelled);

        handle.store(false, Ordering::Relaxed);
        sim.config.num_traces = 2;
        sim.config.check_deadlock = false;
        let report = sim.run().unwrap();
        assert_eq!(report.termination, Termination::Completed);
        assert_eq!(report.summary.traces, 2);
    }

    #[test]
    fn test_rerun_reports_only_its_own_behaviors() {
        let config = quiet(SimConfig {
            num_traces: 5,
            trace_depth: 3,
            check_deadlock: false,
            ..Default::default()
        });
        let mut sim = Simulator::new(counter(10), config);
        let first = sim.run().unwrap().summary;
        let second = sim.run().unwrap().summary;
        assert_eq!(first.traces, 5);
        assert_eq!(second.traces, 5);
        assert_eq!(first.states_generated, 1 + 5 * 3);
        assert_eq!(second.states_generated, first.states_generated);
    }

    #[test]
    fn test_counters_and_coverage_match_report() {
        let config = quiet(SimConfig {
            num_traces: 4,
            trace_depth: 6,
            check_deadlock: false,
            coverage: true,
            ..Default::default()
        });
        let mut sim = Simulator::new(counter(3), config);
        let report = sim.run().unwrap();

        let counters = sim.counters();
        assert_eq!(counters.states_generated(), report.summary.states_generated);
        assert_eq!(counters.traces(), report.summary.traces);
        assert_eq!(Some(sim.coverage_report()), report.coverage);
        // every non-initial state came from Inc
        let coverage = sim.coverage_report();
        assert_eq!(coverage.len(), 1);
        assert_eq!(coverage[0].count, report.summary.states_generated - 1);
    }

    #[test]
    fn test_unlimited_depth_keeps_only_error_state() {
        let model = counter(100).invariant("Small", |v| Ok(v[0].as_int().is_some_and(|n| n < 4)));
        let config = quiet(SimConfig {
            num_traces: 1,
            trace_depth: 0,
            ..Default::default()
        });
        let report = Simulator::new(model, config).run().unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].trace, vec![State::new(vec![Value::int(4)])]);
    }

    #[test]
    fn test_unlimited_depth_deadlock_keeps_deadlocked_state() {
        let config = quiet(SimConfig {
            num_traces: 1,
            trace_depth: 0,
            ..Default::default()
        });
        let report = Simulator::new(counter(3), config).run().unwrap();
        assert_eq!(report.violations[0].kind, ViolationKind::Deadlock);
        assert_eq!(report.violations[0].trace, vec![State::new(vec![Value::int(3)])]);
    }
}
