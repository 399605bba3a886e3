//! Random behavior simulation for Specl state machines.

pub mod coverage;
pub mod guarded;
pub mod liveness;
pub mod model;
pub mod progress;
pub mod rng;
pub mod sampler;
pub mod simulator;
pub mod state;
pub mod trace;
pub mod value;

pub use coverage::{CoverageCounts, CoverageEntry, CoverageTracker};
pub use guarded::GuardedModel;
pub use liveness::{LivenessCheck, LivenessViolation, NoLiveness};
pub use model::{EvalError, EvalResult, Model};
pub use progress::{LogSink, ProgressEvent, ProgressSink, SimCounters};
pub use rng::SimRng;
pub use simulator::{
    LocalValues, SimConfig, SimError, SimResult, SimulationReport, Simulator, Summary, Termination,
    Violation, ViolationKind,
};
pub use state::{Fingerprint, Location, State};
pub use value::Value;
