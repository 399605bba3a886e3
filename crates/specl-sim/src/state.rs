//! State representation for simulation.

use crate::value::Value;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

/// A fingerprint is a 64-bit hash identifying a state.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:016x})", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Hash a single variable at a given position.
/// Int/Bool take a splitmix-style fast path; everything else goes through AHash.
#[inline]
fn hash_var(idx: usize, val: &Value) -> u64 {
    match val {
        Value::Int(n) => {
            let h = ((idx as u64) ^ 0x2d358dccaa6c78a5).wrapping_mul(0x9e3779b97f4a7c15);
            let h = (h ^ (*n as u64)).wrapping_mul(0x517cc1b727220a95);
            h ^ (h >> 32)
        }
        Value::Bool(b) => {
            let h = ((idx as u64) ^ 0x2d358dccaa6c78a5).wrapping_mul(0x9e3779b97f4a7c15);
            let h = (h ^ (*b as u64)).wrapping_mul(0x517cc1b727220a95);
            h ^ (h >> 32)
        }
        _ => {
            // Fixed keys: fingerprints must agree across runs for a given seed.
            let mut hasher = ahash::RandomState::with_seeds(1, 2, 3, 4).build_hasher();
            idx.hash(&mut hasher);
            val.hash(&mut hasher);
            hasher.finish()
        }
    }
}

fn compute_fingerprint(vars: &[Value]) -> Fingerprint {
    let mut h: u64 = 0;
    for (i, var) in vars.iter().enumerate() {
        h ^= hash_var(i, var);
    }
    Fingerprint(h)
}

/// Source location of an action in the model text, used as the coverage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub module: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(module: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            module: module.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, col {} of module {}",
            self.line, self.column, self.module
        )
    }
}

/// A state in the model, represented as a vector of variable values.
///
/// Cloning is an `Arc` increment. The fingerprint is cached at construction
/// time. `origin` lists the action locations that produced the state and is
/// ignored by equality.
#[derive(Debug, Clone)]
pub struct State {
    /// Variable values indexed by variable index.
    pub vars: Arc<Vec<Value>>,
    fp: Fingerprint,
    origin: SmallVec<[Location; 1]>,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.fp == other.fp && self.vars == other.vars
    }
}

impl Eq for State {}

impl State {
    pub fn new(vars: Vec<Value>) -> Self {
        let fp = compute_fingerprint(&vars);
        Self {
            vars: Arc::new(vars),
            fp,
            origin: SmallVec::new(),
        }
    }

    /// Create an empty state with the given number of variables, all undetermined.
    pub fn empty(num_vars: usize) -> Self {
        Self::new(vec![Value::None; num_vars])
    }

    /// Attach the location of the action that produced this state.
    pub fn produced_by(mut self, loc: Location) -> Self {
        self.origin.push(loc);
        self
    }

    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fp
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Action locations that fired to produce this state. Empty for initial states.
    pub fn origin(&self) -> &[Location] {
        &self.origin
    }

    /// Whether every variable has a determined value.
    pub fn is_complete(&self) -> bool {
        self.vars.iter().all(Value::is_determined)
    }

    /// Render as `/\ name = value` lines, one per variable.
    pub fn display_with<'a>(&'a self, var_names: &'a [String]) -> NamedState<'a> {
        NamedState {
            state: self,
            var_names,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// A state paired with its variable names for display.
pub struct NamedState<'a> {
    state: &'a State,
    var_names: &'a [String],
}

impl fmt::Display for NamedState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.state.vars.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let name = self.var_names.get(i).map(|s| s.as_str()).unwrap_or("?");
            write!(f, "/\\ {} = {}", name, v)?;
        }
        Ok(())
    }
}
