//! Behavior recording and trace files.

use crate::state::State;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const MAX_PREALLOC: usize = 1 << 16;

/// States of the behavior currently being simulated, in time order.
///
/// Capacity is reserved up front for the configured depth (up to
/// `MAX_PREALLOC` states); `clear` keeps it.
#[derive(Debug)]
pub struct TraceBuffer {
    states: Vec<State>,
    /// Maximum length (0 = unlimited).
    depth: usize,
}

impl TraceBuffer {
    pub fn new(depth: usize) -> Self {
        Self {
            states: Vec::with_capacity(depth.min(MAX_PREALLOC)),
            depth,
        }
    }

    pub fn push(&mut self, state: State) {
        debug_assert!(self.depth == 0 || self.states.len() < self.depth);
        self.states.push(state);
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.states.capacity()
    }

    pub fn as_slice(&self) -> &[State] {
        &self.states
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    /// Copy of the buffer, followed by `extra` if given.
    pub fn snapshot_with(&self, extra: Option<&State>) -> Vec<State> {
        let mut trace = Vec::with_capacity(self.states.len() + 1);
        trace.extend(self.states.iter().cloned());
        trace.extend(extra.cloned());
        trace
    }
}

/// Path of the trace file for the `trace_num`-th behavior (1-based): the
/// prefix with the number appended.
pub fn trace_file_path(prefix: &Path, trace_num: u64) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(trace_num.to_string());
    PathBuf::from(name)
}

/// Write one behavior as a module of numbered state definitions.
pub fn write_trace_module(path: &Path, trace: &[State], var_names: &[String]) -> io::Result<()> {
    let module = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "---------------- MODULE {} -----------------", module)?;
    for (i, state) in trace.iter().enumerate() {
        writeln!(out, "STATE_{} == ", i + 1)?;
        writeln!(out, "{}\n", state.display_with(var_names))?;
    }
    writeln!(out, "=================================================")?;
    out.flush()
}
