//! Temporal property checking over simulated behaviors.

use crate::state::State;
use thiserror::Error;

/// A temporal property does not hold on a simulated behavior.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("temporal property '{property}' violated: {message}")]
pub struct LivenessViolation {
    pub property: String,
    pub message: String,
}

/// Checks temporal properties over one complete behavior at a time.
pub trait LivenessCheck {
    fn check_trace(&mut self, trace: &[State]) -> Result<(), LivenessViolation>;
}

/// Used when the model has no temporal properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLiveness;

impl LivenessCheck for NoLiveness {
    fn check_trace(&mut self, _trace: &[State]) -> Result<(), LivenessViolation> {
        Ok(())
    }
}

impl<F> LivenessCheck for F
where
    F: FnMut(&[State]) -> Result<(), LivenessViolation>,
{
    fn check_trace(&mut self, trace: &[State]) -> Result<(), LivenessViolation> {
        self(trace)
    }
}
