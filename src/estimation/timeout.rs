//! Value sources used to bootstrap across time-limit episode ends.
//!
//! A time-limit truncation is an artifact of sampling, not an absorbing
//! state, so the timeout-aware estimators keep bootstrapping at such steps.
//! Where that bootstrap estimate comes from is up to the caller: either the
//! next value in the batch, or a value the agent computed on the truncated
//! observation before the environment was reset.

use ndarray::ArrayView2;

use crate::batch::ensure_shape;
use crate::error::ReturnsError;

/// Supplies the value estimate used at a `done && timeout` step.
///
/// Implementations are only queried for `step < T - 1`; a timeout on the
/// final sampled step always bootstraps from the batch's bootstrap value.
pub trait TimeoutValue {
    /// Value estimate of the state at which the episode in column `env` was
    /// truncated at `step`.
    fn value_at_timeout(&self, step: usize, env: usize) -> f64;

    /// Checks that this source can answer queries for a `[T, B]` batch.
    fn validate(&self, _shape: (usize, usize)) -> Result<(), ReturnsError> {
        Ok(())
    }
}

/// Bootstraps from the next value estimate in the batch, `value[step + 1]`.
#[derive(Debug, Clone, Copy)]
pub struct NextStepValue<'a> {
    value: ArrayView2<'a, f64>,
}

impl<'a> NextStepValue<'a> {
    pub fn new(value: ArrayView2<'a, f64>) -> Self {
        Self { value }
    }
}

impl TimeoutValue for NextStepValue<'_> {
    fn value_at_timeout(&self, step: usize, env: usize) -> f64 {
        self.value[[step + 1, env]]
    }

    fn validate(&self, shape: (usize, usize)) -> Result<(), ReturnsError> {
        ensure_shape("value", &self.value, &[shape.0, shape.1])
    }
}

/// Bootstraps from agent-supplied estimates of the truncated states.
#[derive(Debug, Clone, Copy)]
pub struct TruncatedStateValues<'a> {
    values: ArrayView2<'a, f64>,
}

impl<'a> TruncatedStateValues<'a> {
    pub fn new(values: ArrayView2<'a, f64>) -> Self {
        Self { values }
    }
}

impl TimeoutValue for TruncatedStateValues<'_> {
    fn value_at_timeout(&self, step: usize, env: usize) -> f64 {
        self.values[[step, env]]
    }

    fn validate(&self, shape: (usize, usize)) -> Result<(), ReturnsError> {
        ensure_shape("truncated_value", &self.values, &[shape.0, shape.1])
    }
}

/// Fails if any step is flagged `timeout` without also being `done`.
pub(crate) fn ensure_timeout_implies_done(
    done: ArrayView2<'_, bool>,
    timeout: ArrayView2<'_, bool>,
) -> Result<(), ReturnsError> {
    for ((step, env), &truncated) in timeout.indexed_iter() {
        if truncated && !done[[step, env]] {
            return Err(ReturnsError::TimeoutWithoutDone { step, env });
        }
    }
    Ok(())
}
