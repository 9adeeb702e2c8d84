use thiserror::Error;

/// Errors raised by the return/advantage pipeline.
///
/// Every variant is a precondition failure detected before any recurrence
/// runs, so no partial output is ever produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReturnsError {
    #[error("Shape mismatch for `{name}`: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Timeout bootstrapping is enabled but the batch carries no timeout flags")]
    MissingTimeoutData,

    #[error("Timeout flagged without an episode end at step {step}, env {env}")]
    TimeoutWithoutDone { step: usize, env: usize },

    #[error("Step {step} is out of range for a buffer of {steps} steps")]
    StepOutOfRange { step: usize, steps: usize },

    #[error("Env {env} is out of range for a buffer of {envs} envs")]
    EnvOutOfRange { env: usize, envs: usize },

    #[error("Hyperparameter `{name}` must lie in [0, 1], got {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },
}
