//! Borrowed view over one sampled batch of trajectories.
//!
//! All `[T, B]` quantities share the layout `[time, env]`:
//! - `T`: number of sampled timesteps
//! - `B`: number of parallel environments (batch columns)
//!
//! The batch never owns or mutates its inputs; estimators allocate fresh
//! outputs.

use ndarray::{ArrayBase, ArrayView1, ArrayView2, Data, Dimension};

use crate::error::ReturnsError;

/// Read-only trajectory data consumed by the estimators.
///
/// # Example
///
/// ```
/// use ndarray::{arr1, arr2};
/// use pg_returns::TrajectoryBatch;
///
/// let reward = arr2(&[[1.0], [1.0], [1.0]]);
/// let done = arr2(&[[false], [false], [true]]);
/// let value = arr2(&[[0.0], [0.0], [0.0]]);
/// let bootstrap = arr1(&[0.0]);
///
/// let batch =
///     TrajectoryBatch::new(reward.view(), done.view(), value.view(), bootstrap.view()).unwrap();
/// assert_eq!((batch.steps(), batch.envs()), (3, 1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryBatch<'a> {
    reward: ArrayView2<'a, f64>,
    done: ArrayView2<'a, bool>,
    value: ArrayView2<'a, f64>,
    bootstrap_value: ArrayView1<'a, f64>,
    timeout: Option<ArrayView2<'a, bool>>,
    truncated_value: Option<ArrayView2<'a, f64>>,
}

impl<'a> TrajectoryBatch<'a> {
    /// Creates a batch, checking that every array agrees with `reward` on
    /// `[T, B]` and that `bootstrap_value` has length `B`.
    pub fn new(
        reward: ArrayView2<'a, f64>,
        done: ArrayView2<'a, bool>,
        value: ArrayView2<'a, f64>,
        bootstrap_value: ArrayView1<'a, f64>,
    ) -> Result<Self, ReturnsError> {
        let (steps, envs) = reward.dim();
        ensure_shape("done", &done, &[steps, envs])?;
        ensure_shape("value", &value, &[steps, envs])?;
        ensure_shape("bootstrap_value", &bootstrap_value, &[envs])?;

        Ok(Self {
            reward,
            done,
            value,
            bootstrap_value,
            timeout: None,
            truncated_value: None,
        })
    }

    /// Attaches time-limit flags.
    pub fn with_timeout(mut self, timeout: ArrayView2<'a, bool>) -> Result<Self, ReturnsError> {
        ensure_shape("timeout", &timeout, &[self.steps(), self.envs()])?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Attaches value estimates of the truncated states.
    ///
    /// Only entries where `timeout` is set are ever read.
    pub fn with_truncated_value(
        mut self,
        truncated_value: ArrayView2<'a, f64>,
    ) -> Result<Self, ReturnsError> {
        ensure_shape(
            "truncated_value",
            &truncated_value,
            &[self.steps(), self.envs()],
        )?;
        self.truncated_value = Some(truncated_value);
        Ok(self)
    }

    /// Number of timesteps `T`.
    pub fn steps(&self) -> usize {
        self.reward.nrows()
    }

    /// Number of environments `B`.
    pub fn envs(&self) -> usize {
        self.reward.ncols()
    }

    /// Rewards `[T, B]`.
    pub fn reward(&self) -> ArrayView2<'a, f64> {
        self.reward
    }

    /// Episode-end flags `[T, B]`.
    pub fn done(&self) -> ArrayView2<'a, bool> {
        self.done
    }

    /// Value estimates `[T, B]`.
    pub fn value(&self) -> ArrayView2<'a, f64> {
        self.value
    }

    /// Value estimate of the state after the final step `[B]`.
    pub fn bootstrap_value(&self) -> ArrayView1<'a, f64> {
        self.bootstrap_value
    }

    /// Time-limit flags `[T, B]`, if attached.
    pub fn timeout(&self) -> Option<ArrayView2<'a, bool>> {
        self.timeout
    }

    /// Agent values of truncated states `[T, B]`, if attached.
    pub fn truncated_value(&self) -> Option<ArrayView2<'a, f64>> {
        self.truncated_value
    }
}

/// Fails with [`ReturnsError::ShapeMismatch`] unless `array` has exactly the
/// `expected` shape.
pub(crate) fn ensure_shape<S, D>(
    name: &'static str,
    array: &ArrayBase<S, D>,
    expected: &[usize],
) -> Result<(), ReturnsError>
where
    S: Data,
    D: Dimension,
{
    if array.shape() == expected {
        Ok(())
    } else {
        Err(ReturnsError::ShapeMismatch {
            name,
            expected: expected.to_vec(),
            found: array.shape().to_vec(),
        })
    }
}
