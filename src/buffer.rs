//! Trajectory buffer filled by the sampler, one time row at a time.
//!
//! The buffer uses a `[num_steps, num_envs]` layout and is refilled once per
//! training iteration, then lent to the estimator as a [`TrajectoryBatch`].

use ndarray::{Array1, Array2, ArrayView1};

use crate::batch::{ensure_shape, TrajectoryBatch};
use crate::error::ReturnsError;

/// Owned storage for one sampled batch.
///
/// # Example
///
/// ```
/// use pg_returns::TrajectoryBuffer;
///
/// let mut buffer = TrajectoryBuffer::new(2, 1);
/// buffer.record_step(0, &[1.0], &[false], &[0.5], &[false]).unwrap();
/// buffer.record_step(1, &[1.0], &[true], &[0.5], &[true]).unwrap();
/// buffer.set_bootstrap_value(&[0.0]).unwrap();
///
/// let batch = buffer.batch().unwrap();
/// assert!(batch.timeout().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TrajectoryBuffer {
    reward: Array2<f64>,
    done: Array2<bool>,
    timeout: Array2<bool>,
    value: Array2<f64>,
    /// Allocated on the first recorded truncation.
    truncated_value: Option<Array2<f64>>,
    bootstrap_value: Array1<f64>,
}

impl TrajectoryBuffer {
    /// Creates a zeroed buffer for `num_steps` timesteps across `num_envs`
    /// environments.
    pub fn new(num_steps: usize, num_envs: usize) -> Self {
        Self {
            reward: Array2::zeros((num_steps, num_envs)),
            done: Array2::from_elem((num_steps, num_envs), false),
            timeout: Array2::from_elem((num_steps, num_envs), false),
            value: Array2::zeros((num_steps, num_envs)),
            truncated_value: None,
            bootstrap_value: Array1::zeros(num_envs),
        }
    }

    /// Returns `(num_steps, num_envs)`.
    pub fn shape(&self) -> (usize, usize) {
        self.reward.dim()
    }

    /// Writes the time row `step` for every environment at once.
    pub fn record_step(
        &mut self,
        step: usize,
        reward: &[f64],
        done: &[bool],
        value: &[f64],
        timeout: &[bool],
    ) -> Result<(), ReturnsError> {
        let (num_steps, num_envs) = self.shape();
        if step >= num_steps {
            return Err(ReturnsError::StepOutOfRange {
                step,
                steps: num_steps,
            });
        }
        ensure_shape("reward", &ArrayView1::from(reward), &[num_envs])?;
        ensure_shape("done", &ArrayView1::from(done), &[num_envs])?;
        ensure_shape("value", &ArrayView1::from(value), &[num_envs])?;
        ensure_shape("timeout", &ArrayView1::from(timeout), &[num_envs])?;

        self.reward.row_mut(step).assign(&ArrayView1::from(reward));
        self.done.row_mut(step).assign(&ArrayView1::from(done));
        self.value.row_mut(step).assign(&ArrayView1::from(value));
        self.timeout.row_mut(step).assign(&ArrayView1::from(timeout));
        Ok(())
    }

    /// Stores the agent's value estimate of the observation at which the
    /// episode in `env` was truncated on `step`.
    pub fn record_truncated_value(
        &mut self,
        step: usize,
        env: usize,
        value: f64,
    ) -> Result<(), ReturnsError> {
        let (num_steps, num_envs) = self.shape();
        if step >= num_steps {
            return Err(ReturnsError::StepOutOfRange {
                step,
                steps: num_steps,
            });
        }
        if env >= num_envs {
            return Err(ReturnsError::EnvOutOfRange {
                env,
                envs: num_envs,
            });
        }
        self.truncated_value
            .get_or_insert_with(|| Array2::zeros((num_steps, num_envs)))[[step, env]] = value;
        Ok(())
    }

    /// Sets the value estimate of the state following the final step.
    pub fn set_bootstrap_value(&mut self, values: &[f64]) -> Result<(), ReturnsError> {
        let values = ArrayView1::from(values);
        ensure_shape("bootstrap_value", &values, &[self.shape().1])?;
        self.bootstrap_value.assign(&values);
        Ok(())
    }

    /// Lends the stored data as a batch with timeout flags attached.
    pub fn batch(&self) -> Result<TrajectoryBatch<'_>, ReturnsError> {
        let batch = TrajectoryBatch::new(
            self.reward.view(),
            self.done.view(),
            self.value.view(),
            self.bootstrap_value.view(),
        )?
        .with_timeout(self.timeout.view())?;

        match &self.truncated_value {
            Some(truncated) => batch.with_truncated_value(truncated.view()),
            None => Ok(batch),
        }
    }

    /// Clears all stored data for the next iteration.
    pub fn clear(&mut self) {
        self.reward.fill(0.0);
        self.done.fill(false);
        self.timeout.fill(false);
        self.value.fill(0.0);
        self.truncated_value = None;
        self.bootstrap_value.fill(0.0);
    }
}
