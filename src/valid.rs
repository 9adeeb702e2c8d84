//! Per-timestep validity masks.
//!
//! A mask entry of `1.0` lets the timestep contribute to the loss, `0.0`
//! excludes it. `None` stands for "every timestep is valid".
//!
//! | mid_batch_reset | recurrent | bootstrap_timelimit | mask            |
//! |-----------------|-----------|---------------------|-----------------|
//! | false           | any       | false               | `None`          |
//! | false           | any       | true                | all ones        |
//! | true            | any       | any                 | [`valid_from_done`] |
//!
//! With `bootstrap_timelimit`, every `timeout` step is then forced invalid.

use ndarray::{Array2, ArrayView2, Zip};

use crate::batch::ensure_shape;
use crate::error::ReturnsError;

/// Marks every step after the first `done` in its column as invalid.
///
/// The step carrying the `done` flag itself stays valid.
pub fn valid_from_done(done: ArrayView2<'_, bool>) -> Array2<f64> {
    let (steps, envs) = done.dim();
    let mut valid = Array2::ones((steps, envs));
    for env in 0..envs {
        let mut ended = false;
        for t in 0..steps {
            if ended {
                valid[[t, env]] = 0.0;
            }
            ended |= done[[t, env]];
        }
    }
    valid
}

/// Derives the validity mask from the sampler and agent setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidMaskBuilder {
    pub mid_batch_reset: bool,
    /// Agent capability, carried for callers; no row of the mask table
    /// depends on it.
    pub recurrent: bool,
    pub bootstrap_timelimit: bool,
}

impl ValidMaskBuilder {
    pub fn new(mid_batch_reset: bool, recurrent: bool, bootstrap_timelimit: bool) -> Self {
        Self {
            mid_batch_reset,
            recurrent,
            bootstrap_timelimit,
        }
    }

    /// Builds the mask for one batch.
    ///
    /// # Errors
    ///
    /// [`ReturnsError::MissingTimeoutData`] when `bootstrap_timelimit` is set
    /// and `timeout` is `None`; [`ReturnsError::ShapeMismatch`] when `timeout`
    /// disagrees with `done`.
    pub fn build(
        &self,
        done: ArrayView2<'_, bool>,
        timeout: Option<ArrayView2<'_, bool>>,
    ) -> Result<Option<Array2<f64>>, ReturnsError> {
        let timeout = match (self.bootstrap_timelimit, timeout) {
            (true, None) => return Err(ReturnsError::MissingTimeoutData),
            (true, Some(timeout)) => {
                ensure_shape("timeout", &timeout, done.shape())?;
                Some(timeout)
            }
            (false, _) => None,
        };

        // Recurrent agents never see a reset during training, so they follow
        // the same rows as feed-forward agents.
        let mut valid = match (self.mid_batch_reset, self.bootstrap_timelimit) {
            (false, false) => None,
            (false, true) => Some(Array2::ones(done.dim())),
            (true, _) => Some(valid_from_done(done)),
        };

        if let (Some(valid), Some(timeout)) = (valid.as_mut(), timeout) {
            Zip::from(valid).and(timeout).for_each(|v, &truncated| {
                if truncated {
                    *v = 0.0;
                }
            });
        }

        Ok(valid)
    }
}
