//! N-step discounted returns with bootstrap.

use ndarray::{Array2, ArrayView1, ArrayView2};

use super::timeout::{ensure_timeout_implies_done, TimeoutValue};
use crate::batch::ensure_shape;
use crate::error::ReturnsError;

/// Computes discounted returns per environment column.
///
/// # Mathematical Formula
/// ```text
/// G_{T-1} = r_{T-1} + γ * (1 - d_{T-1}) * V_boot
/// G_t     = r_t     + γ * (1 - d_t)     * G_{t+1}
/// ```
///
/// A `done` step is a true termination: nothing from `t + 1` onward reaches
/// `G_t`.
pub fn discount_return(
    reward: ArrayView2<'_, f64>,
    done: ArrayView2<'_, bool>,
    bootstrap_value: ArrayView1<'_, f64>,
    discount: f64,
) -> Result<Array2<f64>, ReturnsError> {
    let (steps, envs) = reward.dim();
    ensure_shape("done", &done, &[steps, envs])?;
    ensure_shape("bootstrap_value", &bootstrap_value, &[envs])?;

    let mut return_ = Array2::zeros((steps, envs));
    for env in 0..envs {
        let mut running = bootstrap_value[env];
        for t in (0..steps).rev() {
            let not_done = if done[[t, env]] { 0.0 } else { 1.0 };
            running = reward[[t, env]] + discount * not_done * running;
            return_[[t, env]] = running;
        }
    }
    Ok(return_)
}

/// Like [`discount_return`], but keeps bootstrapping across time-limit ends.
///
/// At a `done && timeout` step the continuation is the estimate supplied by
/// `timeout_value` (or `bootstrap_value` on the final step) instead of zero.
/// True terminations behave exactly as in [`discount_return`].
pub fn discount_return_timeout_aware<V>(
    reward: ArrayView2<'_, f64>,
    done: ArrayView2<'_, bool>,
    timeout: ArrayView2<'_, bool>,
    bootstrap_value: ArrayView1<'_, f64>,
    discount: f64,
    timeout_value: &V,
) -> Result<Array2<f64>, ReturnsError>
where
    V: TimeoutValue + ?Sized,
{
    let (steps, envs) = reward.dim();
    ensure_shape("done", &done, &[steps, envs])?;
    ensure_shape("timeout", &timeout, &[steps, envs])?;
    ensure_shape("bootstrap_value", &bootstrap_value, &[envs])?;
    timeout_value.validate((steps, envs))?;
    ensure_timeout_implies_done(done, timeout)?;

    let mut return_ = Array2::zeros((steps, envs));
    for env in 0..envs {
        let mut running = bootstrap_value[env];
        for t in (0..steps).rev() {
            let continuation = if !done[[t, env]] {
                running
            } else if timeout[[t, env]] {
                if t + 1 == steps {
                    bootstrap_value[env]
                } else {
                    timeout_value.value_at_timeout(t, env)
                }
            } else {
                0.0
            };
            running = reward[[t, env]] + discount * continuation;
            return_[[t, env]] = running;
        }
    }
    Ok(return_)
}
