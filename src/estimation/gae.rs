//! Generalized Advantage Estimation (GAE-λ).
//!
//! Computes advantages and returns from `[T, B]` rollout data, bootstrapping
//! the final step from a separate value estimate.

use ndarray::{Array2, ArrayView1, ArrayView2};

use super::timeout::{ensure_timeout_implies_done, TimeoutValue};
use crate::batch::ensure_shape;
use crate::error::ReturnsError;

/// Computes GAE-λ advantages and returns.
///
/// # Arguments
///
/// * `reward` - Per-step rewards `[T, B]`
/// * `value` - Per-step value estimates `[T, B]`
/// * `done` - Per-step episode termination flags `[T, B]`
/// * `bootstrap_value` - Value of the state after the last step `[B]`
/// * `discount` - Discount factor γ
/// * `gae_lambda` - GAE λ parameter (0 = TD(0), 1 = Monte Carlo)
///
/// # Mathematical Formula
/// ```text
/// δ_t = r_t + γ * (1 - d_t) * V_{t+1} - V_t
/// A_t = δ_t + γ * λ * (1 - d_t) * A_{t+1}
/// ```
///
/// # Returns
///
/// `(advantage, return_)` where `return_ = advantage + value`.
pub fn generalized_advantage_estimation(
    reward: ArrayView2<'_, f64>,
    value: ArrayView2<'_, f64>,
    done: ArrayView2<'_, bool>,
    bootstrap_value: ArrayView1<'_, f64>,
    discount: f64,
    gae_lambda: f64,
) -> Result<(Array2<f64>, Array2<f64>), ReturnsError> {
    let (steps, envs) = reward.dim();
    ensure_shape("value", &value, &[steps, envs])?;
    ensure_shape("done", &done, &[steps, envs])?;
    ensure_shape("bootstrap_value", &bootstrap_value, &[envs])?;

    let mut advantage = Array2::zeros((steps, envs));
    for env in 0..envs {
        let mut gae = 0.0;
        let mut next_value = bootstrap_value[env];

        for t in (0..steps).rev() {
            let next_non_terminal = if done[[t, env]] { 0.0 } else { 1.0 };

            let delta = reward[[t, env]] + discount * next_non_terminal * next_value
                - value[[t, env]];
            gae = delta + discount * gae_lambda * next_non_terminal * gae;
            advantage[[t, env]] = gae;

            next_value = value[[t, env]];
        }
    }

    let return_ = &advantage + &value;
    Ok((advantage, return_))
}

/// Like [`generalized_advantage_estimation`], but keeps bootstrapping across
/// time-limit ends.
///
/// At a `done && timeout` step the TD target bootstraps from `timeout_value`
/// (or `bootstrap_value` on the final step). The λ-carry stops there since
/// `A_{t+1}` belongs to the next episode. At λ = 1 the returns therefore match
/// [`discount_return_timeout_aware`](super::discount_return_timeout_aware)
/// exactly.
#[allow(clippy::too_many_arguments)]
pub fn generalized_advantage_estimation_timeout_aware<V>(
    reward: ArrayView2<'_, f64>,
    value: ArrayView2<'_, f64>,
    done: ArrayView2<'_, bool>,
    timeout: ArrayView2<'_, bool>,
    bootstrap_value: ArrayView1<'_, f64>,
    discount: f64,
    gae_lambda: f64,
    timeout_value: &V,
) -> Result<(Array2<f64>, Array2<f64>), ReturnsError>
where
    V: TimeoutValue + ?Sized,
{
    let (steps, envs) = reward.dim();
    ensure_shape("value", &value, &[steps, envs])?;
    ensure_shape("done", &done, &[steps, envs])?;
    ensure_shape("timeout", &timeout, &[steps, envs])?;
    ensure_shape("bootstrap_value", &bootstrap_value, &[envs])?;
    timeout_value.validate((steps, envs))?;
    ensure_timeout_implies_done(done, timeout)?;

    let mut advantage = Array2::zeros((steps, envs));
    for env in 0..envs {
        let mut gae = 0.0;
        let mut next_value = bootstrap_value[env];

        for t in (0..steps).rev() {
            let (bootstrap, carry) = if !done[[t, env]] {
                (next_value, gae)
            } else if timeout[[t, env]] {
                let truncated = if t + 1 == steps {
                    bootstrap_value[env]
                } else {
                    timeout_value.value_at_timeout(t, env)
                };
                (truncated, 0.0)
            } else {
                (0.0, 0.0)
            };

            let delta = reward[[t, env]] + discount * bootstrap - value[[t, env]];
            gae = delta + discount * gae_lambda * carry;
            advantage[[t, env]] = gae;

            next_value = value[[t, env]];
        }
    }

    let return_ = &advantage + &value;
    Ok((advantage, return_))
}
