//! Selection among the four return/advantage kernels.

use ndarray::Array2;

use crate::batch::TrajectoryBatch;
use crate::error::ReturnsError;
use crate::estimation::{
    discount_return, discount_return_timeout_aware, generalized_advantage_estimation,
    generalized_advantage_estimation_timeout_aware, NextStepValue, TimeoutValue,
    TruncatedStateValues,
};

/// Which kernel produces `(return_, advantage)` for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountStrategy {
    /// Discounted return; `advantage = return_ - value`.
    DiscountReturn,
    /// GAE-λ with λ < 1.
    GeneralizedAdvantage,
    /// Discounted return bootstrapping across time-limit ends.
    DiscountReturnTimeoutAware,
    /// GAE-λ bootstrapping across time-limit ends.
    GeneralizedAdvantageTimeoutAware,
}

impl DiscountStrategy {
    /// Picks the kernel for the given configuration.
    ///
    /// At λ = 1 GAE collapses to the discounted return, which is computed
    /// directly.
    pub fn select(bootstrap_timelimit: bool, gae_lambda: f64) -> Self {
        #[allow(clippy::float_cmp)]
        let lambda_is_one = gae_lambda == 1.0;
        match (bootstrap_timelimit, lambda_is_one) {
            (false, true) => Self::DiscountReturn,
            (false, false) => Self::GeneralizedAdvantage,
            (true, true) => Self::DiscountReturnTimeoutAware,
            (true, false) => Self::GeneralizedAdvantageTimeoutAware,
        }
    }

    /// Returns true for the variants that need timeout flags.
    pub fn is_timeout_aware(&self) -> bool {
        matches!(
            self,
            Self::DiscountReturnTimeoutAware | Self::GeneralizedAdvantageTimeoutAware
        )
    }

    /// Runs the kernel and returns `(return_, advantage)`.
    pub fn compute(
        &self,
        batch: &TrajectoryBatch<'_>,
        discount: f64,
        gae_lambda: f64,
    ) -> Result<(Array2<f64>, Array2<f64>), ReturnsError> {
        let (reward, done, value, bootstrap) = (
            batch.reward(),
            batch.done(),
            batch.value(),
            batch.bootstrap_value(),
        );

        match self {
            Self::DiscountReturn => {
                let return_ = discount_return(reward, done, bootstrap, discount)?;
                let advantage = &return_ - &value;
                Ok((return_, advantage))
            }
            Self::GeneralizedAdvantage => {
                let (advantage, return_) = generalized_advantage_estimation(
                    reward, value, done, bootstrap, discount, gae_lambda,
                )?;
                Ok((return_, advantage))
            }
            Self::DiscountReturnTimeoutAware => {
                let timeout = batch.timeout().ok_or(ReturnsError::MissingTimeoutData)?;
                let return_ = with_timeout_source(batch, |source| {
                    discount_return_timeout_aware(
                        reward, done, timeout, bootstrap, discount, source,
                    )
                })?;
                let advantage = &return_ - &value;
                Ok((return_, advantage))
            }
            Self::GeneralizedAdvantageTimeoutAware => {
                let timeout = batch.timeout().ok_or(ReturnsError::MissingTimeoutData)?;
                let (advantage, return_) = with_timeout_source(batch, |source| {
                    generalized_advantage_estimation_timeout_aware(
                        reward, value, done, timeout, bootstrap, discount, gae_lambda, source,
                    )
                })?;
                Ok((return_, advantage))
            }
        }
    }
}

/// Uses the agent-supplied truncated-state values when the batch has them,
/// otherwise the next value estimate in the batch.
fn with_timeout_source<T>(
    batch: &TrajectoryBatch<'_>,
    f: impl FnOnce(&dyn TimeoutValue) -> Result<T, ReturnsError>,
) -> Result<T, ReturnsError> {
    match batch.truncated_value() {
        Some(values) => f(&TruncatedStateValues::new(values)),
        None => f(&NextStepValue::new(batch.value())),
    }
}
