//! Orchestration of the return/advantage/validity pipeline.
//!
//! One call to [`ReturnAdvantageEstimator::process_returns`] turns a sampled
//! batch into training targets:
//!
//! 1. Pick a kernel from `bootstrap_timelimit` and `gae_lambda == 1`
//! 2. Compute `(return_, advantage)`
//! 3. Build the validity mask
//! 4. Optionally normalize the advantage over valid samples
//!
//! No state is kept between calls.

mod metrics;
mod strategy;


use ndarray::Array2;

pub use metrics::ReturnSummary;
pub use strategy::DiscountStrategy;

use crate::batch::TrajectoryBatch;
use crate::config::ReturnsConfig;
use crate::error::ReturnsError;
use crate::normalize::normalize_advantage;
use crate::valid::ValidMaskBuilder;

/// Training targets produced for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedReturns {
    /// Return estimate per timestep `[T, B]`.
    pub returns: Array2<f64>,
    /// Advantage estimate per timestep `[T, B]`.
    pub advantage: Array2<f64>,
    /// Loss mask `[T, B]`; `None` means every timestep is valid.
    pub valid: Option<Array2<f64>>,
}

impl ProcessedReturns {
    /// Whether the sample at `(step, env)` may contribute to the loss.
    pub fn is_valid(&self, step: usize, env: usize) -> bool {
        match &self.valid {
            Some(valid) => valid[[step, env]] > 0.0,
            None => true,
        }
    }

    /// The mask with the "all valid" sentinel expanded to ones.
    pub fn valid_or_ones(&self) -> Array2<f64> {
        self.valid
            .clone()
            .unwrap_or_else(|| Array2::ones(self.returns.dim()))
    }

    pub fn summary(&self) -> ReturnSummary {
        ReturnSummary::from_processed(self)
    }
}

/// Computes returns, advantages and validity masks for policy-gradient
/// training.
///
/// # Example
///
/// ```
/// use ndarray::{arr1, arr2};
/// use pg_returns::{ReturnAdvantageEstimator, ReturnsConfig, TrajectoryBatch};
///
/// let config = ReturnsConfig {
///     discount: 0.9,
///     gae_lambda: 1.0,
///     ..ReturnsConfig::default()
/// };
/// let estimator = ReturnAdvantageEstimator::new(config).unwrap();
///
/// let reward = arr2(&[[1.0], [1.0], [1.0]]);
/// let done = arr2(&[[false], [false], [true]]);
/// let value = arr2(&[[0.0], [0.0], [0.0]]);
/// let bootstrap = arr1(&[0.0]);
/// let batch =
///     TrajectoryBatch::new(reward.view(), done.view(), value.view(), bootstrap.view()).unwrap();
///
/// let processed = estimator.process_returns(&batch).unwrap();
/// assert!((processed.returns[[0, 0]] - 2.71).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct ReturnAdvantageEstimator {
    config: ReturnsConfig,
    recurrent: bool,
}

impl ReturnAdvantageEstimator {
    /// Creates an estimator for a feed-forward agent.
    pub fn new(config: ReturnsConfig) -> Result<Self, ReturnsError> {
        config.validate()?;
        Ok(Self {
            config,
            recurrent: false,
        })
    }

    /// Declares whether the agent being trained is recurrent.
    pub fn with_recurrent_agent(mut self, recurrent: bool) -> Self {
        self.recurrent = recurrent;
        self
    }

    /// Hyperparameters this estimator was built with.
    pub fn config(&self) -> &ReturnsConfig {
        &self.config
    }

    /// Whether the agent was declared recurrent.
    pub fn is_recurrent(&self) -> bool {
        self.recurrent
    }

    /// The kernel this estimator runs.
    pub fn strategy(&self) -> DiscountStrategy {
        DiscountStrategy::select(self.config.bootstrap_timelimit, self.config.gae_lambda)
    }

    fn mask_builder(&self) -> ValidMaskBuilder {
        ValidMaskBuilder::new(
            self.config.mid_batch_reset,
            self.recurrent,
            self.config.bootstrap_timelimit,
        )
    }

    /// Computes `(returns, advantage, valid)` for one batch.
    ///
    /// # Errors
    ///
    /// [`ReturnsError::MissingTimeoutData`] if `bootstrap_timelimit` is set
    /// and the batch has no timeout flags. With `bootstrap_timelimit` set,
    /// [`ReturnsError::TimeoutWithoutDone`] if a timeout flag sits on a step
    /// that is not `done`. Both are raised before any recurrence runs.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(steps = batch.steps(), envs = batch.envs())
    )]
    pub fn process_returns(
        &self,
        batch: &TrajectoryBatch<'_>,
    ) -> Result<ProcessedReturns, ReturnsError> {
        if self.config.bootstrap_timelimit && batch.timeout().is_none() {
            return Err(ReturnsError::MissingTimeoutData);
        }

        let strategy = self.strategy();
        tracing::debug!(?strategy, "computing returns");

        let (returns, mut advantage) =
            strategy.compute(batch, self.config.discount, self.config.gae_lambda)?;
        let valid = self.mask_builder().build(batch.done(), batch.timeout())?;

        if self.config.normalize_advantage {
            if let Some((mean, std)) = normalize_advantage(&mut advantage, valid.as_ref())? {
                tracing::debug!(mean, std, "normalized advantage");
            }
        }

        let processed = ProcessedReturns {
            returns,
            advantage,
            valid,
        };
        if tracing::enabled!(tracing::Level::DEBUG) {
            let summary = processed.summary();
            tracing::debug!(
                mean_return = summary.mean_return,
                mean_advantage = summary.mean_advantage,
                valid_fraction = summary.valid_fraction,
                "processed returns"
            );
        }
        Ok(processed)
    }
}
