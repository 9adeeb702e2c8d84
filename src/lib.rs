//! pg_returns - training targets for policy-gradient reinforcement learning.
//!
//! Turns one sampled batch of trajectories (`[T, B]` rewards, episode ends,
//! value estimates and optional time-limit flags) into per-timestep returns,
//! advantages and a loss validity mask. Supports plain discounted returns,
//! GAE-λ, bootstrapping across time-limit truncations and advantage
//! normalization.

pub mod batch;
pub mod buffer;
pub mod config;
pub mod error;
pub mod estimation;
pub mod estimator;
pub mod normalize;
pub mod valid;

pub use batch::TrajectoryBatch;
pub use buffer::TrajectoryBuffer;
pub use config::ReturnsConfig;
pub use error::ReturnsError;
pub use estimation::{NextStepValue, TimeoutValue, TruncatedStateValues};
pub use estimator::{DiscountStrategy, ProcessedReturns, ReturnAdvantageEstimator, ReturnSummary};
pub use normalize::ADVANTAGE_STD_FLOOR;
pub use valid::{valid_from_done, ValidMaskBuilder};
