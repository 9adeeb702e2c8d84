//! Backward-recurrence kernels for returns and advantages.
//!
//! Every kernel scans the time axis from `T - 1` down to `0` independently
//! for each environment column and allocates a fresh `[T, B]` output.

pub mod discount;
pub mod gae;
pub mod timeout;

pub use discount::{discount_return, discount_return_timeout_aware};
pub use gae::{generalized_advantage_estimation, generalized_advantage_estimation_timeout_aware};
pub use timeout::{NextStepValue, TimeoutValue, TruncatedStateValues};
