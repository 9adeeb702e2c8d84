//! Configuration for return and advantage estimation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ReturnsError;

/// Hyperparameters controlling how training targets are computed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReturnsConfig {
    /// Discount factor γ.
    pub discount: f64,
    /// GAE λ parameter (1 = plain discounted return minus value).
    pub gae_lambda: f64,
    /// Keep bootstrapping across time-limit episode ends.
    pub bootstrap_timelimit: bool,
    /// Whether the sampler resets environments inside the sampled window.
    pub mid_batch_reset: bool,
    /// Normalize advantages to zero mean and unit variance.
    pub normalize_advantage: bool,
}

impl ReturnsConfig {
    /// Checks that `discount` and `gae_lambda` lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ReturnsError> {
        check_unit_interval("discount", self.discount)?;
        check_unit_interval("gae_lambda", self.gae_lambda)
    }
}

impl Default for ReturnsConfig {
    fn default() -> Self {
        Self {
            discount: 0.99,
            gae_lambda: 0.95,
            bootstrap_timelimit: false,
            mid_batch_reset: true,
            normalize_advantage: false,
        }
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), ReturnsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ReturnsError::InvalidHyperparameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ReturnsConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.discount > 0.0 && cfg.discount <= 1.0);
    }

    #[test]
    fn boundaries_are_accepted() {
        let cfg = ReturnsConfig {
            discount: 1.0,
            gae_lambda: 0.0,
            ..ReturnsConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn out_of_range_discount_rejected() {
        let cfg = ReturnsConfig {
            discount: 1.01,
            ..ReturnsConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ReturnsError::InvalidHyperparameter {
                name: "discount",
                value: 1.01
            })
        );
    }

    #[test]
    fn nan_lambda_rejected() {
        let cfg = ReturnsConfig {
            gae_lambda: f64::NAN,
            ..ReturnsConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ReturnsError::InvalidHyperparameter {
                name: "gae_lambda",
                ..
            })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: ReturnsConfig =
            serde_json::from_str(r#"{"discount": 0.9, "bootstrap_timelimit": true}"#).unwrap();
        assert_eq!(cfg.discount, 0.9);
        assert!(cfg.bootstrap_timelimit);
        assert_eq!(cfg.gae_lambda, ReturnsConfig::default().gae_lambda);
    }
}
