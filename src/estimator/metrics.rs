//! Summary statistics over processed training targets.

use std::fmt;

use super::ProcessedReturns;

/// Aggregated view of one [`ProcessedReturns`], for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSummary {
    /// Mean return over valid samples.
    pub mean_return: f64,
    /// Mean advantage over valid samples (after any normalization).
    pub mean_advantage: f64,
    /// Fraction of samples allowed to contribute to the loss.
    pub valid_fraction: f64,
    /// Number of valid samples.
    pub n_valid: usize,
    /// Total number of samples (`T * B`).
    pub n_samples: usize,
}

impl ReturnSummary {
    /// Summarizes returns and advantages over the valid entries.
    pub fn from_processed(processed: &ProcessedReturns) -> Self {
        let n_samples = processed.returns.len();
        let mut n_valid = 0usize;
        let mut return_sum = 0.0;
        let mut advantage_sum = 0.0;

        for ((idx, &ret), &adv) in processed
            .returns
            .indexed_iter()
            .zip(processed.advantage.iter())
        {
            if processed.is_valid(idx.0, idx.1) {
                n_valid += 1;
                return_sum += ret;
                advantage_sum += adv;
            }
        }

        let mean = |sum: f64| if n_valid > 0 { sum / n_valid as f64 } else { 0.0 };
        let valid_fraction = if n_samples > 0 {
            n_valid as f64 / n_samples as f64
        } else {
            0.0
        };

        Self {
            mean_return: mean(return_sum),
            mean_advantage: mean(advantage_sum),
            valid_fraction,
            n_valid,
            n_samples,
        }
    }
}

impl fmt::Display for ReturnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Return Summary ({}/{} valid) ===",
            self.n_valid, self.n_samples
        )?;
        writeln!(f, "  Mean return:     {:.4}", self.mean_return)?;
        writeln!(f, "  Mean advantage:  {:.4}", self.mean_advantage)?;
        writeln!(f, "  Valid fraction:  {:.1}%", self.valid_fraction * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn summary_respects_mask() {
        let processed = ProcessedReturns {
            returns: arr2(&[[1.0, 3.0], [100.0, 5.0]]),
            advantage: arr2(&[[0.5, 1.5], [100.0, 1.0]]),
            valid: Some(arr2(&[[1.0, 1.0], [0.0, 1.0]])),
        };
        let summary = processed.summary();

        assert_eq!(summary.n_valid, 3);
        assert_eq!(summary.n_samples, 4);
        assert!((summary.mean_return - 3.0).abs() < 1e-12);
        assert!((summary.mean_advantage - 1.0).abs() < 1e-12);
        assert!((summary.valid_fraction - 0.75).abs() < 1e-12);
    }

    #[test]
    fn summary_display() {
        let processed = ProcessedReturns {
            returns: arr2(&[[2.0]]),
            advantage: arr2(&[[0.0]]),
            valid: None,
        };
        let text = processed.summary().to_string();
        assert!(text.contains("1/1 valid"));
        assert!(text.contains("100.0%"));
    }
}
