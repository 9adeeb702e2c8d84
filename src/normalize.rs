//! Advantage normalization.

use ndarray::{Array2, Zip};

use crate::batch::ensure_shape;
use crate::error::ReturnsError;

/// Lower bound applied to the advantage standard deviation.
pub const ADVANTAGE_STD_FLOOR: f64 = 1e-6;

/// Mean and sample standard deviation of the entries selected by `valid`
/// (all entries when `valid` is `None`).
///
/// Returns `Ok(None)` when no entry is selected. With a single entry the
/// standard deviation is `0.0`.
///
/// # Errors
///
/// [`ReturnsError::ShapeMismatch`] if `valid` does not match `advantage`.
pub fn masked_mean_std(
    advantage: &Array2<f64>,
    valid: Option<&Array2<f64>>,
) -> Result<Option<(f64, f64)>, ReturnsError> {
    if let Some(valid) = valid {
        ensure_shape("valid", valid, advantage.shape())?;
    }

    let (sum, count) = match valid {
        Some(valid) => Zip::from(advantage)
            .and(valid)
            .fold((0.0, 0usize), |(sum, count), &a, &v| {
                if v > 0.0 {
                    (sum + a, count + 1)
                } else {
                    (sum, count)
                }
            }),
        None => (advantage.sum(), advantage.len()),
    };

    if count == 0 {
        return Ok(None);
    }

    let mean = sum / count as f64;
    let std = if count < 2 {
        0.0
    } else {
        let squares = match valid {
            Some(valid) => Zip::from(advantage).and(valid).fold(0.0, |acc, &a, &v| {
                if v > 0.0 {
                    acc + (a - mean).powi(2)
                } else {
                    acc
                }
            }),
            None => advantage.fold(0.0, |acc, &a| acc + (a - mean).powi(2)),
        };
        (squares / (count as f64 - 1.0)).sqrt()
    };
    Ok(Some((mean, std)))
}

/// Normalizes advantages to zero mean and unit variance in place.
///
/// Statistics come from the valid entries only, but every entry is rewritten;
/// invalid ones are masked out downstream. Returns the `(mean, std)` pair
/// used, with `std` already floored at [`ADVANTAGE_STD_FLOOR`], or `None` if
/// the mask selects nothing (the advantage is then left untouched).
///
/// # Errors
///
/// [`ReturnsError::ShapeMismatch`] if `valid` does not match `advantage`.
pub fn normalize_advantage(
    advantage: &mut Array2<f64>,
    valid: Option<&Array2<f64>>,
) -> Result<Option<(f64, f64)>, ReturnsError> {
    let Some((mean, std)) = masked_mean_std(advantage, valid)? else {
        tracing::warn!("advantage normalization skipped: no valid samples in batch");
        return Ok(None);
    };
    let std = std.max(ADVANTAGE_STD_FLOOR);
    advantage.mapv_inplace(|a| (a - mean) / std);
    Ok(Some((mean, std)))
}
