//! Summary statistics used to flatten matrices into scalars.
//!
//! Accumulation happens in `f64`; empty inputs and zero variance fall back
//! to 0 instead of producing NaN.

use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;

pub fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f32]) -> f64 {
    central_moment(values, mean(values), 2).sqrt()
}

fn central_moment(values: &[f32], mean: f64, order: i32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values
        .iter()
        .map(|&v| (v as f64 - mean).powi(order))
        .sum::<f64>()
        / values.len() as f64
}

/// First four moments of a sample set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std: f64,
    /// Third standardized moment.
    pub skew: f64,
    /// Fourth standardized moment minus 3.
    pub kurtosis: f64,
}

impl Moments {
    pub fn of(values: &[f32]) -> Self {
        let mean = mean(values);
        let m2 = central_moment(values, mean, 2);
        if m2 <= 1e-24 {
            return Moments {
                mean,
                std: m2.sqrt(),
                skew: 0.0,
                kurtosis: 0.0,
            };
        }
        let m3 = central_moment(values, mean, 3);
        let m4 = central_moment(values, mean, 4);
        Moments {
            mean,
            std: m2.sqrt(),
            skew: m3 / m2.powf(1.5),
            kurtosis: m4 / (m2 * m2) - 3.0,
        }
    }
}

/// Index of the first maximum; 0 for an empty slice or one holding NaN.
pub fn argmax(values: &[f32]) -> usize {
    ArrayView1::from(values).argmax().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        let numbers = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(2.0, mean(&numbers));
        assert_eq!(0.0, mean(&[]));
    }

    #[test]
    fn test_std_dev() {
        let numbers = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&numbers) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_data_has_no_skew() {
        let m = Moments::of(&[-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert!(m.skew.abs() < 1e-12);
        // Uniform five points: m4 / m2^2 = 6.8 / 4 = 1.7
        assert!((m.kurtosis - (1.7 - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn right_tail_has_positive_skew() {
        let m = Moments::of(&[0.0, 0.0, 0.0, 0.0, 10.0]);
        assert!(m.skew > 1.0);
    }

    #[test]
    fn constant_data_has_zero_higher_moments() {
        let m = Moments::of(&[-80.0; 16]);
        assert_eq!(m.mean, -80.0);
        assert_eq!(m.std, 0.0);
        assert_eq!(m.skew, 0.0);
        assert_eq!(m.kurtosis, 0.0);
    }

    #[test]
    fn argmax_takes_first_maximum() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
        assert_eq!(argmax(&[]), 0);
    }
}
