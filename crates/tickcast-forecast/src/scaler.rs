//! Per-request min-max normalization.
//!
//! Each request fits its own scaler on the values actually present in its
//! window(s); contexts are never shared across requests, and the instance
//! that normalized a window must be the one that denormalizes outputs
//! produced from it.

use crate::error::ForecastError;

/// Min-max transform onto `[-1, 1]`, fitted over a flat value set.
///
/// Fitting is the only constructor, so an unfitted transform cannot exist.
/// Values outside the fitted range extrapolate linearly in both
/// directions; nothing is clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: f64,
    divisor: f64,
}

impl MinMaxScaler {
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Result<Self, ForecastError> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut seen = false;

        for value in values {
            if !value.is_finite() {
                return Err(ForecastError::NonFiniteSample);
            }
            min = min.min(value);
            max = max.max(value);
            seen = true;
        }

        if !seen {
            return Err(ForecastError::EmptyScalerFit);
        }

        // Constant inputs keep a unit divisor so round-trips stay exact.
        let range = max - min;
        let divisor = if range == 0.0 { 1.0 } else { range };

        Ok(Self { min, divisor })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.divisor * 2.0 - 1.0
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        (value + 1.0) / 2.0 * self.divisor + self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_fitted_extremes_to_unit_bounds() {
        let scaler = MinMaxScaler::fit([10.0, 20.0, 30.0]).expect("fit succeeds");
        assert!((scaler.transform(10.0) - -1.0).abs() < 1e-12);
        assert!((scaler.transform(30.0) - 1.0).abs() < 1e-12);
        assert!(scaler.transform(20.0).abs() < 1e-12);
    }

    #[test]
    fn round_trips_within_tolerance() {
        let values = [101.3, 98.7, 120.0, 99.95, 110.4];
        let scaler = MinMaxScaler::fit(values).expect("fit succeeds");

        for value in values {
            let restored = scaler.inverse_transform(scaler.transform(value));
            assert!((restored - value).abs() <= 1e-6, "value {value} drifted");
        }
    }

    #[test]
    fn out_of_range_values_extrapolate_linearly() {
        let scaler = MinMaxScaler::fit([0.0, 10.0]).expect("fit succeeds");
        // A prediction above the fitted max keeps the same slope.
        assert!((scaler.transform(15.0) - 2.0).abs() < 1e-12);
        assert!((scaler.inverse_transform(2.0) - 15.0).abs() < 1e-12);
        assert!((scaler.inverse_transform(-3.0) - -10.0).abs() < 1e-12);
    }

    #[test]
    fn constant_window_round_trips_exactly() {
        let scaler = MinMaxScaler::fit([42.0, 42.0, 42.0]).expect("fit succeeds");
        let normalized = scaler.transform(42.0);
        assert_eq!(scaler.inverse_transform(normalized), 42.0);
    }

    #[test]
    fn rejects_empty_and_non_finite_fits() {
        assert!(matches!(
            MinMaxScaler::fit(std::iter::empty()),
            Err(ForecastError::EmptyScalerFit)
        ));
        assert!(matches!(
            MinMaxScaler::fit([1.0, f64::NAN]),
            Err(ForecastError::NonFiniteSample)
        ));
    }
}
