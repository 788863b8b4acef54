//! Feature extraction and sliding-window construction.
//!
//! The model consumes a single feature per day: the closing price. The
//! window routine stays multivariate (feature axis preserved, target taken
//! from feature 0) so the shape bookkeeping matches the trained network's
//! expectations exactly.

use ndarray::{Array1, Array2, Array3};

use tickcast_core::DailyBar;

/// Reduce daily bars to the close-price feature matrix, shape `(rows, 1)`.
/// Values are untouched and keep their original order.
pub fn close_matrix(bars: &[DailyBar]) -> Array2<f64> {
    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let rows = closes.len();
    Array2::from_shape_vec((rows, 1), closes)
        .unwrap_or_else(|_| Array2::zeros((0, 1)))
}

/// Build overlapping windows over `data`.
///
/// For each `i` in `0..rows - seq_length`, window `i` covers rows
/// `[i, i + seq_length)` and its target is row `i + seq_length`'s first
/// feature. Returns `(windows, targets)` with shapes
/// `(rows - seq_length, seq_length, features)` and `(rows - seq_length,)`;
/// both are empty when `rows <= seq_length`.
pub fn sliding_windows(data: &Array2<f64>, seq_length: usize) -> (Array3<f64>, Array1<f64>) {
    let rows = data.nrows();
    let features = data.ncols();
    let count = rows.saturating_sub(seq_length);

    let mut window_values = Vec::with_capacity(count * seq_length * features);
    let mut targets = Vec::with_capacity(count);

    for i in 0..count {
        for row in i..i + seq_length {
            for col in 0..features {
                window_values.push(data[[row, col]]);
            }
        }
        targets.push(data[[i + seq_length, 0]]);
    }

    let windows = Array3::from_shape_vec((count, seq_length, features), window_values)
        .unwrap_or_else(|_| Array3::zeros((0, seq_length, features)));

    (windows, Array1::from_vec(targets))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use tickcast_core::MarketDate;

    use super::*;

    #[test]
    fn close_matrix_keeps_only_closes_in_order() {
        let bars = vec![
            DailyBar::new(
                MarketDate::from_date(date!(2025 - 01 - 01)),
                Some(9.0),
                Some(10.5),
                Some(8.5),
                10.0,
                Some(100),
            )
            .expect("valid"),
            DailyBar::new(
                MarketDate::from_date(date!(2025 - 01 - 02)),
                Some(10.0),
                Some(11.5),
                Some(9.5),
                11.0,
                Some(110),
            )
            .expect("valid"),
            DailyBar::new(
                MarketDate::from_date(date!(2025 - 01 - 03)),
                Some(11.0),
                Some(12.5),
                Some(10.5),
                12.0,
                Some(120),
            )
            .expect("valid"),
        ];

        let matrix = close_matrix(&bars);
        assert_eq!(matrix.shape(), &[3, 1]);
        assert_eq!(matrix.column(0).to_vec(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn windows_over_multivariate_input_have_expected_shapes() {
        let data: Vec<f64> = (0..40 * 3).map(|v| v as f64).collect();
        let matrix = Array2::from_shape_vec((40, 3), data).expect("matrix");

        let (windows, targets) = sliding_windows(&matrix, 5);
        assert_eq!(windows.shape(), &[35, 5, 3]);
        assert_eq!(targets.shape(), &[35]);

        // Target i is feature 0 of the row right after window i.
        assert_eq!(targets[0], matrix[[5, 0]]);
        assert_eq!(windows[[0, 0, 0]], matrix[[0, 0]]);
        assert_eq!(windows[[34, 4, 2]], matrix[[38, 2]]);
    }

    #[test]
    fn short_input_produces_no_windows() {
        let matrix = Array2::from_shape_vec((5, 1), vec![1.0; 5]).expect("matrix");
        let (windows, targets) = sliding_windows(&matrix, 5);
        assert_eq!(windows.shape()[0], 0);
        assert!(targets.is_empty());
    }
}
