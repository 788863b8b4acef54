//! Recursive multi-step forecasting.
//!
//! A single-step model is advanced one business day at a time: each
//! prediction is denormalized for the caller and fed back into the window
//! in its normalized form, so the model only ever sees normalized inputs.

use candle_core::{Device, Tensor};

use tickcast_core::MarketDate;
use tickcast_model::{run_inference, SequenceModel};

use crate::error::ForecastError;
use crate::scaler::MinMaxScaler;

/// Project forward from `last_date` through `target_end` inclusive, one
/// prediction per business day.
///
/// `last_window` is the newest normalized window and `last_value_norm` the
/// newest *observed* normalized value; the window is advanced with it once
/// before the loop so the first prediction lands on the day after
/// `last_date`. A `target_end` at or before `last_date` yields two empty
/// vectors — a valid nothing-to-forecast outcome, not an error.
///
/// # Errors
///
/// A failed step aborts the whole forecast; no partial results are
/// returned.
pub fn recursive_forecast(
    model: &dyn SequenceModel,
    scaler: &MinMaxScaler,
    last_window: &[f64],
    last_value_norm: f64,
    last_date: MarketDate,
    target_end: MarketDate,
    device: &Device,
) -> Result<(Vec<MarketDate>, Vec<f64>), ForecastError> {
    if target_end <= last_date {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut window = last_window.to_vec();
    advance(&mut window, last_value_norm);

    let days = last_date.business_days_through(target_end)?;
    let mut dates = Vec::with_capacity(days.len());
    let mut values = Vec::with_capacity(days.len());

    for day in days {
        let inputs = window_tensor(&window, device)?;
        let outputs = run_inference(model, &inputs)?;
        let raw = outputs.first().copied().ok_or_else(|| {
            ForecastError::Tensor(candle_core::Error::Msg(String::from(
                "inference returned no outputs",
            )))
        })?;

        dates.push(day);
        values.push(scaler.inverse_transform(raw));
        advance(&mut window, raw);
    }

    Ok((dates, values))
}

/// Drop the oldest observation and append the newest normalized value.
fn advance(window: &mut Vec<f64>, value: f64) {
    window.remove(0);
    window.push(value);
}

fn window_tensor(window: &[f64], device: &Device) -> candle_core::Result<Tensor> {
    let data: Vec<f32> = window.iter().map(|v| *v as f32).collect();
    Tensor::from_vec(data, (1, window.len(), 1, 1), device)
}
