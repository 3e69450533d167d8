//! Time axis generation: the initial dense ascending window every sample
//! sequence is sized against.

use std::collections::VecDeque;

use crate::params::{round_to, SimParams};

/// Number of samples spanning the visible window.
pub fn window_len(params: &SimParams) -> usize {
    ((params.time_period * params.cycles as f64) / params.step_size).floor() as usize
}

/// Ascending time values from 0 in `step_size` increments, each rounded to
/// the configured accuracy. Values are synthesized as `i * step` rather than
/// accumulated, so the bulk window carries no addition drift.
pub fn generate(params: &SimParams) -> VecDeque<f64> {
    (0..window_len(params))
        .map(|i| round_to(i as f64 * params.step_size, params.accuracy))
        .collect()
}
