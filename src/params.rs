//! Simulation parameters: validation, normalization and the derived
//! quantities (time period, pulse-on time) every other module works from.
//!
//! Raw user input arrives as optional text candidates in [`RawParams`];
//! [`SimParams::reconfigured`] checks them in a fixed order and either
//! returns a fully normalized parameter set or a [`ParamError`] without
//! touching anything. Accuracy is raised and step size lowered to the
//! suggested minimums for the chosen frequency, mirroring what the input
//! panel displays.

use std::fmt;

use log::debug;

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn digit_count(n: u32) -> u32 {
    n.ilog10() + 1
}

/// Minimum rounding accuracy (decimal places) for a frequency. Odd
/// frequencies produce repeating periods, so they get one digit less
/// headroom than even ones.
pub fn suggested_accuracy(frequency: u32) -> u32 {
    digit_count(frequency) + if frequency % 2 == 0 { 2 } else { 1 }
}

/// Minimum usable step size for a frequency: two decades below the
/// period scale.
pub fn suggested_step(frequency: u32) -> f64 {
    10f64.powi(-((digit_count(frequency) + 2) as i32))
}

/// Reasons a parameter update can be rejected. Validation runs before any
/// state changes, so a rejection always leaves the previous values live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// Frequency did not parse as an integer above 1.
    InvalidFrequency,
    /// Duty cycle did not parse as a non-negative whole number.
    InvalidDuty,
    /// Step size was zero, negative, exactly 1, or not a number.
    InvalidStep,
    /// Some other field was not parseable as its numeric type.
    NumericParse,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ParamError::InvalidFrequency => "Frequency must be an integer above 1",
            ParamError::InvalidDuty => "Duty cycle must be a whole number",
            ParamError::InvalidStep => "Step size must be above 0 and not 1",
            ParamError::NumericParse => "Only numeric values are allowed",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ParamError {}

/// Raw candidate values collected from the input panel. `None` means the
/// field was left untouched and the current value passes through.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    pub frequency: Option<String>,
    pub duty: Option<String>,
    pub voltage: Option<String>,
    pub accuracy: Option<String>,
    pub step_size: Option<String>,
    pub cycles: Option<u32>,
}

/// A validated, normalized parameter set.
///
/// `time_period` and `pulse_on_time` are derived once here so the phase
/// tracker and buffer never re-round them.
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    /// Pulse frequency in Hz, always above 1.
    pub frequency: u32,
    /// Amplitude of the ON level in volts.
    pub voltage: f64,
    /// Duty cycle in percent.
    pub duty: u32,
    /// Decimal places time values are rounded to.
    pub accuracy: u32,
    /// Time increment between adjacent samples, in seconds.
    pub step_size: f64,
    /// Cycles visible in the window at once.
    pub cycles: u32,
    /// Tick interval driving the slide, in milliseconds.
    pub interval_ms: u64,
    /// One full ON+OFF cycle: round(1/frequency, accuracy).
    pub time_period: f64,
    /// ON portion of one cycle: round(time_period * duty / 100, accuracy).
    pub pulse_on_time: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            frequency: 10,
            voltage: 5.0,
            duty: 10,
            accuracy: 4,
            step_size: 1e-4,
            cycles: 4,
            interval_ms: 10,
            time_period: 0.1,
            pulse_on_time: 0.01,
        }
    }
}

impl SimParams {
    /// Build a parameter set from already-numeric values, applying the same
    /// checks and clamps as a text reconfiguration.
    pub fn new(
        frequency: u32,
        voltage: f64,
        duty: u32,
        accuracy: u32,
        step_size: f64,
        cycles: u32,
        interval_ms: u64,
    ) -> Result<Self, ParamError> {
        if frequency <= 1 {
            return Err(ParamError::InvalidFrequency);
        }
        if !(step_size > 0.0) || step_size == 1.0 {
            return Err(ParamError::InvalidStep);
        }
        debug_assert!(cycles >= 1);

        let accuracy = accuracy.max(suggested_accuracy(frequency));
        let step_size = step_size.min(suggested_step(frequency));
        let time_period = round_to(1.0 / frequency as f64, accuracy);
        let pulse_on_time = round_to(time_period * duty as f64 / 100.0, accuracy);

        Ok(Self {
            frequency,
            voltage,
            duty,
            accuracy,
            step_size,
            cycles,
            interval_ms,
            time_period,
            pulse_on_time,
        })
    }

    /// Validate raw candidates against this set and produce the replacement.
    ///
    /// Fields left at `None` keep their current value. Checks run in a fixed
    /// order (frequency, duty, step size, then the remaining numerics) and
    /// the first failure wins; `self` is never modified.
    pub fn reconfigured(&self, raw: &RawParams) -> Result<SimParams, ParamError> {
        let frequency = match &raw.frequency {
            Some(text) => text
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|f| *f > 1)
                .ok_or(ParamError::InvalidFrequency)
                .map_err(|e| reject("frequency", text, e))?,
            None => self.frequency,
        };
        let duty = match &raw.duty {
            Some(text) => text
                .trim()
                .parse::<u32>()
                .map_err(|_| reject("duty", text, ParamError::InvalidDuty))?,
            None => self.duty,
        };
        let step_size = match &raw.step_size {
            Some(text) => {
                let step = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| reject("step size", text, ParamError::InvalidStep))?;
                if !(step > 0.0) || step == 1.0 {
                    return Err(reject("step size", text, ParamError::InvalidStep));
                }
                step
            }
            None => self.step_size,
        };
        let voltage = match &raw.voltage {
            Some(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| reject("voltage", text, ParamError::NumericParse))?,
            None => self.voltage,
        };
        let accuracy = match &raw.accuracy {
            Some(text) => text
                .trim()
                .parse::<u32>()
                .map_err(|_| reject("accuracy", text, ParamError::NumericParse))?,
            None => self.accuracy,
        };
        let cycles = raw.cycles.unwrap_or(self.cycles);

        SimParams::new(
            frequency,
            voltage,
            duty,
            accuracy,
            step_size,
            cycles,
            self.interval_ms,
        )
    }
}

fn reject(field: &str, text: &str, error: ParamError) -> ParamError {
    debug!("rejected {field} input {text:?}: {error}");
    error
}
