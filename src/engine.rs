//! The simulation engine: owns the validated parameters, the phase tracker
//! and the sliding windows, and exposes the operations the host calls.

use log::info;

use crate::buffer::{WaveSnapshot, WaveformBuffer};
use crate::params::{ParamError, RawParams, SimParams};
use crate::phase::PhaseTracker;

/// Channels with a display toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Off,
    Sine,
}

/// Result of a successful reconfiguration: the fresh windows plus the
/// effective accuracy and step size after clamping, for display write-back.
#[derive(Debug, Clone)]
pub struct Reconfigured {
    pub snapshot: WaveSnapshot,
    pub accuracy: u32,
    pub step_size: f64,
}

/// PWM waveform engine.
///
/// All mutation happens through `tick`, `reconfigure` and the setters below;
/// a rejected reconfiguration changes nothing and the engine keeps ticking
/// on its previous parameters.
pub struct PwmEngine {
    params: SimParams,
    phase: PhaseTracker,
    buffer: WaveformBuffer,
    paused: bool,
}

impl PwmEngine {
    pub fn new(params: SimParams) -> Self {
        let mut phase = PhaseTracker::default();
        let buffer = WaveformBuffer::new(&params, &mut phase);
        log_params("initialized", &params, buffer.len());
        Self {
            params,
            phase,
            buffer,
            paused: false,
        }
    }

    /// Advance the windows by one sample and return the current series.
    /// While paused the windows are left untouched.
    pub fn tick(&mut self) -> WaveSnapshot {
        if !self.paused {
            self.buffer.slide(&self.params, &mut self.phase);
        }
        self.buffer.snapshot()
    }

    /// Validate raw candidates and, only if every check passes, swap in the
    /// new parameters and regenerate all windows from scratch.
    pub fn reconfigure(&mut self, raw: &RawParams) -> Result<Reconfigured, ParamError> {
        let params = self.params.reconfigured(raw)?;
        self.params = params;
        self.buffer.regenerate(&self.params, &mut self.phase);
        log_params("reconfigured", &self.params, self.buffer.len());
        Ok(Reconfigured {
            snapshot: self.buffer.snapshot(),
            accuracy: self.params.accuracy,
            step_size: self.params.step_size,
        })
    }

    /// Show or hide the OFF complement or sine reference. Phase state is
    /// untouched, so the pulse train continues without discontinuity.
    pub fn set_display(&mut self, channel: Channel, enabled: bool) -> WaveSnapshot {
        match channel {
            Channel::Off => self.buffer.set_show_off(enabled, &self.params),
            Channel::Sine => self.buffer.set_show_sine(enabled, &self.params),
        }
        self.buffer.snapshot()
    }

    pub fn set_tick_interval(&mut self, ms: u64) {
        self.params.interval_ms = ms;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn snapshot(&self) -> WaveSnapshot {
        self.buffer.snapshot()
    }

    pub fn show_off(&self) -> bool {
        self.buffer.show_off()
    }

    pub fn show_sine(&self) -> bool {
        self.buffer.show_sine()
    }
}

fn log_params(action: &str, params: &SimParams, window_len: usize) {
    info!(
        "{action}: frequency {} Hz, period {} s, voltage {} V, duty {} %, \
         pulse width {} s, step {}, accuracy {}, cycles {}, interval {} ms, \
         window {} samples",
        params.frequency,
        params.time_period,
        params.voltage,
        params.duty,
        params.pulse_on_time,
        params.step_size,
        params.accuracy,
        params.cycles,
        params.interval_ms,
        window_len
    );
}
