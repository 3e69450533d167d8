//! Sliding waveform windows: time axis, ON pulse, OFF complement and sine
//! reference, advanced one sample per tick and rebuilt in full on
//! reconfiguration.

use std::collections::VecDeque;
use std::f64::consts::PI;

use log::debug;

use crate::axis;
use crate::params::SimParams;
use crate::phase::PhaseTracker;

/// Full copy of the four series handed to the host for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSnapshot {
    pub time: Vec<f64>,
    pub on: Vec<f64>,
    pub off: Vec<f64>,
    pub sine: Vec<f64>,
}

/// Owner of the four sliding windows.
///
/// Each tick pops the oldest sample and appends one new sample per window,
/// so advancing is O(1) regardless of window length. The OFF and sine
/// windows carry display flags: while hidden the whole sequence is pinned at
/// zero (still full length), and re-enabling recomputes the entire channel
/// from the live ON/time windows so no stale zeros leak into the plot.
pub struct WaveformBuffer {
    time: VecDeque<f64>,
    on: VecDeque<f64>,
    off: VecDeque<f64>,
    sine: VecDeque<f64>,
    show_off: bool,
    show_sine: bool,
}

impl WaveformBuffer {
    pub fn new(params: &SimParams, phase: &mut PhaseTracker) -> Self {
        let mut buffer = Self {
            time: VecDeque::new(),
            on: VecDeque::new(),
            off: VecDeque::new(),
            sine: VecDeque::new(),
            show_off: false,
            show_sine: false,
        };
        buffer.regenerate(params, phase);
        buffer
    }

    /// Rebuild all four windows from scratch, resetting phase state.
    pub fn regenerate(&mut self, params: &SimParams, phase: &mut PhaseTracker) {
        self.time = axis::generate(params);
        self.on = phase.fill(params, &self.time);
        self.off = if self.show_off {
            complement(&self.on, params.voltage)
        } else {
            zeros(self.time.len())
        };
        self.sine = if self.show_sine {
            sine_wave(&self.time, params)
        } else {
            zeros(self.time.len())
        };
    }

    /// Advance every window by one sample.
    ///
    /// The new time value extrapolates from the previous synthetic value
    /// rather than being re-rounded, so very long runs can accumulate float
    /// drift; accepted limitation.
    pub fn slide(&mut self, params: &SimParams, phase: &mut PhaseTracker) {
        let Some(&last) = self.time.back() else {
            return;
        };
        let next_time = last + params.step_size;
        self.time.pop_front();
        self.time.push_back(next_time);

        let on_sample = phase.next_sample(params, next_time);
        self.on.pop_front();
        self.on.push_back(on_sample);

        self.off.pop_front();
        self.off.push_back(if self.show_off {
            if on_sample == 0.0 {
                params.voltage
            } else {
                0.0
            }
        } else {
            0.0
        });

        self.sine.pop_front();
        self.sine.push_back(if self.show_sine {
            params.voltage * (2.0 * PI * params.frequency as f64 * next_time).sin()
        } else {
            0.0
        });

        debug!(
            "slide: t={next_time} on={on_sample} counter={}",
            phase.counter()
        );
    }

    /// Show or hide the OFF complement. Enabling recomputes the whole
    /// channel from the current ON window; disabling zeroes it wholesale.
    pub fn set_show_off(&mut self, enabled: bool, params: &SimParams) {
        self.show_off = enabled;
        if enabled {
            self.off = complement(&self.on, params.voltage);
        } else {
            for value in self.off.iter_mut() {
                *value = 0.0;
            }
        }
        debug!("OFF channel {}", if enabled { "shown" } else { "hidden" });
    }

    /// Show or hide the sine reference, recomputing from the current time
    /// window on enable.
    pub fn set_show_sine(&mut self, enabled: bool, params: &SimParams) {
        self.show_sine = enabled;
        if enabled {
            self.sine = sine_wave(&self.time, params);
        } else {
            for value in self.sine.iter_mut() {
                *value = 0.0;
            }
        }
        debug!("sine channel {}", if enabled { "shown" } else { "hidden" });
    }

    pub fn show_off(&self) -> bool {
        self.show_off
    }

    pub fn show_sine(&self) -> bool {
        self.show_sine
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn snapshot(&self) -> WaveSnapshot {
        WaveSnapshot {
            time: self.time.iter().copied().collect(),
            on: self.on.iter().copied().collect(),
            off: self.off.iter().copied().collect(),
            sine: self.sine.iter().copied().collect(),
        }
    }
}

fn zeros(len: usize) -> VecDeque<f64> {
    std::iter::repeat(0.0).take(len).collect()
}

fn complement(on: &VecDeque<f64>, voltage: f64) -> VecDeque<f64> {
    on.iter()
        .map(|&level| if level == 0.0 { voltage } else { 0.0 })
        .collect()
}

fn sine_wave(time: &VecDeque<f64>, params: &SimParams) -> VecDeque<f64> {
    time.iter()
        .map(|&t| params.voltage * (2.0 * PI * params.frequency as f64 * t).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (SimParams, PhaseTracker, WaveformBuffer) {
        let params = SimParams::default();
        let mut phase = PhaseTracker::default();
        let buffer = WaveformBuffer::new(&params, &mut phase);
        (params, phase, buffer)
    }

    #[test]
    fn window_length_invariant_across_slides() {
        let (params, mut phase, mut buffer) = fresh();
        assert_eq!(buffer.len(), 4000);
        for _ in 0..2500 {
            buffer.slide(&params, &mut phase);
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.time.len(), 4000);
        assert_eq!(snapshot.on.len(), 4000);
        assert_eq!(snapshot.off.len(), 4000);
        assert_eq!(snapshot.sine.len(), 4000);
    }

    #[test]
    fn slide_drops_oldest_and_extends_time() {
        let (params, mut phase, mut buffer) = fresh();
        let before = buffer.snapshot();
        buffer.slide(&params, &mut phase);
        let after = buffer.snapshot();
        assert_eq!(after.time[0], before.time[1]);
        let expected = before.time[3999] + params.step_size;
        assert!((after.time[3999] - expected).abs() < 1e-15);
    }

    #[test]
    fn hidden_channels_stay_all_zero() {
        let (params, mut phase, mut buffer) = fresh();
        for _ in 0..50 {
            buffer.slide(&params, &mut phase);
        }
        let snapshot = buffer.snapshot();
        assert!(snapshot.off.iter().all(|&v| v == 0.0));
        assert!(snapshot.sine.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn off_channel_is_the_complement() {
        let (params, mut phase, mut buffer) = fresh();
        buffer.set_show_off(true, &params);
        for _ in 0..50 {
            buffer.slide(&params, &mut phase);
        }
        let snapshot = buffer.snapshot();
        for (&on, &off) in snapshot.on.iter().zip(snapshot.off.iter()) {
            if on == params.voltage {
                assert_eq!(off, 0.0);
            } else {
                assert_eq!(off, params.voltage);
            }
        }
    }

    #[test]
    fn sine_follows_the_time_window() {
        let (params, mut phase, mut buffer) = fresh();
        buffer.set_show_sine(true, &params);
        for _ in 0..10 {
            buffer.slide(&params, &mut phase);
        }
        let snapshot = buffer.snapshot();
        for (&t, &s) in snapshot.time.iter().zip(snapshot.sine.iter()) {
            let expected = params.voltage * (2.0 * PI * params.frequency as f64 * t).sin();
            assert!((s - expected).abs() < 1e-9, "sine at t={t}");
        }
    }

    #[test]
    fn enable_recomputes_the_whole_channel() {
        let (params, mut phase, mut buffer) = fresh();
        for _ in 0..500 {
            buffer.slide(&params, &mut phase);
        }
        // While hidden the channel is flat zero; enabling must not leave a
        // leading run of stale zeros behind.
        buffer.set_show_off(true, &params);
        let snapshot = buffer.snapshot();
        assert!(snapshot.off.iter().any(|&v| v == params.voltage));
        for (&on, &off) in snapshot.on.iter().zip(snapshot.off.iter()) {
            assert_eq!(off, if on == 0.0 { params.voltage } else { 0.0 });
        }
    }

    #[test]
    fn toggle_idempotence() {
        let params = SimParams::default();

        let mut phase_a = PhaseTracker::default();
        let mut always_on = WaveformBuffer::new(&params, &mut phase_a);
        always_on.set_show_off(true, &params);
        always_on.set_show_sine(true, &params);

        let mut phase_b = PhaseTracker::default();
        let mut toggled = WaveformBuffer::new(&params, &mut phase_b);

        for _ in 0..750 {
            always_on.slide(&params, &mut phase_a);
            toggled.slide(&params, &mut phase_b);
        }

        // Enable, disable, re-enable: same values as continuously enabled,
        // given identical ON and time windows.
        toggled.set_show_off(true, &params);
        toggled.set_show_sine(true, &params);
        toggled.set_show_off(false, &params);
        toggled.set_show_sine(false, &params);
        toggled.set_show_off(true, &params);
        toggled.set_show_sine(true, &params);

        let reference = always_on.snapshot();
        let snapshot = toggled.snapshot();
        assert_eq!(snapshot.time, reference.time);
        assert_eq!(snapshot.on, reference.on);
        assert_eq!(snapshot.off, reference.off);
        assert_eq!(snapshot.sine, reference.sine);
    }

    #[test]
    fn regenerate_resets_the_window() {
        let (params, mut phase, mut buffer) = fresh();
        for _ in 0..100 {
            buffer.slide(&params, &mut phase);
        }
        buffer.regenerate(&params, &mut phase);
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.time[0], 0.0);
        assert_eq!(snapshot.time.len(), 4000);
        assert_eq!(phase.counter(), 4000);
    }
}
