//! Pulse phase tracking: decides sample by sample whether the wave is ON,
//! advancing the pulse boundaries as cycles elapse.

use std::collections::VecDeque;

use log::debug;

use crate::params::SimParams;

/// Stateful cursor over the pulse train.
///
/// One rule serves both operating modes: at sample `index` with time
/// `value`, a cycle rolls over when `index` is a multiple of
/// `samples_per_cycle` and `value` is nonzero, shifting the
/// `[pulse_start, pulse_end]` window forward by one period. The sample is ON
/// exactly when `value` falls inside that window, bounds included.
///
/// Bulk mode ([`fill`](Self::fill)) walks a fresh time window and leaves
/// `counter` at the window length; streaming mode
/// ([`next_sample`](Self::next_sample)) picks up from there, one appended
/// value per tick. `counter` survives every tick and only resets when the
/// window itself is regenerated.
#[derive(Debug, Default)]
pub struct PhaseTracker {
    pulse_start: f64,
    pulse_end: f64,
    samples_per_cycle: u64,
    counter: u64,
}

impl PhaseTracker {
    /// Regenerate the ON sequence for a fresh time window, resetting all
    /// phase state first.
    pub fn fill(&mut self, params: &SimParams, time: &VecDeque<f64>) -> VecDeque<f64> {
        self.pulse_start = 0.0;
        self.pulse_end = params.pulse_on_time;
        self.samples_per_cycle =
            ((time.len() as f64 / params.cycles as f64).round() as u64).max(1);

        let mut on = VecDeque::with_capacity(time.len());
        for (index, &value) in time.iter().enumerate() {
            on.push_back(self.level_at(params, index as u64, value));
        }
        self.counter = time.len() as u64;
        debug!(
            "bulk fill: {} samples, {} per cycle, pulse window {}..{}",
            on.len(),
            self.samples_per_cycle,
            self.pulse_start,
            self.pulse_end
        );
        on
    }

    /// Evaluate the single newly appended time value and advance the
    /// streaming counter.
    pub fn next_sample(&mut self, params: &SimParams, value: f64) -> f64 {
        let level = self.level_at(params, self.counter, value);
        self.counter += 1;
        level
    }

    fn level_at(&mut self, params: &SimParams, index: u64, value: f64) -> f64 {
        if index % self.samples_per_cycle == 0 && value != 0.0 {
            self.pulse_start += params.time_period;
            self.pulse_end += params.time_period;
            debug!(
                "cycle rollover at index {index}: pulse window {}..{}",
                self.pulse_start, self.pulse_end
            );
        }
        if self.pulse_start <= value && value <= self.pulse_end {
            params.voltage
        } else {
            0.0
        }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn samples_per_cycle(&self) -> u64 {
        self.samples_per_cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis;

    fn filled() -> (SimParams, VecDeque<f64>, PhaseTracker, VecDeque<f64>) {
        let params = SimParams::default();
        let time = axis::generate(&params);
        let mut phase = PhaseTracker::default();
        let on = phase.fill(&params, &time);
        (params, time, phase, on)
    }

    #[test]
    fn first_cycle_shape() {
        let (params, time, _, on) = filled();
        // ON for t in [0, 0.01], OFF for the rest of the 0.1 s period.
        for (index, (&t, &level)) in time.iter().zip(on.iter()).enumerate() {
            let expected = if t - (t / 0.1).floor() * 0.1 <= 0.01 + 1e-12 {
                params.voltage
            } else {
                0.0
            };
            assert_eq!(level, expected, "sample {index} at t={t}");
        }
        assert_eq!(on[0], 5.0);
        assert_eq!(on[100], 5.0);
        assert_eq!(on[101], 0.0);
        assert_eq!(on[999], 0.0);
        assert_eq!(on[1000], 5.0);
    }

    #[test]
    fn bulk_fill_hands_counter_to_streaming() {
        let (_, time, phase, on) = filled();
        assert_eq!(on.len(), time.len());
        assert_eq!(phase.counter(), 4000);
        assert_eq!(phase.samples_per_cycle(), 1000);
    }

    #[test]
    fn duty_fraction_over_one_cycle() {
        let (params, _, _, on) = filled();
        let spc = 1000;
        let on_count = on
            .iter()
            .skip(spc)
            .take(spc)
            .filter(|&&level| level == params.voltage)
            .count();
        let expected = spc as f64 * params.duty as f64 / 100.0;
        assert!(
            (on_count as f64 - expected).abs() <= 1.0,
            "{on_count} ON samples in one cycle, expected about {expected}"
        );
    }

    #[test]
    fn streaming_continues_the_pattern() {
        let (params, time, mut phase, _) = filled();
        // Extend by one full cycle the way the buffer does: extrapolated,
        // unrounded time values.
        let mut last = *time.back().unwrap();
        let mut appended = Vec::new();
        for _ in 0..1000 {
            last += params.step_size;
            appended.push(phase.next_sample(&params, last));
        }
        assert_eq!(phase.counter(), 5000);

        // The appended cycle is a single pulse: an ON run at the cycle
        // start, OFF for the remainder.
        let on_count = appended
            .iter()
            .filter(|&&level| level == params.voltage)
            .count();
        assert!(
            (on_count as f64 - 100.0).abs() <= 2.0,
            "{on_count} ON samples in streamed cycle"
        );
        let transitions = appended.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(transitions <= 2, "{transitions} level transitions");
        let last_on = appended
            .iter()
            .rposition(|&level| level == params.voltage)
            .unwrap();
        assert!(last_on <= 105, "pulse should sit at the cycle start");
        assert_eq!(appended[500], 0.0);
    }

    #[test]
    fn pulse_width_matches_pulse_on_time_before_rollover() {
        let params = SimParams::default();
        let time = axis::generate(&params);
        let mut phase = PhaseTracker::default();
        phase.fill(&params, &time);
        // Rollovers advance both bounds in lockstep, so width is invariant.
        assert!((phase.pulse_end - phase.pulse_start - params.pulse_on_time).abs() < 1e-12);
    }

    #[test]
    fn fifty_percent_duty_splits_the_cycle() {
        let params = SimParams::new(10, 5.0, 50, 4, 1e-4, 4, 10).unwrap();
        let time = axis::generate(&params);
        let mut phase = PhaseTracker::default();
        let on = phase.fill(&params, &time);
        let on_count = on
            .iter()
            .take(1000)
            .filter(|&&level| level == params.voltage)
            .count();
        assert!((on_count as f64 - 500.0).abs() <= 1.0);
    }
}
