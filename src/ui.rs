use std::sync::Arc;

use eframe::egui::plot::{Legend, Line, Plot, PlotBounds, PlotPoints};
use eframe::egui::{self, Color32, RichText};
use parking_lot::Mutex;

use crate::engine::{Channel, PwmEngine};
use crate::params::{suggested_accuracy, suggested_step, RawParams};
use crate::timer::TickTimer;

const ON_COLOR: Color32 = Color32::from_rgb(0, 255, 0);
const OFF_COLOR: Color32 = Color32::from_rgb(255, 80, 80);
const SINE_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

pub struct SimUi {
    engine: Arc<Mutex<PwmEngine>>,
    timer: TickTimer,
    voltage_text: String,
    freq_text: String,
    duty_text: String,
    accuracy_text: String,
    step_text: String,
    cycles: u32,
    interval_ms: u64,
    show_off: bool,
    show_sine: bool,
    paused: bool,
    warning: Option<String>,
    debug_logs: bool,
}

impl SimUi {
    pub fn new(engine: Arc<Mutex<PwmEngine>>, timer: TickTimer) -> Self {
        let (params, show_off, show_sine) = {
            let engine = engine.lock();
            (
                engine.params().clone(),
                engine.show_off(),
                engine.show_sine(),
            )
        };
        Self {
            engine,
            timer,
            voltage_text: params.voltage.to_string(),
            freq_text: params.frequency.to_string(),
            duty_text: params.duty.to_string(),
            accuracy_text: params.accuracy.to_string(),
            step_text: params.step_size.to_string(),
            cycles: params.cycles,
            interval_ms: params.interval_ms,
            show_off,
            show_sine,
            paused: false,
            warning: None,
            debug_logs: false,
        }
    }

    pub fn update(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_plot(ui);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(format!("Cycles: {}", self.cycles));
                ui.add_space(20.0);
                self.draw_log_selector(ui);
                ui.add_space(20.0);
                ui.label(format!("Time (Delay): {}ms", self.interval_ms));
            });
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                self.draw_cycles_knob(ui);
                self.draw_monitor(ui);
                self.draw_inputs(ui);
                self.draw_interval_knob(ui);
            });
        });
        // The timer thread keeps sliding while the UI is idle.
        ctx.request_repaint();
    }

    fn draw_plot(&mut self, ui: &mut egui::Ui) {
        let (snapshot, params) = {
            let engine = self.engine.lock();
            (engine.snapshot(), engine.params().clone())
        };
        let series = |values: &[f64]| -> PlotPoints {
            snapshot
                .time
                .iter()
                .zip(values)
                .map(|(&t, &v)| [t, v])
                .collect::<Vec<_>>()
                .into()
        };

        ui.horizontal(|ui| {
            ui.heading("PWM Simulator/Generator");
            ui.add_space(16.0);
            ui.label(format!(
                "Frequency: {} Hz   Voltage: {} VDC   Pulse ON: {:.prec$} Sec",
                params.frequency,
                params.voltage,
                params.pulse_on_time,
                prec = params.accuracy as usize
            ));
        });

        let x_min = snapshot.time.first().copied().unwrap_or(0.0);
        let x_max = snapshot.time.last().copied().unwrap_or(0.0);
        let y_max = params.voltage + 2.0;
        let y_min = if self.show_sine { -y_max } else { 0.0 };

        let on_line = Line::new(series(&snapshot.on))
            .color(ON_COLOR)
            .fill(0.0)
            .name("PWM ON");
        let off_line = Line::new(series(&snapshot.off))
            .color(OFF_COLOR)
            .fill(0.0)
            .name("PWM OFF");
        let sine_line = Line::new(series(&snapshot.sine))
            .color(SINE_COLOR)
            .name("Sine");

        Plot::new("waveform")
            .legend(Legend::default())
            .height(360.0)
            .allow_scroll(false)
            .allow_drag(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_min, y_min],
                    [x_max, y_max],
                ));
                plot_ui.line(on_line);
                plot_ui.line(off_line);
                plot_ui.line(sine_line);
            });
    }

    fn draw_inputs(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.vertical(|ui| {
                if ui.checkbox(&mut self.show_off, "Show OFF Cycle").changed() {
                    self.engine.lock().set_display(Channel::Off, self.show_off);
                }
                if ui.checkbox(&mut self.show_sine, "Show Sine Wave").changed() {
                    self.engine
                        .lock()
                        .set_display(Channel::Sine, self.show_sine);
                }

                text_field(ui, "Voltage:", &mut self.voltage_text);
                text_field(ui, "Frequency:", &mut self.freq_text);
                text_field(ui, "Duty Cycle:", &mut self.duty_text);
                text_field(ui, "Accuracy:", &mut self.accuracy_text);
                text_field(ui, "Step Size:", &mut self.step_text);

                let frequency = self.engine.lock().params().frequency;
                ui.label(format!("Accuracy (min): {}", suggested_accuracy(frequency)));
                ui.label(format!("Step Size (min): {}", suggested_step(frequency)));

                ui.horizontal(|ui| {
                    let pause_label = if self.paused { "Resume" } else { "Pause" };
                    if ui.button(pause_label).clicked() {
                        self.paused = !self.paused;
                        if self.paused {
                            self.timer.pause();
                        } else {
                            self.timer.resume();
                        }
                    }
                    if ui.button("Update").clicked() {
                        self.apply();
                    }
                });

                if let Some(message) = &self.warning {
                    ui.colored_label(Color32::RED, message);
                }
            });
        });
    }

    fn draw_monitor(&mut self, ui: &mut egui::Ui) {
        let params = self.engine.lock().params().clone();
        let text = format!(
            "Voltage:        {} VDC\n\
             Frequency:      {} Hz\n\
             Time Period:    {} Sec\n\
             Duty Cycle:     {} %\n\
             Pulse width:    {} Sec\n\
             Step Size:      {}\n\
             No. Cycles:     {}\n\
             Accuracy Value: {} Decimals",
            params.voltage,
            params.frequency,
            params.time_period,
            params.duty,
            params.pulse_on_time,
            params.step_size,
            params.cycles,
            params.accuracy
        );
        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.label("Monitor");
                ui.label(RichText::new(text).monospace());
            });
        });
    }

    fn draw_cycles_knob(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label("Cycles");
            if ui
                .add(egui::Slider::new(&mut self.cycles, 1..=100).vertical())
                .changed()
            {
                self.apply();
            }
        });
    }

    fn draw_interval_knob(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label("Delay (ms)");
            if ui
                .add(egui::Slider::new(&mut self.interval_ms, 0..=1000).vertical())
                .changed()
            {
                self.timer.set_interval(self.interval_ms);
            }
        });
    }

    fn draw_log_selector(&mut self, ui: &mut egui::Ui) {
        ui.label("Logs Level:");
        let selected = if self.debug_logs { "DEBUG" } else { "INFO" };
        egui::ComboBox::from_id_source("log_level")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_value(&mut self.debug_logs, false, "INFO")
                    .clicked()
                    || ui
                        .selectable_value(&mut self.debug_logs, true, "DEBUG")
                        .clicked()
                {
                    log::set_max_level(if self.debug_logs {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    });
                }
            });
    }

    fn apply(&mut self) {
        let raw = RawParams {
            frequency: non_empty(&self.freq_text),
            duty: non_empty(&self.duty_text),
            voltage: non_empty(&self.voltage_text),
            accuracy: non_empty(&self.accuracy_text),
            step_size: non_empty(&self.step_text),
            cycles: Some(self.cycles),
        };
        match self.engine.lock().reconfigure(&raw) {
            Ok(outcome) => {
                // Write the clamped values back so the fields show what the
                // engine actually uses.
                self.accuracy_text = outcome.accuracy.to_string();
                self.step_text = outcome.step_size.to_string();
                self.warning = None;
            }
            Err(error) => self.warning = Some(error.to_string()),
        }
    }
}

fn text_field(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::TextEdit::singleline(value).desired_width(70.0));
    });
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
