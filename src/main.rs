mod axis;
mod buffer;
mod engine;
mod params;
mod phase;
mod timer;
mod ui;

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;

use engine::PwmEngine;
use params::SimParams;
use timer::TickTimer;
use ui::SimUi;

struct SimApp {
    ui: SimUi,
}

impl eframe::App for SimApp {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        self.ui.update(ctx);
    }
}

fn init_logging() -> anyhow::Result<()> {
    let log_file = File::create("simulator.log").context("failed to create simulator.log")?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}]: {}: {}: {}",
                record.level(),
                buf.timestamp_millis(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init()?;
    // The logger itself passes everything; the global gate starts at INFO
    // and the UI dropdown raises it to DEBUG on demand.
    log::set_max_level(log::LevelFilter::Info);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let engine = Arc::new(Mutex::new(PwmEngine::new(SimParams::default())));
    let timer = TickTimer::spawn(Arc::clone(&engine));
    let ui = SimUi::new(engine, timer);

    let options = eframe::NativeOptions {
        initial_window_size: Some(eframe::egui::Vec2::new(1000.0, 680.0)),
        ..Default::default()
    };

    eframe::run_native(
        "PWM Simulator/Generator",
        options,
        Box::new(|_cc| Box::new(SimApp { ui })),
    )
    .map_err(|e| anyhow::anyhow!("window session failed: {e}"))?;

    Ok(())
}
