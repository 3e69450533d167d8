// src/timer.rs
//
// Periodic tick source for the engine. A background thread multiplexes a
// crossbeam ticker with a command channel, so interval changes and
// pause/resume take effect between ticks without dropping buffer state.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender};
use log::debug;
use parking_lot::Mutex;

use crate::engine::PwmEngine;

#[derive(Debug)]
enum TimerCmd {
    SetInterval(u64),
    Pause,
    Resume,
    Shutdown,
}

/// Handle to the tick thread. Dropping it shuts the thread down.
pub struct TickTimer {
    cmd_tx: Sender<TimerCmd>,
    handle: Option<JoinHandle<()>>,
}

impl TickTimer {
    /// Start ticking `engine` at its configured interval.
    pub fn spawn(engine: Arc<Mutex<PwmEngine>>) -> Self {
        let (cmd_tx, cmd_rx) = bounded(16);
        let interval_ms = engine.lock().params().interval_ms;
        let handle = thread::spawn(move || run(engine, cmd_rx, interval_ms));
        Self {
            cmd_tx,
            handle: Some(handle),
        }
    }

    pub fn set_interval(&self, ms: u64) {
        let _ = self.cmd_tx.send(TimerCmd::SetInterval(ms));
    }

    pub fn pause(&self) {
        let _ = self.cmd_tx.send(TimerCmd::Pause);
    }

    pub fn resume(&self) {
        let _ = self.cmd_tx.send(TimerCmd::Resume);
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(TimerCmd::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(engine: Arc<Mutex<PwmEngine>>, cmd_rx: Receiver<TimerCmd>, interval_ms: u64) {
    let mut ticker = tick(tick_period(interval_ms));
    loop {
        select! {
            recv(ticker) -> _ => {
                let _ = engine.lock().tick();
            }
            recv(cmd_rx) -> cmd => match cmd {
                Ok(TimerCmd::SetInterval(ms)) => {
                    debug!("tick interval set to {ms} ms");
                    engine.lock().set_tick_interval(ms);
                    ticker = tick(tick_period(ms));
                }
                Ok(TimerCmd::Pause) => {
                    debug!("tick source paused");
                    engine.lock().pause();
                    ticker = never();
                }
                Ok(TimerCmd::Resume) => {
                    let ms = {
                        let mut engine = engine.lock();
                        engine.resume();
                        engine.params().interval_ms
                    };
                    debug!("tick source resumed at {ms} ms");
                    ticker = tick(tick_period(ms));
                }
                Ok(TimerCmd::Shutdown) | Err(_) => break,
            }
        }
    }
}

// A 0 ms request would make the ticker spin; the engine still reports the
// requested value.
fn tick_period(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}
