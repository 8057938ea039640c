//! Real-time driver
//!
//! Ticks a `Companion` from a tokio interval at the configured rate, with a
//! wall clock underneath so frame jitter shows up as dt rather than drift.
//! Control arrives on a `watch` channel; only the latest command matters.

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use pcpos_time::{ClockSource, FrameClock};

use crate::companion::Companion;

/// Driver control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Run,
    Pause,
    Stop,
}

/// Command channel starting in `Run`
pub fn driver_channel() -> (watch::Sender<DriverCommand>, watch::Receiver<DriverCommand>) {
    watch::channel(DriverCommand::Run)
}

/// Run until `Stop` (or the sender is dropped), then hand the companion back
pub async fn run_driver(
    mut companion: Companion,
    mut commands: watch::Receiver<DriverCommand>,
) -> Companion {
    let clock_config = companion.config().runtime.clock.clone();
    let mut interval = time::interval(clock_config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock = FrameClock::new(clock_config);

    tracing::debug!(rate_hz = clock.config().rate_hz(), "companion driver started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if clock.is_paused() {
                    continue;
                }
                let tick = clock.next_tick();
                companion.tick(tick.dt);
            }
            changed = commands.changed() => {
                if changed.is_err() {
                    break;
                }
                let command = *commands.borrow_and_update();
                match command {
                    DriverCommand::Run => {
                        clock.resume();
                        companion.resume();
                    }
                    DriverCommand::Pause => {
                        clock.pause();
                        companion.stop();
                    }
                    DriverCommand::Stop => break,
                }
            }
        }
    }

    tracing::debug!(
        ticks = companion.stats().ticks,
        at = ?companion.now(),
        "companion driver stopped"
    );
    companion
}
