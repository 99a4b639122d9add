//! The background click loop
//!
//! Each iteration takes a settings snapshot, optionally puts the pointer back
//! where it was when the run started, clicks, then sleeps for the interval.
//! The sleep is a channel wait, so a stop request ends the run without waiting
//! for the interval to elapse: the stop latency is bounded by the click action
//! in progress.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::input_simulator::MouseBackend;
use crate::settings::ClickSettings;

/// Controller side of a run's stop signal
#[derive(Debug)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    wake: Option<Sender<()>>,
}

impl StopHandle {
    /// Request the loop to exit; idempotent
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Dropping the sender disconnects the channel and wakes the sleeper
        self.wake.take();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Loop side of a run's stop signal
#[derive(Debug)]
pub struct StopSignal {
    running: Arc<AtomicBool>,
    wake: Receiver<()>,
}

impl StopSignal {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sleep for `interval` or until stopped; returns whether to keep going
    pub fn wait(&self, interval: Duration) -> bool {
        match self.wake.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => self.is_running(),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// Create a linked stop handle/signal pair in the running state
pub fn stop_signal() -> (StopHandle, StopSignal) {
    let running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = mpsc::channel();
    (
        StopHandle {
            running: running.clone(),
            wake: Some(tx),
        },
        StopSignal { running, wake: rx },
    )
}

fn capture_position<M: MouseBackend + ?Sized>(mouse: &mut M) -> Option<(i32, i32)> {
    match mouse.position() {
        Ok(pos) => {
            debug!("Freezing pointer at {:?}", pos);
            Some(pos)
        }
        Err(e) => {
            error!("Failed to read pointer position: {}", e);
            None
        }
    }
}

fn restore_position<M: MouseBackend + ?Sized>(mouse: &mut M, (x, y): (i32, i32)) {
    if let Err(e) = mouse.move_to(x, y) {
        error!("Failed to restore pointer to ({}, {}): {}", x, y, e);
    }
}

/// Run clicks until `stop` fires; returns the number of clicks issued
///
/// Rate, click type and freeze flag are read live every iteration. Failed
/// clicks are logged and not counted; they never end the run.
pub fn run_click_loop<M: MouseBackend + ?Sized>(
    mouse: &Mutex<M>,
    settings: &ClickSettings,
    stop: &StopSignal,
) -> u64 {
    let mut anchor = if settings.freeze_pointer() {
        capture_position(&mut *mouse.lock())
    } else {
        None
    };
    let mut clicks = 0u64;

    info!("Click loop started");

    while stop.is_running() {
        let snapshot = settings.snapshot();

        {
            let mut mouse = mouse.lock();
            if snapshot.freeze_pointer {
                if anchor.is_none() {
                    anchor = capture_position(&mut *mouse);
                }
                if let Some(pos) = anchor {
                    restore_position(&mut *mouse, pos);
                }
            }

            match mouse.click(snapshot.click_type) {
                Ok(()) => {
                    clicks += 1;
                    debug!("{} click #{}", snapshot.click_type, clicks);
                }
                Err(e) => error!("Failed to send click: {}", e),
            }
        }

        if !stop.wait(Duration::from_millis(snapshot.interval_ms)) {
            break;
        }
    }

    if settings.freeze_pointer() {
        if let Some(pos) = anchor {
            restore_position(&mut *mouse.lock(), pos);
        }
    }

    info!("Click loop stopped after {} clicks", clicks);
    clicks
}
