//! Start/stop control for the click loop
//!
//! Console commands and the global hotkey both land here. All transitions run
//! under one lock, so two near-simultaneous toggles are applied one after the
//! other and never leave two click loops alive.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

use crate::click_loop::{run_click_loop, stop_signal, StopHandle};
use crate::input_simulator::MouseBackend;
use crate::settings::ClickSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Idle,
    Running,
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleState::Idle => f.write_str("idle"),
            ToggleState::Running => f.write_str("running"),
        }
    }
}

struct Run {
    stop: StopHandle,
    worker: thread::JoinHandle<u64>,
}

/// Owns the click loop worker and the idle/running state
pub struct ToggleController<M: MouseBackend + 'static> {
    mouse: Arc<Mutex<M>>,
    settings: Arc<ClickSettings>,
    run: Mutex<Option<Run>>,
    last_run_clicks: AtomicU64,
}

impl<M: MouseBackend + 'static> ToggleController<M> {
    pub fn new(mouse: M, settings: Arc<ClickSettings>) -> Self {
        Self {
            mouse: Arc::new(Mutex::new(mouse)),
            settings,
            run: Mutex::new(None),
            last_run_clicks: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ToggleState {
        if self.run.lock().is_some() {
            ToggleState::Running
        } else {
            ToggleState::Idle
        }
    }

    pub fn settings(&self) -> &Arc<ClickSettings> {
        &self.settings
    }

    pub fn mouse(&self) -> &Arc<Mutex<M>> {
        &self.mouse
    }

    /// Clicks issued by the most recently finished run
    pub fn last_run_clicks(&self) -> u64 {
        self.last_run_clicks.load(Ordering::SeqCst)
    }

    /// Spawn the click loop; returns false if it was already running
    pub fn start(&self) -> bool {
        self.start_in(&mut self.run.lock())
    }

    /// Stop the click loop and wait for its thread; returns false if idle
    ///
    /// Waiting is bounded by the click in progress, not by the interval.
    pub fn stop(&self) -> bool {
        self.stop_in(&mut self.run.lock())
    }

    /// Flip idle/running and return the new state
    pub fn toggle(&self) -> ToggleState {
        let mut run = self.run.lock();
        if run.is_some() {
            self.stop_in(&mut run);
            ToggleState::Idle
        } else {
            self.start_in(&mut run);
            ToggleState::Running
        }
    }

    fn start_in(&self, run: &mut Option<Run>) -> bool {
        if run.is_some() {
            return false;
        }

        let (stop, signal) = stop_signal();
        let mouse = self.mouse.clone();
        let settings = self.settings.clone();
        let worker = thread::spawn(move || run_click_loop(&*mouse, &settings, &signal));

        info!("Autoclicker started");
        *run = Some(Run { stop, worker });
        true
    }

    fn stop_in(&self, run: &mut Option<Run>) -> bool {
        let Some(Run { mut stop, worker }) = run.take() else {
            return false;
        };

        stop.stop();
        match worker.join() {
            Ok(clicks) => {
                self.last_run_clicks.store(clicks, Ordering::SeqCst);
                info!("Autoclicker stopped ({} clicks)", clicks);
            }
            Err(_) => error!("Click loop thread panicked"),
        }
        true
    }
}

impl<M: MouseBackend + 'static> Drop for ToggleController<M> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_simulator::test_support::FakeMouse;
    use crate::settings::ClickType;
    use crate::RateConfig;
    use std::time::{Duration, Instant};

    fn controller(ms: &str) -> Arc<ToggleController<FakeMouse>> {
        let settings = Arc::new(ClickSettings::new(
            RateConfig::new("0", "0", ms),
            ClickType::Single,
            false,
        ));
        Arc::new(ToggleController::new(FakeMouse::at(10, 10), settings))
    }

    #[test]
    fn test_starts_idle() {
        let ctl = controller("5");
        assert_eq!(ctl.state(), ToggleState::Idle);
        assert!(!ctl.stop());
        assert_eq!(ctl.last_run_clicks(), 0);
    }

    #[test]
    fn test_toggle_round_trip() {
        let ctl = controller("5");
        assert_eq!(ctl.toggle(), ToggleState::Running);
        assert_eq!(ctl.state(), ToggleState::Running);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(ctl.toggle(), ToggleState::Idle);
        assert_eq!(ctl.state(), ToggleState::Idle);

        let clicks = ctl.mouse().lock().clicks.len() as u64;
        assert!(clicks >= 1);
        assert_eq!(ctl.last_run_clicks(), clicks);

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(ctl.mouse().lock().clicks.len() as u64, clicks);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let ctl = controller("5");
        assert!(ctl.start());
        assert!(!ctl.start());
        assert!(ctl.stop());
        assert!(!ctl.stop());
    }

    #[test]
    fn test_stop_does_not_wait_for_interval() {
        let ctl = controller("0");
        ctl.settings().set_rate_fields("5", "0", "0");
        ctl.start();
        std::thread::sleep(Duration::from_millis(30));

        let requested = Instant::now();
        ctl.stop();
        assert!(requested.elapsed() < Duration::from_secs(5));
        assert_eq!(ctl.last_run_clicks(), 1);
    }

    #[test]
    fn test_concurrent_toggles_never_double_spawn() {
        let ctl = controller("2");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctl = ctl.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        ctl.toggle();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 40 toggles from idle end idle again
        assert_eq!(ctl.state(), ToggleState::Idle);
        assert!(ctl.run.lock().is_none());
    }

    #[test]
    fn test_drop_stops_worker() {
        let ctl = controller("1");
        ctl.start();
        let mouse = ctl.mouse().clone();
        drop(ctl);

        let after_drop = mouse.lock().clicks.len();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(mouse.lock().clicks.len(), after_drop);
    }
}
