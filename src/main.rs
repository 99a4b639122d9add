//! Autoclicker - clicks at a configurable interval
//!
//! Toggle with the global hotkey (F8 by default) or the `start`/`stop`
//! console commands. Type `help` for the full command list.

use autoclicker::{
    console::HELP, App, AutoclickError, ClickType, Command, Config, InputListener, Reply,
    XTestMouse,
};
use clap::Parser;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "autoclicker", version, about = "Interval auto-clicker with a toggle hotkey")]
struct Cli {
    /// Minutes between clicks
    #[arg(long, default_value = "0")]
    minutes: String,

    /// Seconds between clicks
    #[arg(long, default_value = "1")]
    seconds: String,

    /// Milliseconds between clicks
    #[arg(long, default_value = "500")]
    millis: String,

    /// Toggle hotkey (e.g. F8, F9, space, q)
    #[arg(long, default_value = "F8")]
    hotkey: String,

    /// Double click instead of single click
    #[arg(long)]
    double: bool,

    /// Let the pointer move between clicks
    #[arg(long)]
    no_freeze: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let click_type = if self.double {
            ClickType::Double
        } else {
            ClickType::Single
        };
        Config::default()
            .with_rate(self.minutes, self.seconds, self.millis)
            .with_click_type(click_type)
            .with_freeze_pointer(!self.no_freeze)
            .with_hotkey(self.hotkey)
            .with_verbose(self.verbose)
    }
}

/// Forward stdin lines to the main loop until EOF
fn spawn_stdin_reader(sender: mpsc::Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read console input: {}", e);
                    break;
                }
            }
        }
    })
}

fn main() -> Result<(), AutoclickError> {
    let config = Cli::parse().into_config();

    // Initialize logging
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    info!("Autoclicker starting...");
    info!(
        "Config: rate={}m {}s {}ms, type={}, freeze={}, hotkey={}",
        config.minutes,
        config.seconds,
        config.milliseconds,
        config.click_type,
        config.freeze_pointer,
        config.hotkey
    );

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        info!("Shutdown signal received");
        running_clone.store(false, Ordering::SeqCst);
    })
    .map_err(|e| AutoclickError::Channel(format!("Failed to set Ctrl+C handler: {}", e)))?;

    let mouse = match XTestMouse::new() {
        Ok(mouse) => mouse,
        Err(e) => {
            error!("{}", e);
            error!("An X11 session with the XTEST extension is required (is DISPLAY set?)");
            return Err(e);
        }
    };

    let app = App::new(mouse, &config)?;

    // Start input listener in background thread
    let _listener_handle = InputListener::new(app.hub().clone()).start();
    info!("Input listener ready - {}", app.hotkey().label());

    let (sender, receiver) = mpsc::channel();
    let _stdin_handle = spawn_stdin_reader(sender);
    let mut console_open = true;

    println!("{}", HELP);
    println!("{}", app.status());

    // Main command loop
    while running.load(Ordering::SeqCst) {
        if !console_open {
            // Hotkey still works without a console
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        let line = match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Console closed, hotkey only (Ctrl+C to exit)");
                console_open = false;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>().and_then(|cmd| app.execute(cmd)) {
            Ok(Reply::Text(text)) => println!("{}", text),
            Ok(Reply::Quit) => break,
            Err(e) => println!("{}", e),
        }
    }

    info!("Autoclicker shutting down...");
    app.shutdown();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_config() {
        let cli = Cli::try_parse_from(["autoclicker"]).unwrap();
        assert_eq!(cli.into_config(), Config::default());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "autoclicker",
            "--minutes",
            "1",
            "--seconds",
            "0",
            "--millis",
            "250",
            "--hotkey",
            "F9",
            "--double",
            "--no-freeze",
            "-v",
        ])
        .unwrap();
        let config = cli.into_config();

        let expected = Config::default()
            .with_rate("1", "0", "250")
            .with_hotkey("F9")
            .with_click_type(ClickType::Double)
            .with_freeze_pointer(false)
            .with_verbose(true);
        assert_eq!(config, expected);
    }
}
