//! X-Arcade to gamepad remapper
//!
//! Main entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{error, info};

use xarcade2joystick::cli::Cli;
use xarcade2joystick::config::RemapConfig;
use xarcade2joystick::lifecycle::{self, Controller, DeviceHandles};
use xarcade2joystick::logging::init_logging;
use xarcade2joystick::mode::{Mode, ModeCell};
use xarcade2joystick::remap::Remapper;
use xarcade2joystick::signals;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level, cli.log_file.as_deref()) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Held until the listener is installed so startup signals are not lost
    let held = signals::hold().context("Failed to block signals")?;

    let config_path = cli.config.unwrap_or_else(RemapConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = RemapConfig::load(&config_path)?;
    if cli.mame {
        config.mode = Mode::Mame;
    }

    if cli.write_config {
        config.save(&config_path)?;
        info!("Config written to {:?}", config_path);
        return Ok(ExitCode::SUCCESS);
    }

    let handles = DeviceHandles::open(&config)?;

    // Forking must happen before the runtime spawns its threads
    if cli.detach {
        lifecycle::detach().context("Failed to detach from terminal")?;
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let mode = ModeCell::new(config.mode);
        let (control_tx, mut control_rx) = mpsc::unbounded_channel();

        // Built first so a failing listener still releases the devices
        let mut controller = Controller::new(handles, Remapper::new(mode.clone()));
        let listener = signals::spawn_listener(mode, control_tx)
            .context("Failed to install signal handlers")?;
        drop(held);

        let reason = controller.run(&mut control_rx).await;
        listener.abort();
        Ok::<_, anyhow::Error>(reason.exit_code())
    })
}
