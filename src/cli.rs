//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "xarcade2joystick")]
#[command(about = "Remap an X-Arcade control panel to virtual gamepads or a MAME keyboard")]
pub struct Cli {
    /// Detach from the controlling terminal once the devices are acquired
    #[arg(short, long)]
    pub detach: bool,

    /// Write logs to this file instead of stderr
    #[arg(short, long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Start in MAME (keyboard passthrough) mode
    #[arg(short, long)]
    pub mame: bool,

    /// Config file path (default: ~/.config/xarcade2joystick/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective config (including --mame) to the config path and exit
    #[arg(long)]
    pub write_config: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
