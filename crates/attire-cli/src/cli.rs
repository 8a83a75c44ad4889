use clap::Parser;
use std::path::PathBuf;

use attire_chat::InfoMode;

/// Terminal front-end for the weather attire assistant.
#[derive(Debug, Parser)]
#[command(name = "attire", about = "Weather attire assistant")]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config/attire.json")]
    pub config: PathBuf,

    /// Initial display mode: attire or weather
    #[arg(long, default_value = "attire")]
    pub mode: InfoMode,

    /// Disable the on-disk response cache for this run
    #[arg(long)]
    pub no_cache_file: bool,
}
