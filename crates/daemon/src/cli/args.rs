pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "tiletalk")]
#[command(about = "End-to-end encrypted messages on a shared 4x4 grid")]
pub struct Args {
    /// Daemon API URL (defaults to localhost on the configured api_port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the tiletalk config directory (defaults to ~/.tiletalk)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
