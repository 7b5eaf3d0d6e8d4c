pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cfs")]
#[command(about = "Browse and edit a content collection as a filesystem")]
pub struct Args {
    /// Path to the contentfs state directory (defaults to ~/.contentfs)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}
