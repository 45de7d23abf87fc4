//! CLI argument definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sprig rendering server CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: sprig.toml)
    #[arg(short = 'C', long, default_value = "sprig.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the rendering server with the bundled demo page tree
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Use production error presentation (opaque failure pages)
        #[arg(long)]
        production: bool,
    },
}
