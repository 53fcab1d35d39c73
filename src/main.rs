//! Folio - a development static-asset server.
//!
//! Serves configured folders with per-kind transforms (script annotate +
//! minify, stylesheet minify, conservative markup minify, version stamping),
//! caches production responses per (host, URL), and disconnects live-reload
//! clients when watched files change.

mod cli;
mod config;
mod error;
mod folder;
mod logger;
mod reader;
mod reload;
mod server;
mod transform;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve {
            interface,
            port,
            watch,
            verbose,
        } => {
            logger::set_verbose(verbose);
            if let Some(interface) = interface {
                config.serve.interface = interface;
            }
            if let Some(port) = port {
                config.serve.port = port;
            }
            if let Some(watch) = watch {
                config.serve.watch = watch;
            }
            server::run(config)
        }
    }
}
