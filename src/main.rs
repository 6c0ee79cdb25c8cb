use std::path::PathBuf;

use anyhow::Context;
use bhojan_bridge::feed::Role;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Role to watch notifications for: admin, delivery or customer
    #[arg(long)]
    role: Option<Role>,

    /// Base URL of the BhojanXpress web application
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// Log more; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .env()
        .init()
        .context("failed to build logger instance")?;

    let options = bhojan_backend::RuntimeOptions {
        config_path: args.config,
        role: args.role,
        base_url: args.base_url,
    };

    let channels = bhojan_bridge::BridgeChannels::default();
    let backend = bhojan_backend::run(channels.backend_rx, channels.backend_tx, options);
    let result = bhojan_frontend::run(channels.frontend_rx, channels.frontend_tx);

    if backend.join().is_err() {
        log::error!("Backend thread panicked");
    }
    result.context("failed to run frontend")
}
