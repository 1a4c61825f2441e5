//! NeuroViz command-line client.
//!
//! # Usage
//!
//! ```bash
//! # Stream live band power from a local backend
//! neuroviz stream --channels Fz,C3,C4 --duration 30
//!
//! # Log in once, then browse sessions
//! neuroviz login --email ada@example.com
//! neuroviz sessions --page 0
//! neuroviz analyze 12 --channel Cz --kind psd
//! ```

mod args;
mod commands;
mod error;
mod output;
mod stream;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so command output on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    commands::run(args).await?;
    Ok(())
}
