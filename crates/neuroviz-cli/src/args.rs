//! Command-line arguments.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use neuroviz_client::config::DEFAULT_BASE_URL;

/// NeuroViz live-stream and session client
#[derive(Parser, Debug)]
#[command(name = "neuroviz")]
#[command(about = "NeuroViz EEG live-stream and session client")]
#[command(version)]
pub struct Args {
    /// REST API root
    #[arg(long, env = "NEUROVIZ_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Streaming WebSocket endpoint
    #[arg(long, env = "NEUROVIZ_STREAM_URL", default_value = "ws://localhost/ws/stream", global = true)]
    pub stream_url: String,

    /// File holding the bearer token between invocations
    #[arg(long, env = "NEUROVIZ_TOKEN_FILE", default_value = ".neuroviz-token", global = true)]
    pub token_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream live EEG and log band power per sample
    Stream {
        /// Channels to display, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = default_channels())]
        channels: Vec<String>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Stop after writing this many sample lines
        #[arg(long)]
        samples: Option<usize>,

        /// Data request period in milliseconds
        #[arg(long, default_value = "40")]
        tick_ms: u64,

        /// Give up on the socket handshake after this many seconds
        #[arg(long, default_value = "10")]
        connect_timeout: u64,
    },

    /// Log in and store the token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "NEUROVIZ_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List sessions
    Sessions {
        /// Zero-based page
        #[arg(long, default_value = "0")]
        page: u32,

        /// Page size
        #[arg(long)]
        size: Option<u32>,

        /// Search by name instead of paging
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one session
    Session {
        /// Session id
        id: u64,
    },

    /// Create a session, optionally uploading a recording
    Upload {
        /// Session name
        #[arg(long)]
        name: String,

        /// Recording to upload
        #[arg(long)]
        file: Option<PathBuf>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Start preprocessing a session
    Preprocess {
        /// Session id
        id: u64,

        /// Bandpass filter as LOW,HIGH in Hz
        #[arg(long, value_delimiter = ',')]
        bandpass: Option<Vec<f64>>,

        /// Notch filter frequency in Hz
        #[arg(long)]
        notch: Option<f64>,

        /// Remove artifacts
        #[arg(long)]
        artifact: bool,

        /// Poll until the job finishes
        #[arg(long)]
        wait: bool,
    },

    /// Run a server-side analysis of one channel
    Analyze {
        /// Session id
        id: u64,

        /// Channel to analyze
        #[arg(long)]
        channel: String,

        /// Analysis to run
        #[arg(long, value_enum, default_value_t = AnalysisKind::Bands)]
        kind: AnalysisKind,
    },

    /// Classify a session
    Classify {
        /// Session id
        id: u64,
    },

    /// Show a processing job
    Job {
        /// Job id
        id: u64,

        /// Poll until the job finishes
        #[arg(long)]
        wait: bool,

        /// Seconds between polls
        #[arg(long, default_value = "2")]
        interval: u64,

        /// Maximum number of polls
        #[arg(long, default_value = "60")]
        max_polls: u32,
    },
}

/// Server-side analyses.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Power spectral density
    Psd,
    /// Band power
    Bands,
}

/// Polling used by `--wait` on commands that start jobs.
pub const JOB_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll limit used by `--wait` on commands that start jobs.
pub const JOB_MAX_POLLS: u32 = 60;

fn default_channels() -> Vec<String> {
    neuroviz_core::DEFAULT_CHANNELS.iter().map(|&c| c.to_owned()).collect()
}
