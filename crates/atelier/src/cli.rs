use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the backend; overrides `ATELIER_API_URL`.
    #[arg(long, global = true)]
    pub api: Option<String>,

    /// Sets the level of logging; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log: LogLevel,

    /// Print chart JSON on a single line.
    #[arg(long, global = true)]
    pub compact: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the fashion events available for analysis.
    Events,

    /// Impact, sentiment & average impact charts for one event.
    Event {
        /// Event id, as listed by `atelier events`.
        id: i64,
    },

    /// List the tradeable fashion companies.
    Tickers,

    /// Historical & forecast price charts for one ticker.
    Stock {
        ticker: String,
    },

    /// Recommended tickers; each `--hover` replays a pointer over that ticker's row.
    Invest {
        #[arg(long = "hover", value_name = "TICKER")]
        hovers: Vec<String>,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
