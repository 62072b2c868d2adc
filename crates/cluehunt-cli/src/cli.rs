use clap::{Parser, Subcommand};

pub const DEFAULT_DATA_PATH: &str = "hunt.json";
pub const DEFAULT_CLUES_DIR: &str = "clues";
pub const DEFAULT_BIND: &str = "0.0.0.0:9090";
pub const DEFAULT_HOSTNAME: &str = "http://localhost:9090";

#[derive(Parser)]
#[command(
    name = "cluehunt",
    about = "Cluehunt: run a scavenger hunt from a hand-editable JSON file",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the hunt over HTTP and reload hand edits of the hunt file
    Serve {
        /// Path to the hunt file
        #[arg(long, env = "CLUEHUNT_DATA", default_value = DEFAULT_DATA_PATH)]
        data: String,

        /// Directory with `<clue id>/content.html` and `<clue id>/hint.html`
        #[arg(long, env = "CLUEHUNT_CLUES", default_value = DEFAULT_CLUES_DIR)]
        clues: String,

        /// Bind address (host:port)
        #[arg(long, env = "CLUEHUNT_BIND", default_value = DEFAULT_BIND)]
        bind: String,

        /// Public base URL used in printed solve links
        #[arg(long, env = "HOSTNAME", default_value = DEFAULT_HOSTNAME)]
        hostname: String,

        /// Quiet window before an observed file change is acted on
        #[arg(long, env = "CLUEHUNT_DEBOUNCE_MS", default_value_t = 3000)]
        debounce_ms: u64,

        /// How often the hunt file is checked for changes
        #[arg(long, env = "CLUEHUNT_POLL_MS", default_value_t = 250)]
        poll_ms: u64,
    },

    /// Show elapsed time, the hint pool and the clues participants can see
    Status {
        /// Path to the hunt file
        #[arg(long, env = "CLUEHUNT_DATA", default_value = DEFAULT_DATA_PATH)]
        data: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every clue with its solve code and solve URL
    Print {
        /// Path to the hunt file
        #[arg(long, env = "CLUEHUNT_DATA", default_value = DEFAULT_DATA_PATH)]
        data: String,

        /// Public base URL used in solve links
        #[arg(long, env = "HOSTNAME", default_value = DEFAULT_HOSTNAME)]
        hostname: String,

        /// Only mark these clue ids for printing (repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Override the number of hints remaining
    SetHints {
        /// New pool size
        hints: u32,

        /// Path to the hunt file
        #[arg(long, env = "CLUEHUNT_DATA", default_value = DEFAULT_DATA_PATH)]
        data: String,
    },

    /// Stamp the end of the hunt, freezing the elapsed time
    End {
        /// Path to the hunt file
        #[arg(long, env = "CLUEHUNT_DATA", default_value = DEFAULT_DATA_PATH)]
        data: String,
    },
}
