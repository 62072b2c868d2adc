//! Cluehunt CLI: the `cluehunt` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            data,
            clues,
            bind,
            hostname,
            debounce_ms,
            poll_ms,
        } => commands::serve::run(commands::serve::Args {
            data,
            clues,
            bind,
            hostname,
            debounce_ms,
            poll_ms,
        }),

        Commands::Status { data, json } => commands::status::run(data, json),

        Commands::Print {
            data,
            hostname,
            only,
            json,
        } => commands::print::run(data, hostname, only, json),

        Commands::SetHints { hints, data } => commands::admin::run_set_hints(hints, data),

        Commands::End { data } => commands::admin::run_end(data),
    }
}
