use crate::support::{init_logging, open_store_or_exit};
use cluehunt_core::WatchConfig;
use cluehunt_ux::http::{HttpServerConfig, serve_hunt};
use cluehunt_ux::{UxService, ViewConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct Args {
    pub data: String,
    pub clues: String,
    pub bind: String,
    pub hostname: String,
    pub debounce_ms: u64,
    pub poll_ms: u64,
}

pub fn run(args: Args) {
    init_logging();

    let bind_addr: SocketAddr = args.bind.parse().unwrap_or_else(|e| {
        eprintln!("error: invalid --bind address `{}`: {e}", args.bind);
        process::exit(1);
    });

    let (store, _) = open_store_or_exit(&args.data);
    let store = Arc::new(store);

    let watch_config = WatchConfig {
        debounce: Duration::from_millis(args.debounce_ms),
        poll_interval: Duration::from_millis(args.poll_ms.max(1)),
    };
    let _watch = store
        .watch(watch_config, |state| {
            info!(clues = state.clues.len(), hints = state.hints, "hunt state replaced");
        })
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    let service = UxService::new(
        Arc::clone(&store),
        ViewConfig {
            hostname: args.hostname.clone(),
            content_dir: PathBuf::from(&args.clues),
        },
    );

    println!("cluehunt serve");
    println!("  bind: {bind_addr}");
    println!("  data: {}", args.data);
    println!("  clues: {}", args.clues);
    println!("  hostname: {}", args.hostname);
    println!("  routes:");
    println!("    GET  /healthz");
    println!("    GET  /");
    println!("    GET  /start");
    println!("    GET  /hints?hints=<n>");
    println!("    GET  /print[?<clue_id>=on...]");
    println!("    GET  /clue/<clue_id>");
    println!("    POST /clue/<clue_id>");
    println!("    GET  /solve?id=<solve_code>");

    if let Err(e) = serve_hunt(HttpServerConfig { bind: bind_addr }, &service) {
        eprintln!("error: hunt server failed: {e}");
        process::exit(1);
    }
}
