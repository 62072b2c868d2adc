//! Organizer overrides applied directly to the hunt file.
//!
//! These go through the same store operations as the server, so a running
//! `cluehunt serve` picks them up as external edits.

use crate::support::open_store_or_exit;
use chrono::Utc;
use cluehunt_core::format_elapsed;
use std::process;

pub fn run_set_hints(hints: u32, data: String) {
    let (store, path) = open_store_or_exit(&data);
    store.set_hint_pool(hints).unwrap_or_else(|e| {
        eprintln!("error: failed to save {}: {e}", path.display());
        process::exit(1);
    });
    println!("Hints left: {hints}");
}

pub fn run_end(data: String) {
    let (store, path) = open_store_or_exit(&data);
    let ended = store.end_hunt().unwrap_or_else(|e| {
        eprintln!("error: failed to save {}: {e}", path.display());
        process::exit(1);
    });
    if ended {
        let time = format_elapsed(store.read(|s| s.elapsed(Utc::now())));
        println!("Hunt ended at {time}");
    } else if store.read(|s| s.started()) {
        println!("Hunt already ended");
    } else {
        println!("Hunt has not started");
    }
}
