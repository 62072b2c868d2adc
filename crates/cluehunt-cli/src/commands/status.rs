use crate::support::{open_store_or_exit, yes_no};
use chrono::Utc;
use cluehunt_core::format_elapsed;

pub fn run(data: String, json: bool) {
    let (store, path) = open_store_or_exit(&data);
    let state = store.snapshot();
    let time = format_elapsed(state.elapsed(Utc::now()));
    let solved = state.clues.iter().filter(|c| c.is_solved()).count();
    let visible = state.visible_clues();

    if json {
        let payload = serde_json::json!({
            "action": "status",
            "path": path.display().to_string(),
            "time": time,
            "started": state.started(),
            "ended": state.end.is_some(),
            "complete": state.complete(),
            "hints": state.hints,
            "total": state.clues.len(),
            "solved": solved,
            "visible": visible
                .iter()
                .map(|c| serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "unlocked": c.unlocked,
                    "solved": c.is_solved(),
                    "hintShown": c.hint_shown,
                }))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|e| {
                eprintln!("error: failed to render status: {e}");
                std::process::exit(1);
            })
        );
        return;
    }

    println!("cluehunt status");
    println!("  Path: {}", path.display());
    println!("  Started: {}", yes_no(state.started()));
    println!("  Ended: {}", yes_no(state.end.is_some()));
    println!("  Time: {time}");
    println!("  Hints left: {}", state.hints);
    println!("  Solved: {solved}/{}", state.clues.len());
    if visible.is_empty() {
        println!("  Visible clues: none");
    } else {
        println!("  Visible clues:");
        for clue in visible {
            let marker = if clue.is_solved() { "solved" } else { "open" };
            let hint = if clue.hint_shown { " (hint shown)" } else { "" };
            println!("    - {} [{}] {marker}{hint}", clue.id, clue.name);
        }
    }
}
