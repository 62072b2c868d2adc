use crate::support::open_store_or_exit;
use cluehunt_core::{PrintFilter, print_view};

pub fn run(data: String, hostname: String, only: Vec<String>, json: bool) {
    let (store, _) = open_store_or_exit(&data);
    let filter = if only.is_empty() {
        PrintFilter::All
    } else {
        PrintFilter::Only(only.into_iter().collect())
    };
    let entries = store.read(|state| print_view(state, &hostname, &filter));

    if json {
        let payload = serde_json::json!({ "clues": entries });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|e| {
                eprintln!("error: failed to render print sheet: {e}");
                std::process::exit(1);
            })
        );
        return;
    }

    for entry in entries.iter().filter(|e| e.show) {
        println!("{}\t{}\t{}\t{}", entry.id, entry.name, entry.solve_code, entry.solve_url);
    }
}
