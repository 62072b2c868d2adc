use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const HUNT: &str = r#"{
    "clues": [
        { "id": "fountain", "name": "The Fountain", "solveCode": "A1", "unlocked": true, "solved": false, "hintShown": false },
        { "id": "library", "name": "The Library", "solveCode": "B2", "unlocked": false, "solved": 1714816800000, "hintShown": true },
        { "id": "clock", "name": "The Clock", "solveCode": "C3", "unlocked": false, "solved": null, "hintShown": false }
    ],
    "hints": 2,
    "start": 1714816200000,
    "end": false
}
"#;

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "cluehunt-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn hunt_file(&self) -> PathBuf {
        let path = self.path.join("hunt.json");
        fs::write(&path, HUNT).expect("hunt fixture should be written");
        path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_cluehunt<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_cluehunt");
    Command::new(bin)
        .args(args)
        .env_remove("CLUEHUNT_DATA")
        .env_remove("HOSTNAME")
        .output()
        .expect("cluehunt command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be valid json: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn read_hunt(path: &Path) -> Value {
    let bytes = fs::read(path).expect("hunt file should be readable");
    serde_json::from_slice(&bytes).expect("hunt file should be valid json")
}

#[test]
fn status_json_lists_visible_clues() {
    let tmp = TempDirGuard::new("status-json");
    let hunt = tmp.hunt_file();

    let output = run_cluehunt([
        OsStr::new("status"),
        OsStr::new("--data"),
        hunt.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["action"], "status");
    assert_eq!(payload["started"], true);
    assert_eq!(payload["ended"], false);
    assert_eq!(payload["hints"], 2);
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["solved"], 1);

    let visible = payload["visible"].as_array().expect("visible should be an array");
    let ids: Vec<&str> = visible
        .iter()
        .map(|c| c["id"].as_str().expect("id should be a string"))
        .collect();
    assert_eq!(ids, vec!["fountain", "library"]);
}

#[test]
fn status_text_reports_pool_and_progress() {
    let tmp = TempDirGuard::new("status-text");
    let hunt = tmp.hunt_file();

    let output = run_cluehunt([
        OsStr::new("status"),
        OsStr::new("--data"),
        hunt.as_os_str(),
    ]);
    assert_success(&output);

    let text = stdout_text(&output);
    assert!(text.contains("Hints left: 2"));
    assert!(text.contains("Solved: 1/3"));
    assert!(text.contains("fountain [The Fountain] open"));
    assert!(!text.contains("clock"));
}

#[test]
fn print_json_carries_codes_and_urls() {
    let tmp = TempDirGuard::new("print-json");
    let hunt = tmp.hunt_file();

    let output = run_cluehunt([
        OsStr::new("print"),
        OsStr::new("--data"),
        hunt.as_os_str(),
        OsStr::new("--hostname"),
        OsStr::new("https://hunt.example/"),
        OsStr::new("--only"),
        OsStr::new("clock"),
        OsStr::new("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    let clues = payload["clues"].as_array().expect("clues should be an array");
    assert_eq!(clues.len(), 3);
    assert_eq!(clues[2]["id"], "clock");
    assert_eq!(clues[2]["solveCode"], "C3");
    assert_eq!(clues[2]["solveUrl"], "https://hunt.example/solve?id=C3");
    assert_eq!(clues[2]["show"], true);
    assert_eq!(clues[0]["show"], false);
}

#[test]
fn print_text_lists_every_clue_by_default() {
    let tmp = TempDirGuard::new("print-text");
    let hunt = tmp.hunt_file();

    let output = run_cluehunt([
        OsStr::new("print"),
        OsStr::new("--data"),
        hunt.as_os_str(),
        OsStr::new("--hostname"),
        OsStr::new("http://localhost:9090"),
    ]);
    assert_success(&output);

    let text = stdout_text(&output);
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("library\tThe Library\tB2\thttp://localhost:9090/solve?id=B2"));
}

#[test]
fn set_hints_persists_and_preserves_clues() {
    let tmp = TempDirGuard::new("set-hints");
    let hunt = tmp.hunt_file();

    let output = run_cluehunt([
        OsStr::new("set-hints"),
        OsStr::new("7"),
        OsStr::new("--data"),
        hunt.as_os_str(),
    ]);
    assert_success(&output);
    assert!(stdout_text(&output).contains("Hints left: 7"));

    let saved = read_hunt(&hunt);
    assert_eq!(saved["hints"], 7);
    assert_eq!(saved["start"], 1714816200000i64);
    assert_eq!(saved["clues"][1]["solved"], 1714816800000i64);
    assert_eq!(saved["clues"][0]["solveCode"], "A1");
}

#[test]
fn set_hints_rejects_negative_pool() {
    let tmp = TempDirGuard::new("set-hints-negative");
    let hunt = tmp.hunt_file();

    let output = run_cluehunt([
        OsStr::new("set-hints"),
        OsStr::new("--data"),
        hunt.as_os_str(),
        OsStr::new("--"),
        OsStr::new("-3"),
    ]);
    assert_failure(&output);
    assert_eq!(read_hunt(&hunt)["hints"], 2);
}

#[test]
fn end_stamps_once() {
    let tmp = TempDirGuard::new("end");
    let hunt = tmp.hunt_file();
    let args = [OsStr::new("end"), OsStr::new("--data"), hunt.as_os_str()];

    let first = run_cluehunt(args);
    assert_success(&first);
    assert!(stdout_text(&first).starts_with("Hunt ended at "));
    let end = read_hunt(&hunt)["end"].clone();
    assert!(end.as_i64().is_some_and(|ms| ms > 1714816200000));

    let second = run_cluehunt(args);
    assert_success(&second);
    assert!(stdout_text(&second).contains("already ended"));
    assert_eq!(read_hunt(&hunt)["end"], end);
}

#[test]
fn missing_hunt_file_is_fatal() {
    let tmp = TempDirGuard::new("missing");
    let missing = tmp.path().join("nope.json");

    let output = run_cluehunt([
        OsStr::new("status"),
        OsStr::new("--data"),
        missing.as_os_str(),
    ]);
    assert_failure(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: failed to load"));
}
