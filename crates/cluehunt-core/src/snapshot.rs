//! Hunt file storage: one pretty-printed JSON document for the whole state.
//!
//! The file is hand-editable, so it is always re-read in full and always
//! written in full. Writes go to a temporary sibling and are renamed into
//! place.

use crate::state::{HuntState, StateError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Errors from reading or writing the hunt file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted hunt file: {0}")]
    Corrupt(String),

    #[error("invalid hunt file: {0}")]
    Invalid(#[from] StateError),
}

/// Parse and validate a hunt document.
pub fn parse_state(bytes: &[u8]) -> Result<HuntState, SnapshotError> {
    let state: HuntState =
        serde_json::from_slice(bytes).map_err(|e| SnapshotError::Parse(e.to_string()))?;
    state.validate()?;
    Ok(state)
}

/// Render a hunt document: 4-space indented JSON with a trailing newline.
pub fn render_state(state: &HuntState) -> Result<Vec<u8>, SnapshotError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    state
        .serialize(&mut serializer)
        .map_err(|e| SnapshotError::Serialize(e.to_string()))?;
    out.push(b'\n');
    Ok(out)
}

/// Read the hunt file at `path`.
pub fn read_state_from_path(path: impl AsRef<Path>) -> Result<HuntState, SnapshotError> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).map_err(|e| SnapshotError::Io(format!("{}: {e}", path.display())))?;
    validate_substrate_bytes(path, &bytes)?;
    parse_state(&bytes).map_err(|err| match err {
        SnapshotError::Parse(message) => {
            SnapshotError::Parse(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Write the hunt file at `path`, replacing it atomically.
pub fn write_state_to_path(path: impl AsRef<Path>, state: &HuntState) -> Result<(), SnapshotError> {
    write_rendered_to_path(path.as_ref(), &render_state(state)?)
}

/// Atomically replace the file at `path` with already rendered bytes.
pub(crate) fn write_rendered_to_path(path: &Path, rendered: &[u8]) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| SnapshotError::Io(format!("{}: {e}", parent.display())))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), SnapshotError> {
        let io_err = |e: std::io::Error| SnapshotError::Io(format!("{}: {e}", tmp_path.display()));
        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(rendered).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        let file = writer
            .into_inner()
            .map_err(|e| SnapshotError::Io(format!("{}: {e}", tmp_path.display())))?;
        file.sync_all().map_err(io_err)?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SnapshotError::Io(format!(
            "{} -> {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent)
            .map_err(|e| SnapshotError::Io(format!("{}: {e}", parent.display())))?;
        dir.sync_all()
            .map_err(|e| SnapshotError::Io(format!("{}: {e}", parent.display())))?;
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

fn validate_substrate_bytes(path: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
    if bytes.contains(&0) {
        return Err(SnapshotError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(SnapshotError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}
