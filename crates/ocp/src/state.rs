//! Local state file: the last synchronized snapshot of one host.
//!
//! Written atomically (tmp + rename) so an interrupted run never leaves a
//! truncated file behind.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ocp_core::HostKind;

use crate::error::CliError;

#[derive(Debug, Serialize, Deserialize)]
struct StateFile<T> {
    kind: HostKind,
    host: T,
}

/// Load the snapshot held at `path`. A missing file means nothing is held.
pub fn load<T: DeserializeOwned>(path: &Path, kind: HostKind) -> Result<Option<T>, CliError> {
    if !path.exists() {
        debug!(path = %path.display(), "no state file");
        return Ok(None);
    }

    let bytes = std::fs::read(path)?;
    let file: StateFile<serde_json::Value> = serde_json::from_slice(&bytes)?;
    if file.kind != kind {
        return Err(CliError::StateKindMismatch {
            path: path.display().to_string(),
            expected: kind.to_string(),
            found: file.kind.to_string(),
        });
    }

    let host = serde_json::from_value(file.host)?;
    debug!(path = %path.display(), %kind, "state loaded");
    Ok(Some(host))
}

/// Load a snapshot that must exist.
pub fn require<T: DeserializeOwned>(path: &Path, kind: HostKind) -> Result<T, CliError> {
    load(path, kind)?.ok_or_else(|| CliError::NoState {
        path: path.display().to_string(),
    })
}

pub fn save<T: Serialize>(path: &Path, kind: HostKind, host: &T) -> Result<(), CliError> {
    let json = serde_json::to_vec_pretty(&StateFile { kind, host })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path)?;

    debug!(path = %path.display(), "state flushed to disk");
    Ok(())
}

/// Forget the host. Removing an absent file is not an error.
pub fn remove(path: &Path) -> Result<(), CliError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "state removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        id: String,
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/web01.json");
        let snap = Snapshot { id: "vh-1".into() };

        save(&path, HostKind::Standard, &snap).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded: Option<Snapshot> = load(&path, HostKind::Standard).unwrap();
        assert_eq!(loaded, Some(snap));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        save(&path, HostKind::Shadow, &Snapshot { id: "vh-3".into() }).unwrap();

        let err = load::<Snapshot>(&path, HostKind::Standard).unwrap_err();
        assert!(matches!(err, CliError::StateKindMismatch { .. }));
    }

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(load::<Snapshot>(&path, HostKind::Standard).unwrap().is_none());
        remove(&path).unwrap();
        assert!(matches!(
            require::<Snapshot>(&path, HostKind::Standard).unwrap_err(),
            CliError::NoState { .. }
        ));
    }
}
