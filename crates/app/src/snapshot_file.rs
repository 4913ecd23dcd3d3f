//! Persistence of the session store between restarts.

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use engine::{Ledger, SessionStore};

type BoxError = Box<dyn Error + Send + Sync>;

/// Imports the snapshot at `path` into `store`. A missing file is an empty
/// store, a malformed one is an error.
pub async fn load(path: &Path, store: &SessionStore<Ledger>) -> Result<usize, BoxError> {
    let blob = match tokio::fs::read(path).await {
        Ok(blob) => blob,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(format!("failed to read {}: {err}", path.display()).into()),
    };

    store
        .import_snapshot(&blob)
        .map_err(|err| format!("invalid snapshot {}: {err}", path.display()).into())
}

/// Writes the snapshot of `store` next to `path` and renames it in place, so
/// a crash never leaves a truncated file behind.
pub async fn save(path: &Path, store: &SessionStore<Ledger>) -> Result<(), BoxError> {
    let blob = store.export_snapshot()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, &blob).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
