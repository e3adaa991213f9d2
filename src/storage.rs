use crate::errors::StoreError;
use crate::models::Topic;
use crate::validation::import_payload;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

/// Reads the persisted topic array. A missing file is an empty store.
///
/// The file goes through the same checks as an import, so a hand-edited file
/// with blank names, negative values or duplicate ids is refused.
pub async fn load_topics(path: &Path) -> Result<Vec<Topic>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => {
            let payload: Value = serde_json::from_slice(&bytes).map_err(|err| {
                error!("failed to parse data file {}: {err}", path.display());
                StoreError::persistence(format!("malformed data file {}: {err}", path.display()))
            })?;
            import_payload(&payload).map_err(|err| {
                error!("rejected data file {}: {err}", path.display());
                StoreError::persistence(format!("invalid data file {}: {err}", path.display()))
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no data file at {}, starting empty", path.display());
            Ok(Vec::new())
        }
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            Err(StoreError::persistence(err))
        }
    }
}

/// Writes the topic array next to `path` and renames it into place.
pub async fn persist_topics(path: &Path, topics: &[Topic]) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(topics).map_err(StoreError::persistence)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    if let Err(err) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
