use std::{fs, path::Path};

use crate::{error::FetchError, model::RawPayload};

/// Snapshot destination used when no other path is given.
pub const DEFAULT_CACHE_FILE: &str = "cache.json";

/// Overwrites `path` with the pretty-printed payload. The file holds only the
/// last snapshot and doubles as a mock input for later runs.
pub fn save_snapshot(payload: &RawPayload, path: &Path) -> Result<(), FetchError> {
    let write_error = |source: std::io::Error| FetchError::CacheWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut json = serde_json::to_string_pretty(payload).map_err(|e| write_error(e.into()))?;
    json.push('\n');

    fs::write(path, json).map_err(write_error)?;
    tracing::debug!(path = %path.display(), "cache snapshot written");

    Ok(())
}
