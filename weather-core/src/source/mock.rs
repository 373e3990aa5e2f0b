use async_trait::async_trait;
use std::{fs, io, path::PathBuf};

use crate::{error::FetchError, model::RawPayload};

use super::WeatherSource;

/// Reads a saved response instead of calling the service.
#[derive(Debug, Clone)]
pub struct MockFileSource {
    path: PathBuf,
}

impl MockFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<RawPayload, FetchError> {
        let text = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FetchError::MockFileNotFound { path: self.path.clone() }
            } else {
                FetchError::MockFileRead { path: self.path.clone(), source }
            }
        })?;

        RawPayload::from_json_str(&text)
            .map_err(|source| FetchError::MockFileParse { path: self.path.clone(), source })
    }
}

#[async_trait]
impl WeatherSource for MockFileSource {
    async fn fetch(&self, location: &str) -> Result<RawPayload, FetchError> {
        tracing::debug!(path = %self.path.display(), location, "loading mock payload");
        self.load()
    }

    fn describe(&self) -> String {
        format!("mock file '{}'", self.path.display())
    }
}
