use crate::{
    config::Settings,
    error::FetchError,
    model::RawPayload,
    source::{mock::MockFileSource, weatherapi::WeatherApiSource},
};
use async_trait::async_trait;
use std::{fmt::Debug, path::Path};

pub mod mock;
pub mod weatherapi;

/// Where a raw payload comes from for one invocation.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, location: &str) -> Result<RawPayload, FetchError>;

    /// Short human-readable origin, e.g. `mock file 'mocks/berlin.json'`.
    fn describe(&self) -> String;
}

/// A mock path wins; otherwise the live service, which needs a credential.
pub fn source_for(
    mock: Option<&Path>,
    settings: &Settings,
) -> Result<Box<dyn WeatherSource>, FetchError> {
    if let Some(path) = mock {
        return Ok(Box::new(MockFileSource::new(path)));
    }

    let live = WeatherApiSource::from_settings(settings)?;
    Ok(Box::new(live))
}
