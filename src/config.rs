//! Process configuration.
//!
//! The only option is `BBOXES`, a list of `[lat_min, long_min, lat_max,
//! long_max]` quadruples read from an optional config file and the process
//! environment. A missing or malformed value disables geographic filtering.

use crate::error::Result;
use crate::processors::GeoFilter;
use crate::utils::constants::BBOXES_KEY;
use config::{Config, Environment, File};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    geo_filter: GeoFilter,
}

impl ImportConfig {
    /// Load from `path` (any format the `config` crate knows) overlaid by
    /// environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder.add_source(Environment::default()).build()?;

        Ok(Self::from_settings(&settings))
    }

    pub fn from_settings(settings: &Config) -> Self {
        let raw = settings
            .get::<serde_json::Value>(BBOXES_KEY)
            .or_else(|_| settings.get::<serde_json::Value>(&BBOXES_KEY.to_uppercase()))
            .ok();
        debug!("Raw BBOXES configuration: {:?}", raw);

        Self {
            geo_filter: GeoFilter::from_value(raw.as_ref()),
        }
    }

    pub fn geo_filter(&self) -> &GeoFilter {
        &self.geo_filter
    }
}
