//! Runtime configuration of the core services.
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use crate::error::{SedaError, SedaResult};
use crate::service::CompactorConfig;
use crate::version::SedaVersion;
use crate::xml::{ManifestLayout, ReadOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_INDENT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SedaConfig {
    /// Version used when writing manifests.
    pub seda_version: SedaVersion,
    /// Spaces per nesting level, 0 for compact output.
    pub indent: usize,
    pub layout: ManifestLayout,
    pub stop_on_first_failure: bool,
    pub compactor: CompactorConfig,
}

impl Default for SedaConfig {
    fn default() -> Self {
        Self {
            seda_version: SedaVersion::default(),
            indent: 2,
            layout: ManifestLayout::default(),
            stop_on_first_failure: true,
            compactor: CompactorConfig::default(),
        }
    }
}

impl SedaConfig {
    pub fn from_json_str(raw: &str) -> SedaResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| SedaError::Configuration(format!("invalid JSON configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SedaResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            stop_on_first_failure: self.stop_on_first_failure,
        }
    }

    fn validate(&self) -> SedaResult<()> {
        if self.indent > MAX_INDENT {
            return Err(SedaError::Configuration(format!(
                "indent must be at most {MAX_INDENT}, got {}",
                self.indent
            )));
        }
        for filter in [&self.compactor.document, &self.compactor.sub_document] {
            if filter.object_versions.iter().any(|usage| usage.trim().is_empty()) {
                return Err(SedaError::Configuration(
                    "compactor object versions cannot be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}
