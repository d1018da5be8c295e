//! Bundled banner presets.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::banner::BannerConfig;
use crate::error::ConfigError;

const DEFAULT_PRESET_DATA: &str = include_str!("../assets/banners.json");

#[derive(Debug, Clone, Deserialize)]
struct PresetEntry {
    key: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    banner: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PresetFile {
    presets: Vec<PresetEntry>,
}

/// A named banner shipped with the estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerPreset {
    pub key: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub banner: BannerConfig,
}

impl BannerPreset {
    fn answers_to(&self, query: &str) -> bool {
        self.key.eq_ignore_ascii_case(query)
            || self.name.eq_ignore_ascii_case(query)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(query))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetCatalog {
    presets: Vec<BannerPreset>,
}

impl PresetCatalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a banner string fails
    /// to parse.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let file: PresetFile = serde_json::from_str(data)
            .map_err(|err| ConfigError::InvalidPresetCatalog(err.to_string()))?;
        let presets = file
            .presets
            .into_iter()
            .map(|entry| {
                Ok(BannerPreset {
                    banner: entry.banner.parse()?,
                    key: entry.key,
                    name: entry.name,
                    aliases: entry.aliases,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { presets })
    }

    /// Catalog compiled into the crate; falls back to the regular banner alone.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_PRESET_DATA).unwrap_or_else(|err| {
            log::warn!("bundled preset catalog rejected: {err}");
            Self {
                presets: vec![BannerPreset {
                    key: "normal".to_string(),
                    name: "Normal".to_string(),
                    aliases: Vec::new(),
                    banner: BannerConfig::default(),
                }],
            }
        })
    }

    #[must_use]
    pub fn presets(&self) -> &[BannerPreset] {
        &self.presets
    }

    #[must_use]
    pub fn get(&self, query: &str) -> Option<&BannerPreset> {
        let query = query.trim();
        self.presets.iter().find(|preset| preset.answers_to(query))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPreset`] if nothing matches `query`.
    pub fn resolve(&self, query: &str) -> Result<BannerConfig, ConfigError> {
        self.get(query)
            .map(|preset| preset.banner)
            .ok_or_else(|| ConfigError::UnknownPreset(query.to_string()))
    }
}

/// Shared catalog loaded on first use.
pub fn preset_catalog() -> &'static PresetCatalog {
    static CATALOG: OnceLock<PresetCatalog> = OnceLock::new();
    CATALOG.get_or_init(PresetCatalog::load_from_static)
}
