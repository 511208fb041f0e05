//! Tracker configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document (or no
//! file at all) yields the Project Axis page as shipped.
//!
//! ```toml
//! log_level = "debug"
//! fallback_section = "about"
//! viewport_height = 900
//!
//! [visibility]
//! threshold = 0.2
//! root_margin = "0px 0px -10% 0px"
//!
//! [[sections]]
//! id = "hero"
//! name = "Hero"
//! height = 800
//! anchored = false
//! ```

use std::fmt;
use std::path::Path;

use axis_protocol::Section;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::layout::{LayoutBlock, PageLayout};
use crate::registry::{RegistryError, SectionRegistry};
use crate::tracker::ViewportObserver;
use crate::visibility::{InViewOptions, RootMargin, VisibilityError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("sections: {0}")]
    Registry(#[from] RegistryError),
    #[error("visibility: {0}")]
    Visibility(#[from] VisibilityError),
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_section_height() -> f64 {
    900.0
}

fn default_threshold() -> f64 {
    crate::visibility::DEFAULT_THRESHOLD
}

fn default_root_margin() -> String {
    "0px".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: String,
    pub name: String,
    /// Block height used by the simulated page.
    #[serde(default = "default_section_height")]
    pub height: f64,
    /// Whether the section's anchor element is present in the page.
    #[serde(default = "default_true")]
    pub anchored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin: default_root_margin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub log_level: LogLevel,
    /// Section reported before any anchor reaches the activation line.
    /// Defaults to the first section.
    #[serde(default)]
    pub fallback_section: Option<String>,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub visibility: VisibilityConfig,
    /// Empty means the built-in Project Axis sections.
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            fallback_section: None,
            viewport_height: default_viewport_height(),
            visibility: VisibilityConfig::default(),
            sections: Vec::new(),
        }
    }
}

impl AxisConfig {
    pub fn registry(&self) -> Result<SectionRegistry, ConfigError> {
        if self.sections.is_empty() {
            return Ok(SectionRegistry::project_axis());
        }
        let sections = self
            .sections
            .iter()
            .map(|s| Section::new(s.id.as_str(), s.name.as_str()))
            .collect();
        Ok(SectionRegistry::new(sections)?)
    }

    pub fn observer(&self) -> Result<ViewportObserver, ConfigError> {
        let registry = self.registry()?;
        Ok(match &self.fallback_section {
            Some(id) => ViewportObserver::with_fallback(registry, id)?,
            None => ViewportObserver::new(registry),
        })
    }

    pub fn in_view_options(&self) -> Result<InViewOptions, ConfigError> {
        let margin: RootMargin = self.visibility.root_margin.parse()?;
        Ok(InViewOptions::new(self.visibility.threshold, margin)?)
    }

    /// Simulated page with one block per configured section.
    pub fn layout(&self) -> PageLayout {
        let blocks: Vec<LayoutBlock> = if self.sections.is_empty() {
            SectionRegistry::project_axis()
                .ids()
                .map(|id| LayoutBlock::new(id.clone(), default_section_height()))
                .collect()
        } else {
            self.sections
                .iter()
                .map(|s| LayoutBlock {
                    anchored: s.anchored,
                    ..LayoutBlock::new(s.id.as_str(), s.height)
                })
                .collect()
        };
        PageLayout::stacked(self.viewport_height, blocks)
    }
}

pub fn parse_config(contents: &str) -> Result<AxisConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

pub fn serialize_config(config: &AxisConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

/// Read and parse the configuration at `path`. Missing files are an error.
pub fn read_config(path: &Path) -> Result<AxisConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Load configuration from `path`, falling back to defaults when the file is
/// missing or invalid.
pub fn load_config(path: &Path) -> AxisConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), "invalid config, using defaults: {err}");
                AxisConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AxisConfig::default(),
        Err(err) => {
            warn!(path = %path.display(), "unreadable config, using defaults: {err}");
            AxisConfig::default()
        }
    }
}
