use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, SiteError};

pub const DEFAULT_CONFIG_FILE: &str = "site.toml";
const DEFAULT_PORT: u16 = 8080;

/// Site settings from `site.toml`, every field optional.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub project_name: String,
    pub content_dir: PathBuf,
    pub out_dir: PathBuf,
    pub page_size: usize,
    /// Absolute href written into `<base href>` of every rendered page.
    pub base_href: Option<String>,
    pub analytics_id: Option<String>,
    pub toc: TocConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            project_name: "cs-blog".to_string(),
            content_dir: PathBuf::from("content"),
            out_dir: PathBuf::from("docs"),
            page_size: 6,
            base_href: None,
            analytics_id: None,
            toc: TocConfig::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TocConfig {
    /// Where headings are collected from.
    pub blog_area_selector: String,
    /// Where the generated list is inserted. Only `#id` selectors are supported.
    pub insert_selector: String,
    pub levels: Vec<String>,
    pub trailing_slash: bool,
    pub scroll_into_view_on_click: bool,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            blog_area_selector: ".blog-content".to_string(),
            insert_selector: "#toc".to_string(),
            levels: vec!["h2".to_string(), "h3".to_string()],
            trailing_slash: true,
            scroll_into_view_on_click: true,
        }
    }
}

impl SiteConfig {
    /// Loads the config file if it exists. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        let config = Self::from_toml(&raw)?;
        info!(path = %path.display(), "loaded site config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: SiteConfig =
            toml::from_str(raw).map_err(|e| SiteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(SiteError::Config("page_size must be at least 1".into()));
        }
        for level in &self.toc.levels {
            if heading_rank(level).is_none() {
                return Err(SiteError::Config(format!(
                    "toc level `{level}` is not a heading tag"
                )));
            }
        }
        if !self.toc.insert_selector.starts_with('#') {
            return Err(SiteError::Config(format!(
                "toc insert_selector `{}` must be an id selector",
                self.toc.insert_selector
            )));
        }
        Ok(())
    }
}

/// Rank of an `h1`..`h6` tag name.
pub fn heading_rank(tag: &str) -> Option<u8> {
    match tag.to_ascii_lowercase().as_str() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Settings that come from the process environment rather than the file.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeEnv {
    pub is_development: bool,
    pub port: u16,
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        let is_development = std::env::var("RUST_ENV")
            .map(|v| v == "development")
            .unwrap_or(false);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self {
            is_development,
            port,
        }
    }
}
