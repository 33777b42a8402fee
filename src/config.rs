//! Configuration management using the prefer crate for discovery.
//!
//! Files are parsed with serde by extension; environment variables override
//! file values and command-line flags override both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::grid::GridParams;
use crate::ocr::OcrConfig;
use crate::pdf::{StreamParams, TableFlavor};
use crate::text::DEFAULT_DPI;

/// Environment variable overriding the OCR language.
pub const LANG_ENV: &str = "DOCEXTRACT_LANG";
/// Environment variable overriding the tesseract executable.
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,
    /// Tesseract executable name or path. `~` is expanded.
    pub tesseract_cmd: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        let defaults = OcrConfig::default();
        Self {
            language: defaults.language,
            tesseract_cmd: defaults.command,
        }
    }
}

/// PDF settings shared by both tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Rasterization resolution.
    pub dpi: u32,
    /// Default table flavor.
    pub flavor: TableFlavor,
    pub stream: StreamParams,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            flavor: TableFlavor::default(),
            stream: StreamParams::default(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrSettings,
    pub grid: GridParams,
    pub pdf: PdfSettings,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, discovering a `docextract` config file in the
    /// standard locations. Falls back to defaults when none is found or the
    /// file cannot be parsed.
    pub async fn load() -> Self {
        let config = match prefer::load("docextract").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load an explicit config file, or discover one when `path` is `None`.
    pub async fn load_or_discover(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(path) => Ok(Self::load_from_path(path).await?.with_env_overrides()),
            None => Ok(Self::load().await),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports TOML, YAML and JSON based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply `DOCEXTRACT_LANG` and `TESSERACT_CMD` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(lang) = lookup(LANG_ENV).filter(|s| !s.is_empty()) {
            self.ocr.language = lang;
        }
        if let Some(cmd) = lookup(TESSERACT_CMD_ENV).filter(|s| !s.is_empty()) {
            self.ocr.tesseract_cmd = cmd;
        }
        self
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Tesseract invocation settings. A command containing a path separator
    /// is resolved like any other configured path; a bare name is left for
    /// `PATH` lookup.
    pub fn ocr_config(&self) -> OcrConfig {
        let cmd = &self.ocr.tesseract_cmd;
        let command = if cmd.contains('/') || cmd.starts_with('~') {
            let base = self.base_dir().unwrap_or_else(|| PathBuf::from("."));
            self.resolve_path(cmd, &base).to_string_lossy().into_owned()
        } else {
            cmd.clone()
        };
        OcrConfig {
            language: self.ocr.language.clone(),
            command,
        }
    }
}
