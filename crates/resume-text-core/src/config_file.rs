use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_NAME: &str = ".resume-text.toml";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub root: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub expand_ligatures: Option<bool>,
    pub header_exclusion_ratio: Option<f32>,
    pub footer_exclusion_ratio: Option<f32>,
}

impl ConfigFile {
    pub fn root(&self) -> Option<&str> {
        self.paths.as_ref().and_then(|p| p.root.as_deref())
    }

    pub fn source(&self) -> Option<&str> {
        self.paths.as_ref().and_then(|p| p.source.as_deref())
    }

    pub fn destination(&self) -> Option<&str> {
        self.paths.as_ref().and_then(|p| p.destination.as_deref())
    }

    pub fn expand_ligatures(&self) -> bool {
        self.extraction
            .as_ref()
            .and_then(|e| e.expand_ligatures)
            .unwrap_or(false)
    }

    pub fn header_exclusion_ratio(&self) -> f32 {
        self.extraction
            .as_ref()
            .and_then(|e| e.header_exclusion_ratio)
            .unwrap_or(0.0)
    }

    pub fn footer_exclusion_ratio(&self) -> f32 {
        self.extraction
            .as_ref()
            .and_then(|e| e.footer_exclusion_ratio)
            .unwrap_or(0.0)
    }
}

/// Platform config directory path: `<config_dir>/resume-text/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("resume-text").join("config.toml"))
}

/// Load config by cascading CWD `.resume-text.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(LOCAL_CONFIG_NAME));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %describe_toml_error(&content, &e),
                "ignoring unparseable config file"
            );
            None
        }
    }
}

/// Load a config the user named explicitly. Unlike the cascade, a missing
/// or invalid file is an error.
pub fn load_explicit(path: &Path) -> Result<ConfigFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| {
        format!(
            "failed to parse config {}: {}",
            path.display(),
            describe_toml_error(&content, &e)
        )
    })
}

/// Single-line rendering of a TOML error: the message plus the 1-based
/// line and column of its span. `toml`'s own `Display` adds a source
/// snippet spread over several lines.
fn describe_toml_error(content: &str, err: &toml::de::Error) -> String {
    let message = err.message().split_whitespace().collect::<Vec<_>>().join(" ");
    match err.span() {
        Some(span) => {
            let before = &content[..span.start.min(content.len())];
            let line = before.matches('\n').count() + 1;
            let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
            format!("{} at line {}, column {}", message, line, column)
        }
        None => message,
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        paths: Some(PathsConfig {
            root: overlay
                .paths
                .as_ref()
                .and_then(|p| p.root.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.root.clone())),
            source: overlay
                .paths
                .as_ref()
                .and_then(|p| p.source.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.source.clone())),
            destination: overlay
                .paths
                .as_ref()
                .and_then(|p| p.destination.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.destination.clone())),
        }),
        extraction: Some(ExtractionConfig {
            expand_ligatures: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.expand_ligatures)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.expand_ligatures)),
            header_exclusion_ratio: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.header_exclusion_ratio)
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.header_exclusion_ratio)
                }),
            footer_exclusion_ratio: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.footer_exclusion_ratio)
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.footer_exclusion_ratio)
                }),
        }),
    }
}
