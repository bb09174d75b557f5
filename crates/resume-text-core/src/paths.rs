use std::path::{Path, PathBuf};

use crate::config_file::ConfigFile;

/// Directory whose presence marks the project root.
pub const ASSETS_DIR: &str = "assets";
/// Source PDF, relative to the project root.
pub const DEFAULT_SOURCE: &str = "assets/SHOEB-Python.pdf";
/// Output text file, relative to the project root.
pub const DEFAULT_DESTINATION: &str = "assets/resume_text.txt";

/// One layer of path settings (CLI flags, environment, or config file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    pub root: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
}

impl PathOverrides {
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            root: config.root().map(PathBuf::from),
            source: config.source().map(PathBuf::from),
            destination: config.destination().map(PathBuf::from),
        }
    }
}

/// Fully resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Walk up from `start` (inclusive) to the first directory containing an
/// `assets/` directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(ASSETS_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Resolve root, source and destination.
///
/// `layers` is ordered by precedence, highest first; for each field the
/// first layer that sets it wins. Without an explicit root the nearest
/// ancestor of `cwd` holding `assets/` is used, then `cwd` itself.
/// Relative source/destination paths are joined onto the root.
pub fn resolve(layers: &[PathOverrides], cwd: &Path) -> ResolvedPaths {
    let root = layers
        .iter()
        .find_map(|l| l.root.clone())
        .map(|r| absolutize(&r, cwd))
        .or_else(|| find_project_root(cwd))
        .unwrap_or_else(|| cwd.to_path_buf());

    let source = layers
        .iter()
        .find_map(|l| l.source.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE));
    let destination = layers
        .iter()
        .find_map(|l| l.destination.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATION));

    let resolved = ResolvedPaths {
        source: absolutize(&source, &root),
        destination: absolutize(&destination, &root),
        root,
    };
    tracing::debug!(
        root = %resolved.root.display(),
        source = %resolved.source.display(),
        destination = %resolved.destination.display(),
        "resolved paths"
    );
    resolved
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
