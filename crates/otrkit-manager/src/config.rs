//! Manager configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default name of the loader thread.
pub const DEFAULT_WORKER_NAME: &str = "otrkit-loader";

/// Settings supplied when the manager is constructed.
///
/// ```json
/// {
///     "archives": ["oot.o2r", "mods"],
///     "valid_versions": [3968373711],
///     "alt_assets": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Archives to mount: the main archive first, then patches. Directories
    /// are searched for containers.
    pub archives: Vec<PathBuf>,
    /// Accepted game versions. Empty accepts every archive.
    pub valid_versions: Vec<u32>,
    /// Prefer `alt/<path>` replacements when they exist.
    pub alt_assets: bool,
    /// Name of the loader thread.
    pub worker_name: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            archives: Vec::new(),
            valid_versions: Vec::new(),
            alt_assets: false,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

impl ManagerConfig {
    /// Configuration mounting `archives` with everything else defaulted.
    pub fn with_archives<P: Into<PathBuf>>(archives: impl IntoIterator<Item = P>) -> Self {
        Self {
            archives: archives.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
