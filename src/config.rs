//! Export configuration.

use std::path::{Path, PathBuf};

/// Directory under the user data directory that holds the cache file.
pub const APP_DIR_NAME: &str = "FolderIconChanger";

/// Configuration for exporting and applying icons.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Directory the cached PNG is written to (default: `<data dir>/FolderIconChanger`).
    pub cache_dir: PathBuf,
    /// Name of the cached PNG (default: `currentIcon.png`).
    pub cache_file_name: String,
    /// Side of the square image handed to the OS (default: 512).
    pub icon_size: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            cache_dir: base.join(APP_DIR_NAME),
            cache_file_name: "currentIcon.png".to_string(),
            icon_size: 512,
        }
    }
}

impl ExportConfig {
    /// The default configuration with the cache moved to `dir`.
    pub fn with_cache_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Full path of the cached PNG.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(&self.cache_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_lives_under_app_dir() {
        let config = ExportConfig::default();
        assert!(config.cache_path().ends_with("FolderIconChanger/currentIcon.png"));
        assert_eq!(config.icon_size, 512);
    }

    #[test]
    fn cache_dir_override_keeps_file_name() {
        let config = ExportConfig::with_cache_dir("/tmp/folco");
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/folco/currentIcon.png"));
    }
}
