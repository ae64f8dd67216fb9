//! Page store configuration.

use std::path::PathBuf;

/// Configuration for a [`PageStore`](super::PageStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Optional directory prefix joined onto every page file name.
    pub dir: Option<PathBuf>,

    /// Whether to fsync after every mutation.
    ///
    /// Disabling this gives up the durability contract; it exists for
    /// tests only.
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            sync_writes: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory prefix.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Sets whether to fsync after every mutation.
    #[must_use]
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(dir) = &self.dir {
            if dir.as_os_str().is_empty() {
                return Err("directory prefix must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Resolves a page file name against the directory prefix.
    ///
    /// The prefix and name are joined with a single `/`, nothing more: no
    /// separator collapsing, no trailing-slash normalisation.
    pub fn resolve(&self, name: &str) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(format!("{}/{}", dir.display(), name)),
            None => PathBuf::from(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.dir.is_none());
        assert!(config.sync_writes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new()
            .with_dir("/data/pages")
            .with_sync_writes(false);
        assert_eq!(config.dir, Some(PathBuf::from("/data/pages")));
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_validate_rejects_empty_dir() {
        let config = StoreConfig::new().with_dir("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve() {
        let config = StoreConfig::new();
        assert_eq!(config.resolve("users.page"), PathBuf::from("users.page"));

        let config = StoreConfig::new().with_dir("/data/pages");
        assert_eq!(
            config.resolve("users.page"),
            PathBuf::from("/data/pages/users.page")
        );
    }

    #[test]
    fn test_resolve_is_literal() {
        // Joining is plain concatenation; separators are not collapsed
        let config = StoreConfig::new().with_dir("/data/pages/");
        assert_eq!(
            config.resolve("users.page"),
            PathBuf::from("/data/pages//users.page")
        );
    }
}
