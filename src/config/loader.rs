//! Catalog Loader
//!
//! Loads the bundled catalog and merges user overrides from disk.

use crate::config::catalog::Catalog;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an extra catalog file
pub const CATALOG_PATH_ENV: &str = "LLM_STREAM_UI_CATALOG";

const BUILTIN_CATALOG: &str = include_str!("../../catalog.json");

pub(crate) fn parse_builtin() -> Result<Catalog> {
    serde_json::from_str(BUILTIN_CATALOG)
        .map_err(|e| Error::Config(format!("Failed to parse built-in catalog.json: {}", e)))
}

/// Catalog loader with support for multiple sources
pub struct CatalogLoader {
    catalog: Catalog,
}

impl CatalogLoader {
    /// Load the built-in catalog, then every override found in the default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self::builtin()?;

        for path in Self::get_catalog_paths() {
            if path.exists() {
                loader.load_from_file(&path)?;
            }
        }

        Ok(loader)
    }

    /// Load the built-in catalog, then one specific override file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_file(path)?;
        Ok(loader)
    }

    /// Only the built-in catalog
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            catalog: parse_builtin()?,
        })
    }

    /// Get list of catalog paths to check, lowest precedence first
    fn get_catalog_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".llm-stream-ui").join("catalog.json"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("llm-stream-ui").join("catalog.json"));
        }

        paths.push(PathBuf::from("catalog.json"));

        if let Ok(custom_path) = std::env::var(CATALOG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load a catalog file and merge it over the current one
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let catalog: Catalog = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            verified = catalog.verified.len(),
            unverified = catalog.unverified.len(),
            "Merging catalog override"
        );
        self.catalog.merge(catalog);
        Ok(())
    }

    /// Get the loaded catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Take ownership of the catalog
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}
