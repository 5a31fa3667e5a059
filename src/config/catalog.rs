//! Provider / Model Catalog
//!
//! Defines the schema for the provider and model tables the settings menu is
//! built from.

use crate::config::loader::CatalogLoader;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::warn;

/// Provider and model tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Verified models keyed by provider id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub verified: BTreeMap<String, Vec<String>>,

    /// Unverified models keyed by provider id. Some keys are vendor names
    /// rather than providers and are filtered against `known_providers`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unverified: BTreeMap<String, Vec<String>>,

    /// Identifiers recognised as real providers
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub known_providers: BTreeSet<String>,

    /// Models available through the ChatGPT subscription
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscription_models: Vec<String>,
}

static BUILTIN: OnceLock<Catalog> = OnceLock::new();
static GLOBAL: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// The catalog bundled with the crate, parsed once
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| {
            crate::config::loader::parse_builtin().unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to an empty catalog");
                Catalog::default()
            })
        })
    }

    /// The built-in catalog merged with the overrides found on disk, loaded once
    pub fn global() -> &'static Catalog {
        GLOBAL.get_or_init(|| match CatalogLoader::new() {
            Ok(loader) => loader.into_catalog(),
            Err(e) => {
                warn!(error = %e, "Ignoring catalog overrides");
                Catalog::builtin().clone()
            }
        })
    }

    pub fn verified_models(&self, provider: &str) -> &[String] {
        self.verified.get(provider).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unverified_models(&self, provider: &str) -> &[String] {
        self.unverified.get(provider).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_known_provider(&self, provider: &str) -> bool {
        self.known_providers.contains(provider)
    }

    /// Merge another catalog into this one (later catalogs override earlier)
    pub fn merge(&mut self, other: Catalog) {
        self.verified.extend(other.verified);
        self.unverified.extend(other.unverified);
        self.known_providers.extend(other.known_providers);

        if !other.subscription_models.is_empty() {
            self.subscription_models = other.subscription_models;
        }
    }
}
