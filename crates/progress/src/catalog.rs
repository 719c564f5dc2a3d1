//! Curriculum catalog access.

use std::collections::HashSet;
use std::path::Path;
use serde::Deserialize;
use tracing::debug;
use codex_core::{CompletionKey, Domain, DomainId};
use crate::{ProgressError, Result};

/// Read-only view over the curriculum hierarchy.
///
/// The catalog is the source of truth for point totals. It is owned by the
/// content layer; the engine only reads it.
pub trait DomainCatalog: Send + Sync {
    /// Every domain, in catalog order.
    fn domains(&self) -> &[Domain];

    /// Look up a domain by id.
    fn domain(&self, id: DomainId) -> Option<&Domain> {
        self.domains().iter().find(|d| d.id == id)
    }

    /// Domains shown in aggregate views, in catalog order.
    fn active_domains(&self) -> Vec<&Domain> {
        self.domains().iter().filter(|d| d.active).collect()
    }

    /// Whether `key` addresses a point of some domain.
    fn contains(&self, key: &CompletionKey) -> bool {
        self.domain(key.domain_id).is_some_and(|d| d.contains(key))
    }
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    domains: Vec<Domain>,
}

// Catalog files are either a bare list or `{ "domains": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Domain>),
    Wrapped { domains: Vec<Domain> },
}

impl StaticCatalog {
    /// Build a catalog, rejecting duplicate domain ids.
    pub fn new(domains: Vec<Domain>) -> Result<Self> {
        let mut seen = HashSet::new();
        for domain in &domains {
            if !seen.insert(domain.id) {
                return Err(ProgressError::Catalog(format!(
                    "duplicate domain id {}",
                    domain.id
                )));
            }
        }
        Ok(Self { domains })
    }

    /// Parse a catalog from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let domains = match serde_json::from_str(json)? {
            CatalogFile::List(domains) | CatalogFile::Wrapped { domains } => domains,
        };
        Self::new(domains)
    }

    /// Load a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        debug!(path = %path.display(), domains = catalog.domains.len(), "loaded catalog");
        Ok(catalog)
    }
}

impl DomainCatalog for StaticCatalog {
    fn domains(&self) -> &[Domain] {
        &self.domains
    }
}
