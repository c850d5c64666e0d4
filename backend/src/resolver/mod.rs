//! Target name resolution.
//!
//! The planner only needs two questions answered about a target name: where is
//! it on the sky, and what kind of object is it. [`TargetResolver`] is the seam
//! for that; [`CatalogResolver`] answers from an in-memory catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{CatalogMetadata, EquatorialCoord, Target};

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Errors raised by a resolver backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolverError {
    /// The name is not known to the resolver.
    #[error("target '{name}' not found")]
    NotFound { name: String },

    /// The backend failed for another reason.
    #[error("resolver backend failure: {message}")]
    Backend { message: String },
}

/// Name to coordinates/metadata lookup.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Resolve a name to J2000 sky coordinates.
    async fn resolve(&self, name: &str) -> ResolverResult<EquatorialCoord>;

    /// Fetch descriptive metadata. Fields are independently nullable.
    async fn lookup(&self, name: &str) -> ResolverResult<CatalogMetadata>;

    /// Resolve a full [`Target`]; metadata lookup failures are non-fatal.
    async fn target(&self, name: &str) -> ResolverResult<Target> {
        let coordinates = self.resolve(name).await?;
        let metadata = match self.lookup(name).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Catalog lookup failed for {}: {}", name, e);
                CatalogMetadata::default()
            }
        };
        Ok(Target::new(name, coordinates).with_metadata(metadata))
    }
}

/// One catalog row as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    pub ra_deg: f64,
    pub dec_deg: f64,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub major_axis_arcmin: Option<f64>,
    #[serde(default)]
    pub minor_axis_arcmin: Option<f64>,
}

impl CatalogEntry {
    fn metadata(&self) -> CatalogMetadata {
        CatalogMetadata {
            object_type: self.object_type.clone(),
            magnitude: self.magnitude,
            major_axis_arcmin: self.major_axis_arcmin,
            minor_axis_arcmin: self.minor_axis_arcmin,
        }
    }
}

/// Catalog key: upper-case with whitespace removed, so "m 31" finds "M31".
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// In-memory resolver over configured catalog entries.
///
/// Entries are reachable by name and, when present, by identifier.
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    entries: HashMap<String, CatalogEntry>,
}

impl CatalogResolver {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            if let Some(identifier) = &entry.identifier {
                map.insert(normalize_name(identifier), entry.clone());
            }
            map.insert(normalize_name(&entry.name), entry);
        }
        Self { entries: map }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, name: &str) -> ResolverResult<&CatalogEntry> {
        self.entries
            .get(&normalize_name(name))
            .ok_or_else(|| ResolverError::NotFound {
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl TargetResolver for CatalogResolver {
    async fn resolve(&self, name: &str) -> ResolverResult<EquatorialCoord> {
        let entry = self.get(name)?;
        Ok(EquatorialCoord::new(entry.ra_deg, entry.dec_deg))
    }

    async fn lookup(&self, name: &str) -> ResolverResult<CatalogMetadata> {
        Ok(self.get(name)?.metadata())
    }

    async fn target(&self, name: &str) -> ResolverResult<Target> {
        let entry = self.get(name)?;
        let target = Target::new(name, EquatorialCoord::new(entry.ra_deg, entry.dec_deg))
            .with_metadata(entry.metadata());
        Ok(match &entry.identifier {
            Some(identifier) => target.with_identifier(identifier.clone()),
            None => target,
        })
    }
}
