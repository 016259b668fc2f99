//! Versions and the version registry.
//!
//! The registry is built once per compilation. [`VersionRegistryBuilder`]
//! accepts versions while the corpus is being resolved; [`seal`] checks the
//! cross-version invariants and turns it into an immutable
//! [`VersionRegistry`] that the route assembler and artifact writer read.
//!
//! [`seal`]: VersionRegistryBuilder::seal

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use quire_config::BannerConfig;

use crate::document::Document;
use crate::error::{SiteError, VersionRegistryError};
use crate::sidebar::SidebarNode;

/// Banner shown above a version's documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Banner {
    Unreleased,
    Unmaintained,
}

impl Banner {
    /// `None` for versions without a banner.
    #[must_use]
    pub fn from_config(config: BannerConfig) -> Option<Self> {
        match config {
            BannerConfig::None => None,
            BannerConfig::Unreleased => Some(Self::Unreleased),
            BannerConfig::Unmaintained => Some(Self::Unmaintained),
        }
    }
}

/// One versioned snapshot of the document set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub name: String,
    pub label: String,
    /// Absolute route prefix of this version's documents.
    pub path: String,
    pub banner: Option<Banner>,
    pub badge: bool,
    pub is_last: bool,
    pub docs_sidebars: BTreeMap<String, Vec<SidebarNode>>,
    /// Documents by id.
    #[serde(skip)]
    pub docs: BTreeMap<String, Document>,
}

impl Version {
    /// Look up a document by id.
    #[must_use]
    pub fn doc(&self, id: &str) -> Option<&Document> {
        self.docs.get(id)
    }

    /// Documents in id order.
    pub fn docs(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }
}

/// Registry in the building state.
#[derive(Debug, Default)]
pub struct VersionRegistryBuilder {
    versions: Vec<Version>,
    names: HashSet<String>,
    last: Option<String>,
}

impl VersionRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version.
    ///
    /// Fails on a repeated name or a second version marked `is_last`.
    pub fn register(&mut self, version: Version) -> Result<(), VersionRegistryError> {
        if !self.names.insert(version.name.clone()) {
            return Err(VersionRegistryError::DuplicateVersion(version.name));
        }
        if version.is_last {
            if let Some(first) = &self.last {
                return Err(VersionRegistryError::MultipleLast {
                    first: first.clone(),
                    second: version.name,
                });
            }
            self.last = Some(version.name.clone());
        }
        tracing::debug!(
            version = %version.name,
            document_count = version.docs.len(),
            "Registered version"
        );
        self.versions.push(version);
        Ok(())
    }

    /// Check every document's sidebar reference and freeze the registry.
    pub fn seal(self) -> Result<VersionRegistry, Vec<SiteError>> {
        let errors: Vec<SiteError> = self
            .versions
            .iter()
            .flat_map(|version| {
                version.docs().filter_map(move |doc| {
                    let sidebar = doc.sidebar.as_ref()?;
                    (!version.docs_sidebars.contains_key(sidebar)).then(|| {
                        VersionRegistryError::UnknownSidebar {
                            version: version.name.clone(),
                            sidebar: sidebar.clone(),
                            doc_id: doc.id.clone(),
                        }
                        .into()
                    })
                })
            })
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(VersionRegistry {
            versions: self.versions,
        })
    }
}

/// Sealed, read-only registry.
#[derive(Debug)]
pub struct VersionRegistry {
    versions: Vec<Version>,
}

impl VersionRegistry {
    /// Versions in registration order.
    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// The version owning the unprefixed routes.
    #[must_use]
    pub fn last(&self) -> Option<&Version> {
        self.versions.iter().find(|v| v.is_last)
    }

    /// Resolve a weak document reference.
    #[must_use]
    pub fn doc(&self, version: &str, id: &str) -> Option<&Document> {
        self.get(version)?.doc(id)
    }
}
