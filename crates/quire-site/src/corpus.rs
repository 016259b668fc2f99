//! Per-version corpus resolution.

use std::collections::BTreeMap;

use quire_config::{SidebarConfig, VersionConfig};

use crate::document::{DocumentSource, join_url};
use crate::error::SiteError;
use crate::resolve::{DocumentContext, assign_navigation, resolve_documents};
use crate::sidebar::{CategoryMetadata, SidebarContext, SidebarsConfig, build_sidebars};
use crate::version::{Banner, Version};

/// Site-wide settings shared by every version.
#[derive(Clone, Debug, Default)]
pub struct SiteOptions {
    pub base_url: String,
    /// Route prefix of documentation pages (e.g. `docs`).
    pub route_base_path: String,
    pub edit_url: Option<String>,
    pub include_drafts: bool,
    pub sidebar: SidebarConfig,
}

/// Everything read from disk for one version.
#[derive(Clone, Debug)]
pub struct VersionInput {
    pub config: VersionConfig,
    /// Content root relative to the project root, `/`-separated.
    pub source_prefix: String,
    pub documents: Vec<DocumentSource>,
    pub sidebars: SidebarsConfig,
    /// `_category_.yaml` metadata by directory.
    pub categories: BTreeMap<String, CategoryMetadata>,
}

/// Resolve documents, build sidebars and link neighbours for one version.
pub fn build_version(input: VersionInput, options: &SiteOptions) -> Result<Version, Vec<SiteError>> {
    let config = input.config;
    let base_path = join_url(&[&options.base_url, &options.route_base_path, &config.path]);

    let mut docs = resolve_documents(
        input.documents,
        &DocumentContext {
            version: &config.name,
            base_path: &base_path,
            source_prefix: &input.source_prefix,
            edit_url: options.edit_url.as_deref(),
            include_drafts: options.include_drafts,
        },
    )?;

    let sidebars = build_sidebars(
        &input.sidebars,
        &SidebarContext {
            version: &config.name,
            docs: &docs,
            categories: &input.categories,
            defaults: options.sidebar,
        },
    )?;

    assign_navigation(&mut docs, &sidebars, &config.name)?;

    tracing::info!(
        version = %config.name,
        document_count = docs.len(),
        sidebar_count = sidebars.len(),
        "Built version"
    );

    Ok(Version {
        name: config.name,
        label: config.label,
        path: base_path,
        banner: Banner::from_config(config.banner),
        badge: config.badge,
        is_last: config.is_last,
        docs_sidebars: sidebars,
        docs,
    })
}
