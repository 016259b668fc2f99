//! Corpus resolution for quire.
//!
//! Turns parsed documents into a resolved site model: document identities
//! and permalinks, sidebars with previous/next links, a sealed version
//! registry and the route graph. All structural problems are collected and
//! returned together so a build can report them at once.

mod corpus;
mod document;
mod error;
mod resolve;
mod routes;
mod sidebar;
mod version;

pub use corpus::{SiteOptions, VersionInput, build_version};
pub use document::{Document, DocumentSource, NavLink, TagLink, join_url};
pub use error::{
    Diagnostic, DiagnosticKind, Diagnostics, NavigationError, ResolutionError,
    RouteCollisionError, SiteError, VersionRegistryError,
};
pub use resolve::{DocumentContext, assign_navigation, resolve_documents};
pub use routes::{RouteEntry, RouteKind, RouteMetadata, RouteTable, assemble_routes};
pub use sidebar::{
    Breadcrumb, CategoryLink, CategoryMetadata, SidebarContext, SidebarItemConfig,
    SidebarItemSpec, SidebarNode, SidebarsConfig, breadcrumbs, build_sidebars,
    flatten_doc_ids,
};
pub use version::{Banner, Version, VersionRegistry, VersionRegistryBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(VersionRegistry: Send, Sync);
    static_assertions::assert_impl_all!(RouteTable: Send, Sync);
    static_assertions::assert_impl_all!(SiteError: Send, Sync);
}
