//! Batch compilation of the whole corpus.
//!
//! Stages, each a barrier for the next:
//! 1. Scan every version's content root and parse + compile each document
//!    on the rayon pool. Parse failures are collected, not fatal per file.
//! 2. Resolve every version (identities, sidebars, navigation) in parallel.
//! 3. Register versions and seal the registry.
//! 4. Assemble the route graph.
//!
//! Any diagnostics after a stage stop the build before the next one.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;

use quire_config::{Config, VersionConfig};
use quire_parser::parse_document;
use quire_renderer::{RenderNode, TocEntry, TocRange, compile, plain_text, render_html};
use quire_site::{
    CategoryMetadata, Diagnostic, DiagnosticKind, Diagnostics, DocumentSource, RouteTable,
    SidebarsConfig, SiteError, SiteOptions, VersionInput, VersionRegistry, VersionRegistryBuilder,
    assemble_routes, build_version,
};

use crate::error::BuildError;
use crate::scanner::{ContentFile, scan_content};

/// Compiled body of one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledPage {
    pub nodes: Vec<RenderNode>,
    pub toc: Vec<TocEntry>,
    /// Static markup of `nodes`.
    pub html: String,
    /// Plain text of `nodes`, for the search index.
    pub text: String,
}

/// Fully compiled site, ready to be written.
#[derive(Debug)]
pub struct SiteBuild {
    pub registry: VersionRegistry,
    pub routes: RouteTable,
    /// Pages keyed by version name, then document id.
    pub pages: BTreeMap<String, BTreeMap<String, CompiledPage>>,
}

impl SiteBuild {
    #[must_use]
    pub fn page(&self, version: &str, id: &str) -> Option<&CompiledPage> {
        self.pages.get(version)?.get(id)
    }
}

/// One version after the parallel parse stage.
struct LoadedVersion {
    input: VersionInput,
    /// Compiled pages keyed by relative source path.
    pages: BTreeMap<String, CompiledPage>,
    diagnostics: Vec<Diagnostic>,
}

/// Run every compilation stage without touching the output directory.
pub fn compile_site(config: &Config) -> Result<SiteBuild, BuildError> {
    let toc_range = TocRange {
        min_level: config.toc.min_level,
        max_level: config.toc.max_level,
    };

    // Stage 1: per-document parse and compile.
    let loaded: Vec<LoadedVersion> = config
        .versions_resolved
        .par_iter()
        .map(|version| load_version(config, version, toc_range))
        .collect::<Result<_, _>>()?;

    let mut diagnostics = Diagnostics::default();
    for version in &loaded {
        for diagnostic in &version.diagnostics {
            diagnostics.push(diagnostic.clone());
        }
    }
    fail_on(diagnostics)?;

    // Stage 2: per-version resolution.
    let options = SiteOptions {
        base_url: config.site.base_url.clone(),
        route_base_path: config.docs_resolved.route_base_path.clone(),
        edit_url: config.docs_resolved.edit_url.clone(),
        include_drafts: config.docs_resolved.include_drafts,
        sidebar: config.sidebar,
    };
    let resolved: Vec<_> = loaded
        .into_par_iter()
        .map(|loaded| {
            let version = build_version(loaded.input, &options);
            (version, loaded.pages)
        })
        .collect();

    let mut diagnostics = Diagnostics::default();
    let mut versions = Vec::with_capacity(resolved.len());
    for (version, pages) in resolved {
        match version {
            Ok(version) => versions.push((version, pages)),
            Err(errors) => diagnostics.extend_site_errors(&errors),
        }
    }
    fail_on(diagnostics)?;

    // Stage 3: version registry.
    let mut builder = VersionRegistryBuilder::new();
    let mut pages = BTreeMap::new();
    let mut diagnostics = Diagnostics::default();
    for (version, mut by_path) in versions {
        let by_id: BTreeMap<String, CompiledPage> = version
            .docs()
            .filter_map(|doc| Some((doc.id.clone(), by_path.remove(&doc.source_path)?)))
            .collect();
        let name = version.name.clone();
        if let Err(err) = builder.register(version) {
            diagnostics.extend_site_errors(&[SiteError::from(err)]);
            continue;
        }
        pages.insert(name, by_id);
    }
    fail_on(diagnostics)?;

    let registry = match builder.seal() {
        Ok(registry) => registry,
        Err(errors) => return Err(failure(site_diagnostics(&errors))),
    };

    // Stage 4: route graph.
    let routes = assemble_routes(&registry, &config.static_pages, &config.site.base_url)
        .map_err(|errors| failure(site_diagnostics(&errors)))?;

    Ok(SiteBuild {
        registry,
        routes,
        pages,
    })
}

fn fail_on(diagnostics: Diagnostics) -> Result<(), BuildError> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    Err(failure(diagnostics))
}

/// Every failing stage reports its diagnostics in the same order.
fn failure(mut diagnostics: Diagnostics) -> BuildError {
    diagnostics.sort();
    BuildError::Failed(diagnostics)
}

fn site_diagnostics(errors: &[SiteError]) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();
    diagnostics.extend_site_errors(errors);
    diagnostics
}

fn load_version(
    config: &Config,
    version: &VersionConfig,
    toc_range: TocRange,
) -> Result<LoadedVersion, BuildError> {
    let scan = scan_content(&version.source_dir)?;
    let source_prefix = relative_slash_path(&version.source_dir, &config.root_dir);

    let results: Vec<Result<(DocumentSource, CompiledPage), Diagnostic>> = scan
        .documents
        .par_iter()
        .map(|file| load_document(file, toc_range))
        .collect();

    let mut diagnostics = Vec::new();
    let mut documents = Vec::with_capacity(results.len());
    let mut pages = BTreeMap::new();
    for result in results {
        match result {
            Ok((source, page)) => {
                pages.insert(source.relative_path.clone(), page);
                documents.push(source);
            }
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    let mut categories = BTreeMap::new();
    for file in &scan.categories {
        match read_category(file) {
            Ok(metadata) => {
                categories.insert(file.relative_path.clone(), metadata);
            }
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    let sidebars = match load_sidebars(&version.sidebar_path, &config.docs_resolved.default_sidebar) {
        Ok(sidebars) => sidebars,
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            SidebarsConfig::default()
        }
    };

    tracing::info!(
        version = %version.name,
        document_count = documents.len(),
        error_count = diagnostics.len(),
        "Parsed version"
    );

    Ok(LoadedVersion {
        input: VersionInput {
            config: version.clone(),
            source_prefix,
            documents,
            sidebars,
            categories,
        },
        pages,
        diagnostics,
    })
}

fn load_document(
    file: &ContentFile,
    toc_range: TocRange,
) -> Result<(DocumentSource, CompiledPage), Diagnostic> {
    let bytes = fs::read(&file.path).map_err(|e| {
        Diagnostic::new(DiagnosticKind::Parse, format!("failed to read document: {e}"))
            .with_path(&file.path)
    })?;
    let parsed = parse_document(&bytes)
        .map_err(|e| Diagnostic::new(DiagnosticKind::Parse, e.to_string()).with_path(&file.path))?;

    let range = toc_range.with_overrides(
        parsed.front_matter.toc_min_heading_level,
        parsed.front_matter.toc_max_heading_level,
    );
    let compiled = compile(&parsed.ast, range);
    let page = CompiledPage {
        html: render_html(&compiled.nodes),
        text: plain_text(&compiled.nodes),
        nodes: compiled.nodes,
        toc: compiled.toc,
    };
    tracing::debug!(path = %file.relative_path, "Compiled document");

    let source = DocumentSource {
        relative_path: file.relative_path.clone(),
        front_matter: parsed.front_matter,
        title: parsed.title,
        description: parsed.description,
    };
    Ok((source, page))
}

fn read_category(file: &ContentFile) -> Result<CategoryMetadata, Diagnostic> {
    let content = fs::read_to_string(&file.path).map_err(|e| {
        Diagnostic::new(DiagnosticKind::Navigation, format!("failed to read category: {e}"))
            .with_path(&file.path)
    })?;
    CategoryMetadata::from_yaml(&file.relative_path, &content).map_err(|e| {
        Diagnostic::new(DiagnosticKind::Navigation, e.to_string()).with_path(&file.path)
    })
}

/// Read a sidebar file, or autogenerate one sidebar when it is absent.
fn load_sidebars(path: &Path, default_sidebar: &str) -> Result<SidebarsConfig, Diagnostic> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "No sidebar file, autogenerating");
        return Ok(SidebarsConfig::autogenerated(default_sidebar));
    }
    let content = fs::read_to_string(path).map_err(|e| {
        Diagnostic::new(DiagnosticKind::Navigation, format!("failed to read sidebars: {e}"))
            .with_path(path)
    })?;
    SidebarsConfig::from_yaml(&content)
        .map_err(|e| Diagnostic::new(DiagnosticKind::Navigation, e.to_string()).with_path(path))
}

/// `path` relative to `base`, `/`-separated.
fn relative_slash_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
