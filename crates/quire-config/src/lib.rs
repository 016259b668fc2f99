//! Configuration management for quire.
//!
//! Parses `quire.toml` with serde and discovers the file in the current
//! directory or any of its parents. Values given on the command line are
//! applied on top through [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `site.url` and `docs.edit_url` support `${VAR}` and `${VAR:-default}`.
//!
//! ## Versions
//!
//! Without any `[[versions]]` table the site has a single `current` version
//! labelled "Next" that owns the unprefixed routes. See [`VersionConfig`] for
//! the defaults applied to each declared version.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only `Some` fields override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override draft inclusion.
    pub include_drafts: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// Name of the working-copy version.
pub const CURRENT_VERSION: &str = "current";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Documentation settings (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Table of contents extraction.
    pub toc: TocConfig,
    /// Sidebar autogeneration defaults.
    pub sidebar: SidebarConfig,
    /// Declared versions, newest first.
    versions: Vec<VersionConfigRaw>,
    /// Non-document pages added to the route graph.
    pub static_pages: Vec<StaticPageConfig>,
    /// Server configuration for `quire serve`.
    pub server: ServerConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved versions (set after loading).
    #[serde(skip)]
    pub versions_resolved: Vec<VersionConfig>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    /// Directory relative paths were resolved against.
    #[serde(skip)]
    pub root_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site-wide settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title shown in page titles.
    pub title: String,
    /// Public URL of the deployed site.
    pub url: Option<String>,
    /// URL prefix every route is mounted under.
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
            url: None,
            base_url: "/".to_owned(),
        }
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    route_base_path: Option<String>,
    sidebar_path: Option<String>,
    edit_url: Option<String>,
    include_drafts: Option<bool>,
    default_sidebar: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Content root of the `current` version.
    pub source_dir: PathBuf,
    /// Directory the built site is written to.
    pub output_dir: PathBuf,
    /// Route segment documents are mounted under, without slashes (e.g. "docs").
    pub route_base_path: String,
    /// Sidebar configuration file; missing file means autogenerate everything.
    pub sidebar_path: PathBuf,
    /// Base URL for "edit this page" links.
    pub edit_url: Option<String>,
    /// Treat drafts as ordinary documents.
    pub include_drafts: bool,
    /// Sidebar name used when no sidebar configuration exists.
    pub default_sidebar: String,
}

/// Table of contents heading range.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TocConfig {
    /// Shallowest heading level included.
    pub min_level: u8,
    /// Deepest heading level included.
    pub max_level: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 3,
        }
    }
}

/// Ordering policy for autogenerated sidebar items.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SidebarOrdering {
    /// Items with an explicit position first, then the rest alphabetically.
    #[default]
    PositionedFirst,
    /// Alphabetical by file name, ignoring positions.
    Alphabetical,
}

/// Sidebar autogeneration defaults.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SidebarConfig {
    /// Ordering policy.
    pub ordering: SidebarOrdering,
    /// Default `collapsible` flag for generated categories.
    pub collapsible: bool,
    /// Default `collapsed` flag for generated categories.
    pub collapsed: bool,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            ordering: SidebarOrdering::default(),
            collapsible: true,
            collapsed: true,
        }
    }
}

/// Version banner shown above documents.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BannerConfig {
    None,
    Unreleased,
    Unmaintained,
}

/// Raw version entry as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VersionConfigRaw {
    name: String,
    label: Option<String>,
    path: Option<String>,
    banner: Option<BannerConfig>,
    badge: Option<bool>,
    is_last: bool,
    source_dir: Option<String>,
    sidebar_path: Option<String>,
}

/// Resolved version descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConfig {
    /// Version name ("current", "1.0.0").
    pub name: String,
    /// Display label.
    pub label: String,
    /// URL segment under the route base; empty for the unprefixed version.
    pub path: String,
    /// Banner shown on this version's documents.
    pub banner: BannerConfig,
    /// Whether to show a version badge.
    pub badge: bool,
    /// Whether this is the latest released version.
    pub is_last: bool,
    /// Content root.
    pub source_dir: PathBuf,
    /// Per-version sidebar file.
    pub sidebar_path: PathBuf,
}

/// A non-document route.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StaticPageConfig {
    /// Route path (leading slash optional).
    pub path: String,
    /// Component the theme renders for this route.
    pub component: String,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.edit_url`").
        field: String,
        /// Error message (e.g., "${`REPO`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Strip leading and trailing slashes from a route segment.
fn trim_route(path: &str) -> String {
    path.trim_matches('/').to_owned()
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            for version in &mut self.versions_resolved {
                if version.source_dir == self.docs_resolved.source_dir {
                    version.source_dir.clone_from(source_dir);
                }
            }
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(include_drafts) = settings.include_drafts {
            self.docs_resolved.include_drafts = include_drafts;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            docs: DocsConfigRaw::default(),
            toc: TocConfig::default(),
            sidebar: SidebarConfig::default(),
            versions: Vec::new(),
            static_pages: Vec::new(),
            server: ServerConfig::default(),
            docs_resolved: DocsConfig::default(),
            versions_resolved: Vec::new(),
            config_path: None,
            root_dir: PathBuf::new(),
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_toc()?;
        self.validate_versions()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.title, "site.title")?;
        if !self.site.base_url.starts_with('/') {
            return Err(ConfigError::Validation(
                "site.base_url must start with /".to_owned(),
            ));
        }
        if let Some(url) = &self.site.url {
            require_http_url(url, "site.url")?;
        }
        if let Some(edit_url) = &self.docs_resolved.edit_url {
            require_http_url(edit_url, "docs.edit_url")?;
        }
        require_non_empty(&self.docs_resolved.default_sidebar, "docs.default_sidebar")?;
        Ok(())
    }

    fn validate_toc(&self) -> Result<(), ConfigError> {
        let TocConfig {
            min_level,
            max_level,
        } = self.toc;
        if !(1..=6).contains(&min_level) || !(1..=6).contains(&max_level) {
            return Err(ConfigError::Validation(
                "toc levels must be between 1 and 6".to_owned(),
            ));
        }
        if min_level > max_level {
            return Err(ConfigError::Validation(format!(
                "toc.min_level ({min_level}) cannot exceed toc.max_level ({max_level})"
            )));
        }
        Ok(())
    }

    /// Names must be present, unique and usable as one path segment (they name
    /// `data/<name>/` and `versioned_docs/version-<name>/`). `is_last` uniqueness
    /// is checked by the version registry at build time.
    fn validate_versions(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for version in &self.versions_resolved {
            require_non_empty(&version.name, "versions.name")?;
            if matches!(version.name.as_str(), "." | "..")
                || version.name.contains(['/', '\\', '\0'])
            {
                return Err(ConfigError::Validation(format!(
                    "invalid version name {:?}: must be a single path segment",
                    version.name
                )));
            }
            if !seen.insert(version.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate version name: {}",
                    version.name
                )));
            }
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = &self.site.url {
            self.site.url = Some(expand::expand_env(url, "site.url")?);
        }
        if let Some(edit_url) = &self.docs.edit_url {
            self.docs.edit_url = Some(expand::expand_env(edit_url, "docs.edit_url")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill in
    /// version defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.root_dir = config_dir.to_path_buf();
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        let sidebar_path = resolve(self.docs.sidebar_path.as_deref(), "sidebars.yaml");
        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "build"),
            route_base_path: trim_route(self.docs.route_base_path.as_deref().unwrap_or("docs")),
            sidebar_path: sidebar_path.clone(),
            edit_url: self
                .docs
                .edit_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_owned()),
            include_drafts: self.docs.include_drafts.unwrap_or(false),
            default_sidebar: self
                .docs
                .default_sidebar
                .clone()
                .unwrap_or_else(|| "docsSidebar".to_owned()),
        };

        if self.versions.is_empty() {
            self.versions_resolved = vec![VersionConfig {
                name: CURRENT_VERSION.to_owned(),
                label: "Next".to_owned(),
                path: String::new(),
                banner: BannerConfig::None,
                badge: false,
                is_last: true,
                source_dir: self.docs_resolved.source_dir.clone(),
                sidebar_path,
            }];
            return;
        }

        // Without an explicit last version, the first released one is last.
        let implicit_last = if self.versions.iter().any(|v| v.is_last) {
            None
        } else {
            Some(
                self.versions
                    .iter()
                    .position(|v| v.name != CURRENT_VERSION)
                    .unwrap_or(0),
            )
        };
        let mut passed_last = false;
        let mut resolved = Vec::with_capacity(self.versions.len());
        for (index, raw) in self.versions.iter().enumerate() {
            let is_current = raw.name == CURRENT_VERSION;
            let is_last = raw.is_last || implicit_last == Some(index);
            // Versions listed after the last one are considered old.
            let banner = raw.banner.unwrap_or(if is_last {
                BannerConfig::None
            } else if is_current {
                BannerConfig::Unreleased
            } else if passed_last {
                BannerConfig::Unmaintained
            } else {
                BannerConfig::None
            });
            if is_last {
                passed_last = true;
            }

            let source_dir = match (&raw.source_dir, is_current) {
                (Some(dir), _) => config_dir.join(dir),
                (None, true) => self.docs_resolved.source_dir.clone(),
                (None, false) => config_dir
                    .join("versioned_docs")
                    .join(format!("version-{}", raw.name)),
            };
            let version_sidebar = match (&raw.sidebar_path, is_current) {
                (Some(path), _) => config_dir.join(path),
                (None, true) => sidebar_path.clone(),
                (None, false) => config_dir
                    .join("versioned_sidebars")
                    .join(format!("version-{}-sidebars.yaml", raw.name)),
            };

            resolved.push(VersionConfig {
                name: raw.name.clone(),
                label: raw.label.clone().unwrap_or_else(|| {
                    if is_current {
                        "Next".to_owned()
                    } else {
                        raw.name.clone()
                    }
                }),
                path: raw.path.as_deref().map_or_else(
                    || {
                        if is_last {
                            String::new()
                        } else if is_current {
                            "next".to_owned()
                        } else {
                            raw.name.clone()
                        }
                    },
                    trim_route,
                ),
                banner,
                badge: raw.badge.unwrap_or(self.versions.len() > 1),
                is_last,
                source_dir,
                sidebar_path: version_sidebar,
            });
        }
        self.versions_resolved = resolved;
    }
}
