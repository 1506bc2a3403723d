//! Plugin discovery.
//!
//! A plugin unit is a named initialization function that registers one or
//! more handlers. Units are compiled into the host and listed in a
//! [`PluginCatalog`] under a dotted module path (`commands.deploy.prod`).
//! The [`PluginLoader`] decides which of them to initialize:
//!
//! - **Filesystem mode** walks a commands directory for plugin source files
//!   (`*.rs` by default, package markers such as `mod.rs` excluded), derives
//!   each file's dotted module path relative to the base directory, and
//!   initializes the matching catalog unit.
//! - **Packaged mode** cannot look at the filesystem, so it enumerates the
//!   catalog itself for descendants of the package, skipping private
//!   (`._`-segment) modules.
//!
//! Initializing a unit that was already initialized runs its init function
//! again; registrations overwrite by name, so this is idempotent.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rcli_dispatch::{CommandRegistry, DiscoveryMode, FnHandler, PluginCatalog, PluginLoader};
//!
//! fn init_deploy(registry: &mut CommandRegistry) {
//!     registry.register(Arc::new(FnHandler::new("deploy", |_, _| Ok(()))), None);
//! }
//!
//! let catalog = PluginCatalog::new().with("commands.deploy", init_deploy);
//! let mut loader = PluginLoader::new(catalog).with_mode(DiscoveryMode::Packaged);
//! let mut registry = CommandRegistry::new();
//!
//! loader.auto_load("commands", &mut registry);
//! assert!(registry.contains("deploy"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DispatcherConfig;
use crate::registry::CommandRegistry;

/// Initialization routine of a plugin unit.
pub type PluginInit = fn(&mut CommandRegistry);

/// Module paths containing this marker are private and skipped in packaged mode.
pub const PRIVATE_SEGMENT: &str = "._";

/// How plugin units are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Scan a commands directory for plugin source files.
    #[default]
    Filesystem,
    /// Enumerate the catalog under a package path.
    Packaged,
}

impl DiscoveryMode {
    /// Packaged mode for frozen hosts, filesystem mode otherwise.
    pub fn from_frozen(frozen: bool) -> Self {
        if frozen {
            DiscoveryMode::Packaged
        } else {
            DiscoveryMode::Filesystem
        }
    }
}

/// Compiled-in plugin units keyed by dotted module path.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    units: BTreeMap<String, PluginInit>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit, replacing any unit with the same module path.
    pub fn with(mut self, module: impl Into<String>, init: PluginInit) -> Self {
        self.insert(module, init);
        self
    }

    /// Adds a unit, replacing any unit with the same module path.
    pub fn insert(&mut self, module: impl Into<String>, init: PluginInit) {
        self.units.insert(module.into(), init);
    }

    pub fn get(&self, module: &str) -> Option<PluginInit> {
        self.units.get(module).copied()
    }

    /// Module paths in sorted order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Non-private modules below `package`, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rcli_dispatch::PluginCatalog;
    ///
    /// fn noop(_: &mut rcli_dispatch::CommandRegistry) {}
    ///
    /// let catalog = PluginCatalog::new()
    ///     .with("commands.a", noop)
    ///     .with("commands.sub.b", noop)
    ///     .with("commands._hidden", noop)
    ///     .with("commandsx.c", noop)
    ///     .with("commands", noop);
    /// assert_eq!(catalog.descendants("commands"), vec!["commands.a", "commands.sub.b"]);
    /// ```
    pub fn descendants(&self, package: &str) -> Vec<&str> {
        let prefix = format!("{package}.");
        self.modules()
            .filter(|module| module.starts_with(&prefix))
            .filter(|module| !module.contains(PRIVATE_SEGMENT))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Counts from one discovery pass, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Candidate modules found (files or catalog entries).
    pub discovered: usize,
    /// Units initialized for the first time.
    pub initialized: usize,
    /// Units whose init ran again.
    pub reinitialized: usize,
    /// Candidates with no matching unit or an unreadable path.
    pub skipped: usize,
}

/// Discovers and initializes plugin units against a registry.
#[derive(Debug, Clone)]
pub struct PluginLoader {
    catalog: PluginCatalog,
    mode: DiscoveryMode,
    base_dir: PathBuf,
    extension: String,
    package_marker: String,
    initialized: BTreeSet<String>,
}

impl PluginLoader {
    /// Creates a filesystem-mode loader rooted at the current directory.
    pub fn new(catalog: PluginCatalog) -> Self {
        Self {
            catalog,
            mode: DiscoveryMode::Filesystem,
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            extension: "rs".to_string(),
            package_marker: "mod".to_string(),
            initialized: BTreeSet::new(),
        }
    }

    /// Creates a loader whose mode and file conventions come from `config`.
    pub fn from_config(config: &DispatcherConfig, catalog: PluginCatalog) -> Self {
        Self::new(catalog)
            .with_mode(DiscoveryMode::from_frozen(config.frozen))
            .with_extension(config.plugin_extension.clone())
            .with_package_marker(config.package_marker.clone())
    }

    pub fn with_mode(mut self, mode: DiscoveryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Directory module paths are derived relative to.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// File extension of plugin sources, without the dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// File stem that marks a package entry point rather than a plugin.
    pub fn with_package_marker(mut self, marker: impl Into<String>) -> Self {
        self.package_marker = marker.into();
        self
    }

    pub fn mode(&self) -> DiscoveryMode {
        self.mode
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Module paths initialized so far.
    pub fn initialized(&self) -> &BTreeSet<String> {
        &self.initialized
    }

    pub fn is_initialized(&self, module: &str) -> bool {
        self.initialized.contains(module)
    }

    /// Loads plugins from `commands_dir` using the configured mode.
    ///
    /// In packaged mode the directory is turned into a dotted package name.
    pub fn auto_load(&mut self, commands_dir: &str, registry: &mut CommandRegistry) -> LoadSummary {
        match self.mode {
            DiscoveryMode::Filesystem => self.load_dir(commands_dir, registry),
            DiscoveryMode::Packaged => self.load_package(&package_name(commands_dir), registry),
        }
    }

    /// Walks `dir` recursively and initializes every plugin file's unit.
    ///
    /// A relative `dir` is resolved against the base directory. A missing
    /// directory loads nothing.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>, registry: &mut CommandRegistry) -> LoadSummary {
        let mut summary = LoadSummary::default();
        let dir = dir.as_ref();
        let root = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        };

        if !root.is_dir() {
            debug!(dir = %root.display(), "Commands directory not found, nothing to load");
            return summary;
        }

        info!(dir = %root.display(), "Importing subcommands from filesystem");

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable plugin entry");
                    summary.skipped += 1;
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_plugin_source(path) {
                continue;
            }

            summary.discovered += 1;
            let Some(module) = module_path(&self.base_dir, path) else {
                if path.starts_with(&self.base_dir) {
                    warn!(path = %path.display(), "Plugin file path is not valid UTF-8");
                } else {
                    warn!(path = %path.display(), "Plugin file is outside the base directory");
                }
                summary.skipped += 1;
                continue;
            };

            match self.catalog.get(&module) {
                Some(init) => self.initialize(&module, init, registry, &mut summary),
                None => {
                    debug!(module = %module, "No plugin unit registered for module");
                    summary.skipped += 1;
                }
            }
        }

        summary
    }

    /// Initializes every non-private catalog unit below `package`.
    pub fn load_package(&mut self, package: &str, registry: &mut CommandRegistry) -> LoadSummary {
        let mut summary = LoadSummary::default();
        info!(package, "Importing packaged plugin modules");

        let units: Vec<(String, PluginInit)> = self
            .catalog
            .descendants(package)
            .into_iter()
            .filter_map(|module| self.catalog.get(module).map(|init| (module.to_string(), init)))
            .collect();

        for (module, init) in units {
            summary.discovered += 1;
            self.initialize(&module, init, registry, &mut summary);
        }

        summary
    }

    /// Re-runs the init function of every unit initialized so far.
    pub fn refresh(&mut self, registry: &mut CommandRegistry) -> LoadSummary {
        let mut summary = LoadSummary::default();
        let modules: Vec<String> = self.initialized.iter().cloned().collect();
        for module in modules {
            summary.discovered += 1;
            match self.catalog.get(&module) {
                Some(init) => self.initialize(&module, init, registry, &mut summary),
                None => summary.skipped += 1,
            }
        }
        summary
    }

    fn is_plugin_source(&self, path: &Path) -> bool {
        let has_extension = path.extension() == Some(OsStr::new(&self.extension));
        let is_marker = path.file_stem() == Some(OsStr::new(&self.package_marker));
        has_extension && !is_marker
    }

    fn initialize(
        &mut self,
        module: &str,
        init: PluginInit,
        registry: &mut CommandRegistry,
        summary: &mut LoadSummary,
    ) {
        if self.initialized.contains(module) {
            debug!(module, "Reloading plugin module");
            summary.reinitialized += 1;
        } else {
            debug!(module, "Importing plugin module");
            self.initialized.insert(module.to_string());
            summary.initialized += 1;
        }
        init(registry);
    }
}

/// Derives the dotted module path of `file` relative to `base`.
///
/// Returns `None` when `file` is not below `base` or is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rcli_dispatch::module_path;
///
/// let module = module_path(Path::new("/work"), Path::new("/work/commands/deploy/prod.rs"));
/// assert_eq!(module.as_deref(), Some("commands.deploy.prod"));
/// assert!(module_path(Path::new("/work"), Path::new("/elsewhere/x.rs")).is_none());
/// ```
pub fn module_path(base: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();
    let parts = parts?;
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

/// Turns a commands directory into a dotted package name.
///
/// # Examples
///
/// ```
/// assert_eq!(rcli_dispatch::package_name("app/commands"), "app.commands");
/// assert_eq!(rcli_dispatch::package_name(r"app\commands"), "app.commands");
/// ```
pub fn package_name(commands_dir: &str) -> String {
    commands_dir.replace(['/', '\\'], ".")
}
