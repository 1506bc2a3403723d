//! Startup facade tying loader, registry and classifier together.

use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::Arc;

use rcli_core::{Classifier, CliArgs};
use tracing::debug;

use crate::config::DispatcherConfig;
use crate::error::{DispatchError, Result};
use crate::handler::CommandHandler;
use crate::loader::{LoadSummary, PluginCatalog, PluginLoader};
use crate::registry::CommandRegistry;

const SET_COMMANDS_MESSAGE: &str = "Do not set the commands of a Dispatcher directly. \
Use Dispatcher::register_command(handler, name) or register with \
CommandRegistry::register(handler, name) instead";

/// Loads plugins, owns the registry, and holds the classified arguments.
///
/// Construction runs plugin discovery against the configured commands
/// location, then classifies the argument vector.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rcli_dispatch::{CommandRegistry, Dispatcher, DispatcherConfig, FnHandler, PluginCatalog};
///
/// fn init_build(registry: &mut CommandRegistry) {
///     registry.register(Arc::new(FnHandler::new("build", |_, _| Ok(()))), None);
/// }
///
/// let config = DispatcherConfig { frozen: true, ..DispatcherConfig::default() };
/// let catalog = PluginCatalog::new().with("commands.build", init_build);
/// let dispatcher = Dispatcher::new(config, catalog, CommandRegistry::new(), ["prog", "build", "-j", "4"]);
///
/// assert_eq!(dispatcher.args().command, "build");
/// assert!(dispatcher.commands().contains_key("build"));
/// assert!(dispatcher.resolve().is_some());
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    config: DispatcherConfig,
    loader: PluginLoader,
    registry: CommandRegistry,
    raw_args: Vec<String>,
    args: CliArgs,
}

impl Dispatcher {
    /// Builds a dispatcher with a loader derived from `config`.
    pub fn new<I, S>(
        config: DispatcherConfig,
        catalog: PluginCatalog,
        registry: CommandRegistry,
        argv: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let loader = PluginLoader::from_config(&config, catalog);
        Self::with_loader(config, loader, registry, argv)
    }

    /// Builds a dispatcher from the process arguments.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn from_env(
        config: DispatcherConfig,
        catalog: PluginCatalog,
        registry: CommandRegistry,
    ) -> Self {
        Self::new(config, catalog, registry, lossy_args(std::env::args_os()))
    }

    /// Builds a dispatcher around an already configured loader.
    pub fn with_loader<I, S>(
        config: DispatcherConfig,
        mut loader: PluginLoader,
        mut registry: CommandRegistry,
        argv: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let summary = loader.auto_load(&config.commands_dir, &mut registry);
        debug!(
            mode = ?loader.mode(),
            discovered = summary.discovered,
            initialized = summary.initialized,
            reinitialized = summary.reinitialized,
            skipped = summary.skipped,
            commands = registry.len(),
            "Plugin discovery finished"
        );

        let raw_args: Vec<String> = argv.into_iter().map(Into::into).collect();
        let args = Classifier::new(config.classifier_options()).parse(raw_args.clone());

        Self {
            config,
            loader,
            registry,
            raw_args,
            args,
        }
    }

    /// Copy of the registered commands.
    pub fn commands(&self) -> HashMap<String, Arc<dyn CommandHandler>> {
        self.registry.all_commands()
    }

    /// Always fails: the command view cannot be replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidMutation`] with instructions to use
    /// [`register_command`](Self::register_command) or the registry API.
    pub fn set_commands(&mut self, commands: HashMap<String, Arc<dyn CommandHandler>>) -> Result<()> {
        let _ = commands;
        Err(DispatchError::InvalidMutation(SET_COMMANDS_MESSAGE.to_string()))
    }

    /// Registers `handler` with the underlying registry.
    pub fn register_command(&mut self, handler: Arc<dyn CommandHandler>, name: Option<&str>) {
        self.registry.register(handler, name);
    }

    /// Handler for the classified command, if one is registered.
    pub fn resolve(&self) -> Option<Arc<dyn CommandHandler>> {
        if self.args.command.is_empty() {
            return None;
        }
        self.registry.get(&self.args.command)
    }

    /// Re-initializes every plugin unit loaded so far.
    pub fn refresh_plugins(&mut self) -> LoadSummary {
        self.loader.refresh(&mut self.registry)
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// The argument vector as given, before classification.
    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn loader(&self) -> &PluginLoader {
        &self.loader
    }
}

fn lossy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::loader::DiscoveryMode;

    fn init_status(registry: &mut CommandRegistry) {
        registry.register(Arc::new(FnHandler::new("status", |_, _| Ok(()))), None);
    }

    fn packaged() -> Dispatcher {
        let config = DispatcherConfig {
            frozen: true,
            ..DispatcherConfig::default()
        };
        let catalog = PluginCatalog::new().with("commands.status", init_status);
        Dispatcher::new(config, catalog, CommandRegistry::new(), ["prog", "status", "--short"])
    }

    #[test]
    fn test_construction_loads_and_parses() {
        let dispatcher = packaged();
        assert_eq!(dispatcher.loader().mode(), DiscoveryMode::Packaged);
        assert!(dispatcher.registry().contains("status"));
        assert_eq!(dispatcher.args().command, "status");
        assert!(dispatcher.args().local_flags.contains("short"));
        assert_eq!(dispatcher.raw_args(), ["prog", "status", "--short"]);
    }

    #[test]
    fn test_set_commands_is_rejected() {
        let mut dispatcher = packaged();
        let err = dispatcher.set_commands(HashMap::new()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidMutation(_)));
        assert!(err.to_string().contains("register_command"));
        assert!(dispatcher.registry().contains("status"));
    }

    #[test]
    fn test_register_command_goes_through_registry() {
        let mut dispatcher = packaged();
        dispatcher.register_command(Arc::new(FnHandler::new("x", |_, _| Ok(()))), Some("deploy"));
        assert!(dispatcher.commands().contains_key("deploy"));
        assert!(dispatcher.registry().get("deploy").is_some());
    }

    #[test]
    fn test_commands_view_is_a_copy() {
        let dispatcher = packaged();
        let mut view = dispatcher.commands();
        view.clear();
        assert_eq!(dispatcher.commands().len(), 1);
    }

    #[test]
    fn test_resolve_without_command() {
        let config = DispatcherConfig {
            frozen: true,
            ..DispatcherConfig::default()
        };
        let dispatcher = Dispatcher::new(config, PluginCatalog::new(), CommandRegistry::new(), ["prog", "-v"]);
        assert!(dispatcher.resolve().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_arguments_are_converted_lossily() {
        use std::os::unix::ffi::OsStringExt;

        let argv = vec![
            OsString::from("prog"),
            OsString::from_vec(vec![b'b', 0xff, b'd']),
            OsString::from("--fast"),
        ];
        let argv = lossy_args(argv);
        assert_eq!(argv, vec!["prog", "b\u{FFFD}d", "--fast"]);

        let config = DispatcherConfig {
            frozen: true,
            ..DispatcherConfig::default()
        };
        let dispatcher = Dispatcher::new(config, PluginCatalog::new(), CommandRegistry::new(), argv);
        assert_eq!(dispatcher.args().command, "b\u{FFFD}d");
        assert!(dispatcher.args().local_flags.contains("fast"));
    }

    #[test]
    fn test_refresh_plugins() {
        let mut dispatcher = packaged();
        let summary = dispatcher.refresh_plugins();
        assert_eq!(summary.reinitialized, 1);
        assert!(dispatcher.registry().contains("status"));
    }
}
