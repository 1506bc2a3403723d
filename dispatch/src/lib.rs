//! Plugin discovery, command registry and dispatcher startup.
//!
//! This crate wires classified arguments from `rcli-core` to command
//! handlers contributed by plugin units. A host constructs one
//! [`CommandRegistry`], lists its compiled-in plugin units in a
//! [`PluginCatalog`], and hands both to a [`Dispatcher`], which discovers
//! the units, lets them register handlers, and classifies the argument
//! vector.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use rcli_dispatch::{CommandRegistry, Dispatcher, DispatcherConfig, FnHandler, PluginCatalog};
//!
//! fn init_deploy(registry: &mut CommandRegistry) {
//!     registry.register(Arc::new(FnHandler::new("deploy", |args, _ctx| {
//!         assert!(args.has_flag("force"));
//!         Ok(())
//!     })), None);
//! }
//!
//! let config = DispatcherConfig { frozen: true, ..DispatcherConfig::default() };
//! let catalog = PluginCatalog::new().with("commands.deploy", init_deploy);
//! let dispatcher = Dispatcher::new(config, catalog, CommandRegistry::new(), ["app", "deploy", "--force"]);
//!
//! let handler = dispatcher.resolve().unwrap();
//! handler.run(dispatcher.args(), dispatcher.args().context()).unwrap();
//! ```
//!
//! # Discovery modes
//!
//! - **Filesystem**: the commands directory is walked for plugin source
//!   files and each file's dotted module path selects a catalog unit.
//! - **Packaged** (`frozen: true`): the catalog is enumerated for units
//!   below the commands package, skipping private `._` modules.

mod config;
mod dispatcher;
mod error;
mod handler;
mod loader;
mod registry;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use handler::{ActionFn, ActionTable, CommandHandler, FnHandler};
pub use loader::{
    DiscoveryMode, LoadSummary, PRIVATE_SEGMENT, PluginCatalog, PluginInit, PluginLoader,
    module_path, package_name,
};
pub use registry::CommandRegistry;
