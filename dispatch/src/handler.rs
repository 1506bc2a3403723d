//! Command handler capability.
//!
//! A handler is anything that can be invoked with a classified [`CliArgs`]
//! and an optional context token. Plugin units register handlers with the
//! [`CommandRegistry`](crate::CommandRegistry); the registry only ever hands
//! them out, it never runs them.

use std::collections::BTreeMap;
use std::fmt;

use rcli_core::CliArgs;

use crate::error::{DispatchError, Result};

/// A command implementation.
///
/// # Examples
///
/// ```
/// use rcli_core::{CliArgs, parse_args};
/// use rcli_dispatch::{CommandHandler, Result};
///
/// struct Greet;
///
/// impl CommandHandler for Greet {
///     fn name(&self) -> &str {
///         "greet"
///     }
///
///     fn run(&self, args: &CliArgs, _ctx: Option<&str>) -> Result<()> {
///         assert_eq!(args.command, "greet");
///         Ok(())
///     }
/// }
///
/// let args = parse_args(["prog", "greet"]);
/// Greet.run(&args, None).unwrap();
/// ```
pub trait CommandHandler: Send + Sync {
    /// Declared identifier, used as the registry key when no name is given.
    fn name(&self) -> &str;

    /// Runs the command. The default implementation reports
    /// [`DispatchError::NotImplemented`].
    fn run(&self, args: &CliArgs, ctx: Option<&str>) -> Result<()> {
        let _ = (args, ctx);
        Err(DispatchError::NotImplemented(self.name().to_string()))
    }
}

impl fmt::Debug for dyn CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("name", &self.name())
            .finish()
    }
}

type RunFn = dyn Fn(&CliArgs, Option<&str>) -> Result<()> + Send + Sync;

/// Handler backed by a closure.
///
/// # Examples
///
/// ```
/// use rcli_core::parse_args;
/// use rcli_dispatch::{CommandHandler, FnHandler};
///
/// let handler = FnHandler::new("echo", |args, _ctx| {
///     println!("{}", args.positionals.join(" "));
///     Ok(())
/// });
/// assert_eq!(handler.name(), "echo");
/// handler.run(&parse_args(["prog", "echo"]), None).unwrap();
/// ```
pub struct FnHandler {
    name: String,
    run: Box<RunFn>,
}

impl FnHandler {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&CliArgs, Option<&str>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }
}

impl CommandHandler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, args: &CliArgs, ctx: Option<&str>) -> Result<()> {
        (self.run)(args, ctx)
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

/// Signature of an action in an [`ActionTable`].
pub type ActionFn = fn(&CliArgs, Option<&str>) -> Result<()>;

/// Named actions a handler exposes, typically keyed by subcommand.
///
/// A handler builds its table once and forwards `run` to
/// [`dispatch`](ActionTable::dispatch).
///
/// # Examples
///
/// ```
/// use rcli_core::{CliArgs, parse_args};
/// use rcli_dispatch::{ActionTable, Result};
///
/// fn start(_args: &CliArgs, _ctx: Option<&str>) -> Result<()> {
///     Ok(())
/// }
///
/// let table = ActionTable::new().with("start", start);
/// let args = parse_args(["prog", "server", "start"]);
/// table.dispatch_subcommand(&args, None).unwrap();
/// assert!(table.dispatch("stop", &args, None).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    actions: BTreeMap<String, ActionFn>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `action` under `name`, replacing any previous entry.
    pub fn with(mut self, name: impl Into<String>, action: ActionFn) -> Self {
        self.insert(name, action);
        self
    }

    /// Adds `action` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, action: ActionFn) {
        self.actions.insert(name.into(), action);
    }

    pub fn get(&self, name: &str) -> Option<ActionFn> {
        self.actions.get(name).copied()
    }

    /// Action names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs the action registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownAction`] when no action matches, or
    /// whatever the action itself returns.
    pub fn dispatch(&self, name: &str, args: &CliArgs, ctx: Option<&str>) -> Result<()> {
        match self.get(name) {
            Some(action) => action(args, ctx),
            None => Err(DispatchError::UnknownAction(name.to_string())),
        }
    }

    /// Runs the action named by the record's subcommand.
    ///
    /// A missing subcommand is reported as an unknown empty action.
    pub fn dispatch_subcommand(&self, args: &CliArgs, ctx: Option<&str>) -> Result<()> {
        self.dispatch(args.subcommand().unwrap_or_default(), args, ctx)
    }
}
