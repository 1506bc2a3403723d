//! Plugin units compiled into the `rcli` binary.
//!
//! In filesystem mode a unit is only initialized when a matching source file
//! exists under the commands directory (`commands/echo.rs` selects
//! `commands.echo`). In packaged mode every public unit below the package is
//! initialized.

use std::sync::Arc;

use rcli_core::CliArgs;
use rcli_dispatch::{
    ActionTable, CommandHandler, CommandRegistry, DispatchError, FnHandler, PluginCatalog, Result,
};

/// Catalog of the built-in units.
pub fn catalog() -> PluginCatalog {
    PluginCatalog::new()
        .with("commands.echo", init_echo)
        .with("commands.inspect", init_inspect)
        .with("commands._internal", init_internal)
}

fn init_echo(registry: &mut CommandRegistry) {
    registry.register(Arc::new(FnHandler::new("echo", echo)), None);
}

fn init_inspect(registry: &mut CommandRegistry) {
    registry.register(Arc::new(Inspect::new()), None);
}

fn init_internal(registry: &mut CommandRegistry) {
    registry.register(
        Arc::new(FnHandler::new("internal", |args, _ctx| {
            println!("internal handler invoked by {}", args.program);
            Ok(())
        })),
        None,
    );
}

/// Prints the subcommand and positionals, joined by `--sep` (default space).
fn echo(args: &CliArgs, _ctx: Option<&str>) -> Result<()> {
    let words: Vec<&str> = args
        .subcommands
        .iter()
        .chain(&args.positionals)
        .map(String::as_str)
        .collect();
    let sep = args.option("sep").unwrap_or(" ");
    println!("{}", words.join(sep));
    Ok(())
}

/// Shows how the command line was classified.
///
/// `inspect` alone prints the whole record; `inspect args|context|options`
/// prints one part of it.
struct Inspect {
    actions: ActionTable,
}

impl Inspect {
    fn new() -> Self {
        Self {
            actions: ActionTable::new()
                .with("args", show_args)
                .with("context", show_context)
                .with("options", show_options),
        }
    }
}

impl CommandHandler for Inspect {
    fn name(&self) -> &str {
        "inspect"
    }

    fn run(&self, args: &CliArgs, ctx: Option<&str>) -> Result<()> {
        match args.subcommand() {
            Some(_) => self.actions.dispatch_subcommand(args, ctx),
            None => show_args(args, ctx),
        }
    }
}

fn inspect_failed(message: impl Into<String>) -> DispatchError {
    DispatchError::HandlerFailed {
        command: "inspect".to_string(),
        message: message.into(),
    }
}

fn show_args(args: &CliArgs, _ctx: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(args).map_err(|err| inspect_failed(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn show_context(_args: &CliArgs, ctx: Option<&str>) -> Result<()> {
    let ctx = ctx.ok_or_else(|| inspect_failed("no context token given"))?;
    println!("{ctx}");
    Ok(())
}

fn show_options(args: &CliArgs, _ctx: Option<&str>) -> Result<()> {
    for (name, value) in args.global_options.iter() {
        println!("global {name}={value}");
    }
    for name in &args.global_flags {
        println!("global {name}");
    }
    for (name, value) in args.local_options.iter() {
        println!("local {name}={value}");
    }
    for name in &args.local_flags {
        println!("local {name}");
    }
    Ok(())
}
