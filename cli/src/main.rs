mod plugins;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use rcli_core::{Classifier, ReconstructOptions, reconstruct};
use rcli_dispatch::{CommandRegistry, DiscoveryMode, Dispatcher, DispatcherConfig};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI output format for structured results.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "rcli")]
#[command(version)]
#[command(about = "Classify command-line arguments and dispatch plugin commands")]
struct Cli {
    /// Path to a dispatcher config YAML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Commands directory, or package path when frozen.
    #[arg(long)]
    commands_dir: Option<String>,
    /// Discover plugins from the compiled-in package instead of the filesystem.
    #[arg(long)]
    frozen: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify an argument vector and print the resulting record.
    Parse(ParseArgs),
    /// Classify an argument vector and print it back as a command line.
    Reconstruct(ReconstructArgs),
    /// List the commands registered by plugin discovery.
    Commands(CommandsArgs),
    /// Dispatch TOKENS to the registered command handler.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Shell-quoted command line to classify instead of TOKENS.
    #[arg(long, conflicts_with = "tokens")]
    line: Option<String>,
    /// Argument vector to classify; the first token is the program name.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Args)]
struct ReconstructArgs {
    /// Leave the program name out of the output.
    #[arg(long)]
    no_program: bool,
    /// Leave global options and flags out of the output.
    #[arg(long)]
    no_global: bool,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Args)]
struct CommandsArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Command line to dispatch, without the program name.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CommandListing {
    mode: DiscoveryMode,
    commands: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(&cli).and_then(|config| match cli.command {
        Command::Parse(args) => run_parse(&config, args),
        Command::Reconstruct(args) => run_reconstruct(&config, args),
        Command::Commands(args) => run_commands(config, args),
        Command::Run(args) => run_dispatch(config, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<DispatcherConfig, String> {
    let mut config = match &cli.config {
        Some(path) => DispatcherConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => DispatcherConfig::default(),
    };
    if let Some(dir) = &cli.commands_dir {
        config.commands_dir = dir.clone();
    }
    if cli.frozen {
        config.frozen = true;
    }
    debug!(?config, "Resolved dispatcher config");
    Ok(config)
}

fn input_tokens(input: InputArgs) -> Result<Vec<String>, String> {
    match input.line {
        Some(line) => shell_words::split(&line).map_err(|err| format!("Failed to split --line: {err}")),
        None => Ok(input.tokens),
    }
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize JSON output: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|err| format!("Failed to serialize YAML output: {err}")),
    }
}

fn run_parse(config: &DispatcherConfig, args: ParseArgs) -> Result<(), String> {
    let tokens = input_tokens(args.input)?;
    let record = Classifier::new(config.classifier_options()).parse(tokens);
    println!("{}", render(&record, args.format)?.trim_end());
    Ok(())
}

fn run_reconstruct(config: &DispatcherConfig, args: ReconstructArgs) -> Result<(), String> {
    let tokens = input_tokens(args.input)?;
    let record = Classifier::new(config.classifier_options()).parse(tokens);
    let options = ReconstructOptions {
        include_program: !args.no_program,
        include_global: !args.no_global,
    };
    println!("{}", shell_words::join(reconstruct(&record, options)));
    Ok(())
}

fn run_commands(config: DispatcherConfig, args: CommandsArgs) -> Result<(), String> {
    let dispatcher = Dispatcher::new(
        config,
        plugins::catalog(),
        CommandRegistry::new(),
        [env!("CARGO_BIN_NAME")],
    );
    let listing = CommandListing {
        mode: dispatcher.loader().mode(),
        commands: dispatcher.registry().names(),
    };
    println!("{}", render(&listing, args.format)?.trim_end());
    Ok(())
}

fn run_dispatch(config: DispatcherConfig, args: RunArgs) -> Result<(), String> {
    let argv = std::iter::once(env!("CARGO_BIN_NAME").to_string()).chain(args.tokens);
    let dispatcher = Dispatcher::new(config, plugins::catalog(), CommandRegistry::new(), argv);
    let parsed = dispatcher.args();

    if parsed.command.is_empty() {
        return Err("No command given".to_string());
    }
    let handler = dispatcher.resolve().ok_or_else(|| {
        format!(
            "Unknown command '{}' (available: {})",
            parsed.command,
            dispatcher.registry().names().join(", ")
        )
    })?;

    handler
        .run(parsed, parsed.context())
        .map_err(|err| err.to_string())
}
