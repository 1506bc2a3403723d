//! Argument classification for command-line front ends.
//!
//! This crate turns a raw argument vector into a [`CliArgs`] record:
//!
//! - [`CliArgs`]: program, global/local options and flags, command,
//!   subcommand, positionals and context tokens.
//! - [`OptionMap`]: insertion-ordered option values; repeated options
//!   accumulate as `a,b,c`.
//! - [`Classifier`]: the single-pass, first-match-wins token classifier,
//!   tuned by [`ClassifierOptions`].
//! - [`reconstruct`]: the inverse direction, record back to tokens.
//!
//! Classification never fails: any token that is not an option, flag,
//! context token or sigil command is absorbed as command, subcommand or
//! positional.
//!
//! # Example
//!
//! ```
//! use rcli_core::*;
//!
//! let args = parse_args(["prog", "/ctx1", "build", "--tag=a", "--tag=b", "release", "main.c"]);
//!
//! assert_eq!(args.context_args, vec!["/ctx1"]);
//! assert_eq!(args.command, "build");
//! assert_eq!(args.local_options.get("tag"), Some("a,b"));
//! assert_eq!(args.subcommand(), Some("release"));
//! assert_eq!(args.positionals, vec!["main.c"]);
//! ```

mod args;
mod classify;
mod reconstruct;

pub use args::{CliArgs, OptionMap, VALUE_SEPARATOR};
pub use classify::{
    Classifier, ClassifierOptions, DEFAULT_CONTEXT_PREFIXES, Scope, TokenKind, parse_args,
};
pub use reconstruct::{ReconstructOptions, reconstruct};
