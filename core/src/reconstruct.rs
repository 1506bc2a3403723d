//! Turning a [`CliArgs`] back into a token sequence.
//!
//! Emission order: program, context tokens, command, global options and
//! flags, subcommands, local options and flags, positionals. Accumulated
//! option values are expanded back into one `--name=value` token per value;
//! an empty value is written as `--name` followed by an empty token.
//! Flags named by a single ASCII letter are written as `-x`, all others as
//! `--name`.

use crate::args::{CliArgs, OptionMap, VALUE_SEPARATOR};
use std::collections::BTreeSet;

/// Controls what [`reconstruct`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Emit `program` as the first token.
    pub include_program: bool,
    /// Emit global options and flags.
    pub include_global: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            include_program: true,
            include_global: true,
        }
    }
}

/// Serializes `args` into a token sequence.
///
/// # Examples
///
/// ```
/// use rcli_core::{parse_args, reconstruct, ReconstructOptions};
///
/// let args = parse_args(["prog", "build", "--tag=a", "--tag=b", "-v"]);
/// let tokens = reconstruct(&args, ReconstructOptions::default());
/// assert_eq!(tokens, vec!["prog", "build", "--tag=a", "--tag=b", "-v"]);
///
/// let tokens = reconstruct(
///     &args,
///     ReconstructOptions { include_program: false, include_global: true },
/// );
/// assert_eq!(tokens[0], "build");
/// ```
pub fn reconstruct(args: &CliArgs, options: ReconstructOptions) -> Vec<String> {
    let mut out = Vec::new();

    if options.include_program && !args.program.is_empty() {
        out.push(args.program.clone());
    }

    out.extend(args.context_args.iter().cloned());

    if !args.command.is_empty() {
        out.push(args.command.clone());
    }

    if options.include_global {
        push_options(&mut out, &args.global_options);
        push_flags(&mut out, &args.global_flags);
    }

    out.extend(args.subcommands.iter().cloned());

    push_options(&mut out, &args.local_options);
    push_flags(&mut out, &args.local_flags);

    out.extend(args.positionals.iter().cloned());
    out
}

fn push_options(out: &mut Vec<String>, options: &OptionMap) {
    for (name, value) in options.iter() {
        for part in value.split(VALUE_SEPARATOR) {
            if part.is_empty() {
                // `--name=` is not an option token; the value has to follow separately
                out.push(format!("--{name}"));
                out.push(String::new());
            } else {
                out.push(format!("--{name}={part}"));
            }
        }
    }
}

fn push_flags(out: &mut Vec<String>, flags: &BTreeSet<String>) {
    for flag in flags {
        if flag.len() == 1 && flag.chars().all(|c| c.is_ascii_alphabetic()) {
            out.push(format!("-{flag}"));
        } else {
            out.push(format!("--{flag}"));
        }
    }
}
