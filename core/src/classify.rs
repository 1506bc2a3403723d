//! Token classification.
//!
//! The classifier walks the argument vector once, left to right, and sorts
//! every token into a [`CliArgs`] field. Each token is matched against an
//! ordered rule set; the first rule that matches wins:
//!
//! 1. context token (`/`, `?#`, `?@`, `??` prefixes)
//! 2. `--name=value`
//! 3. `--name [value]`
//! 4. `-abc` (combined short flags)
//! 5. `-x [value]`
//! 6. sigil command (`@alias`, `:name`, `#id`)
//! 7. first plain token becomes the command
//! 8. next plain token becomes the subcommand
//! 9. everything else is positional
//!
//! Options and flags land in the global or local bucket depending on the
//! current [`Scope`]. Scope starts global and flips to local, permanently,
//! on the first context token or on a plain command (rule 7). A sigil command
//! leaves scope alone unless [`ClassifierOptions::sigil_flips_scope`] is set.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::args::CliArgs;

/// Prefixes that mark a context token.
pub const DEFAULT_CONTEXT_PREFIXES: [&str; 4] = ["/", "?#", "?@", "??"];

static PATTERNS: LazyLock<TokenPatterns> = LazyLock::new(TokenPatterns::new);

struct TokenPatterns {
    long_with_value: Regex,
    long: Regex,
    combined_short: Regex,
    short: Regex,
    sigil_command: Regex,
}

impl TokenPatterns {
    fn new() -> Self {
        Self {
            // --name=value (value must be non-empty)
            long_with_value: Regex::new(r"^--([\w-]+)=(.+)$").expect("static regex must compile"),
            // --name
            long: Regex::new(r"^--([\w-]+)$").expect("static regex must compile"),
            // -abc
            combined_short: Regex::new(r"^-([a-zA-Z]{2,})$").expect("static regex must compile"),
            // -x
            short: Regex::new(r"^-([a-zA-Z])$").expect("static regex must compile"),
            // @alias, :name, #id
            sigil_command: Regex::new(r"(?s)^[@:#].+").expect("static regex must compile"),
        }
    }
}

/// Which bucket options and flags are currently recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Before a command (or context token) has been seen.
    #[default]
    Global,
    /// After the flip; never reverts within one parse.
    Local,
}

/// Shape of a single token, independent of parser state.
///
/// Rules 7–9 all start from [`TokenKind::Plain`]; which one applies depends
/// on what the record already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Starts with a reserved context prefix.
    Context,
    /// `--name=value`.
    LongWithValue { name: &'a str, value: &'a str },
    /// `--name`, value may follow as the next token.
    Long(&'a str),
    /// `-abc`, one flag per letter.
    CombinedShort(&'a str),
    /// `-x`, value may follow as the next token.
    Short(&'a str),
    /// `@alias`, `:name` or `#id`.
    Sigil,
    /// Anything else, including malformed option-looking tokens.
    Plain,
}

/// Tuning knobs for the [`Classifier`].
///
/// # Examples
///
/// ```
/// use rcli_core::ClassifierOptions;
///
/// let opts = ClassifierOptions::default();
/// assert!(!opts.sigil_flips_scope);
/// assert_eq!(opts.context_prefixes, vec!["/", "?#", "?@", "??"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Token prefixes routed to `context_args`.
    pub context_prefixes: Vec<String>,
    /// Whether a sigil command flips scope to local like a plain command does.
    pub sigil_flips_scope: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            context_prefixes: DEFAULT_CONTEXT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            sigil_flips_scope: false,
        }
    }
}

impl ClassifierOptions {
    /// Returns options with the sigil scope flip enabled or disabled.
    pub fn with_sigil_flips_scope(mut self, flips: bool) -> Self {
        self.sigil_flips_scope = flips;
        self
    }

    /// Determines the shape of `token` under these options.
    ///
    /// # Examples
    ///
    /// ```
    /// use rcli_core::{ClassifierOptions, TokenKind};
    ///
    /// let opts = ClassifierOptions::default();
    /// assert_eq!(opts.token_kind("/ctx"), TokenKind::Context);
    /// assert_eq!(opts.token_kind("--out=a.txt"), TokenKind::LongWithValue { name: "out", value: "a.txt" });
    /// assert_eq!(opts.token_kind("-abc"), TokenKind::CombinedShort("abc"));
    /// assert_eq!(opts.token_kind("--=value"), TokenKind::Plain);
    /// ```
    pub fn token_kind<'a>(&self, token: &'a str) -> TokenKind<'a> {
        if self
            .context_prefixes
            .iter()
            .any(|prefix| token.starts_with(prefix.as_str()))
        {
            return TokenKind::Context;
        }

        let patterns = &*PATTERNS;
        if let Some(caps) = patterns.long_with_value.captures(token) {
            if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
                return TokenKind::LongWithValue {
                    name: name.as_str(),
                    value: value.as_str(),
                };
            }
        }
        if let Some(name) = patterns.long.captures(token).and_then(|c| c.get(1)) {
            return TokenKind::Long(name.as_str());
        }
        if let Some(letters) = patterns.combined_short.captures(token).and_then(|c| c.get(1)) {
            return TokenKind::CombinedShort(letters.as_str());
        }
        if let Some(name) = patterns.short.captures(token).and_then(|c| c.get(1)) {
            return TokenKind::Short(name.as_str());
        }
        if patterns.sigil_command.is_match(token) {
            return TokenKind::Sigil;
        }
        TokenKind::Plain
    }
}

/// Single-pass argument classifier.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    options: ClassifierOptions,
}

/// Mutable state of one classification run.
struct Pass {
    args: CliArgs,
    scope: Scope,
    tokens: VecDeque<String>,
}

impl Pass {
    fn set_option(&mut self, name: &str, value: &str) {
        match self.scope {
            Scope::Global => self.args.global_options.set(name, value),
            Scope::Local => self.args.local_options.set(name, value),
        }
    }

    fn set_flag(&mut self, name: &str) {
        let flags = match self.scope {
            Scope::Global => &mut self.args.global_flags,
            Scope::Local => &mut self.args.local_flags,
        };
        flags.insert(name.to_string());
    }

    /// Consumes the next token as a value unless it looks like an option.
    fn take_value(&mut self) -> Option<String> {
        if self.tokens.front().is_some_and(|next| !next.starts_with('-')) {
            self.tokens.pop_front()
        } else {
            None
        }
    }

    /// Records `name` as an option when a value follows, otherwise as a flag.
    fn option_or_flag(&mut self, name: &str) {
        match self.take_value() {
            Some(value) => self.set_option(name, &value),
            None => self.set_flag(name),
        }
    }

    fn go_local(&mut self) {
        if self.scope == Scope::Global {
            trace!("scope flipped to local");
        }
        self.scope = Scope::Local;
    }
}

impl Classifier {
    /// Creates a classifier with the given options.
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    /// Returns the options this classifier was built with.
    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Classifies a full argument vector; its first element is the program.
    ///
    /// An empty vector yields a default record with an empty program.
    pub fn parse<I, S>(&self, argv: I) -> CliArgs
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: VecDeque<String> = argv.into_iter().map(Into::into).collect();
        let program = tokens.pop_front().unwrap_or_default();
        self.classify(program, tokens)
    }

    /// Classifies `tokens`, which must not include the program name.
    pub fn classify(&self, program: impl Into<String>, tokens: VecDeque<String>) -> CliArgs {
        self.classify_with_scope(program, tokens).0
    }

    /// Like [`classify`](Self::classify), also returning the final scope.
    pub fn classify_with_scope(
        &self,
        program: impl Into<String>,
        tokens: VecDeque<String>,
    ) -> (CliArgs, Scope) {
        let mut pass = Pass {
            args: CliArgs::new(program),
            scope: Scope::Global,
            tokens,
        };

        while let Some(token) = pass.tokens.pop_front() {
            self.step(&mut pass, token);
        }

        (pass.args, pass.scope)
    }

    fn step(&self, pass: &mut Pass, token: String) {
        match self.options.token_kind(&token) {
            TokenKind::Context => {
                trace!(%token, "context token");
                pass.go_local();
                pass.args.context_args.push(token);
            }
            TokenKind::LongWithValue { name, value } => {
                trace!(option = name, value, scope = ?pass.scope, "inline option");
                pass.set_option(name, value);
            }
            TokenKind::Long(name) => {
                trace!(option = name, scope = ?pass.scope, "long option");
                pass.option_or_flag(name);
            }
            TokenKind::CombinedShort(letters) => {
                trace!(letters, scope = ?pass.scope, "combined short flags");
                for ch in letters.chars() {
                    pass.set_flag(&ch.to_string());
                }
            }
            TokenKind::Short(name) => {
                trace!(option = name, scope = ?pass.scope, "short option");
                pass.option_or_flag(name);
            }
            TokenKind::Sigil => {
                trace!(%token, "sigil command");
                if self.options.sigil_flips_scope {
                    pass.go_local();
                }
                pass.args.command = token;
            }
            TokenKind::Plain => {
                if pass.args.command.is_empty() {
                    trace!(%token, "command");
                    pass.args.command = token;
                    pass.go_local();
                } else if pass.args.subcommands.is_empty() {
                    trace!(%token, "subcommand");
                    pass.args.subcommands.push(token);
                } else {
                    trace!(%token, "positional");
                    pass.args.positionals.push(token);
                }
            }
        }
    }
}

/// Classifies `argv` (program first) with default options.
///
/// # Examples
///
/// ```
/// use rcli_core::parse_args;
///
/// let args = parse_args(["prog", "-abc"]);
/// assert_eq!(args.global_flags.len(), 3);
/// assert!(args.command.is_empty());
/// ```
pub fn parse_args<I, S>(argv: I) -> CliArgs
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Classifier::default().parse(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(token: &str) -> TokenKind<'_> {
        ClassifierOptions::default().token_kind(token)
    }

    fn tokens(raw: &[&str]) -> VecDeque<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_context_prefixes() {
        assert_eq!(kind("/ctx"), TokenKind::Context);
        assert_eq!(kind("?#room"), TokenKind::Context);
        assert_eq!(kind("?@user"), TokenKind::Context);
        assert_eq!(kind("??anything"), TokenKind::Context);
        assert_eq!(kind("?plain"), TokenKind::Plain);
    }

    #[test]
    fn test_context_wins_over_option_shapes() {
        let opts = ClassifierOptions {
            context_prefixes: vec!["--ctx".into()],
            sigil_flips_scope: false,
        };
        assert_eq!(opts.token_kind("--ctx=1"), TokenKind::Context);
    }

    #[test]
    fn test_long_with_value_splits_on_first_equals() {
        assert_eq!(
            kind("--define=a=b"),
            TokenKind::LongWithValue {
                name: "define",
                value: "a=b"
            }
        );
    }

    #[test]
    fn test_long_with_empty_value_is_plain() {
        assert_eq!(kind("--name="), TokenKind::Plain);
    }

    #[test]
    fn test_long_names_allow_hyphens_and_underscores() {
        assert_eq!(kind("--dry-run"), TokenKind::Long("dry-run"));
        assert_eq!(kind("--log_level"), TokenKind::Long("log_level"));
    }

    #[test]
    fn test_short_shapes() {
        assert_eq!(kind("-v"), TokenKind::Short("v"));
        assert_eq!(kind("-xzf"), TokenKind::CombinedShort("xzf"));
        assert_eq!(kind("-1"), TokenKind::Plain);
        assert_eq!(kind("-"), TokenKind::Plain);
        assert_eq!(kind("-a1"), TokenKind::Plain);
    }

    #[test]
    fn test_sigil_shapes() {
        assert_eq!(kind("@alias"), TokenKind::Sigil);
        assert_eq!(kind(":name"), TokenKind::Sigil);
        assert_eq!(kind("#42"), TokenKind::Sigil);
        assert_eq!(kind("@"), TokenKind::Plain);
    }

    #[test]
    fn test_take_value_skips_dash_tokens() {
        let args = parse_args(["prog", "--out", "-v"]);
        assert!(args.global_flags.contains("out"));
        assert!(args.global_flags.contains("v"));
        assert!(args.global_options.is_empty());
    }

    #[test]
    fn test_option_value_may_be_context_shaped() {
        let args = parse_args(["prog", "--root", "/tmp"]);
        assert_eq!(args.global_options.get("root"), Some("/tmp"));
        assert!(args.context_args.is_empty());
    }

    #[test]
    fn test_sigil_overwrites_existing_command() {
        let args = parse_args(["prog", "build", "@alias"]);
        assert_eq!(args.command, "@alias");
        assert!(args.subcommands.is_empty());
    }

    #[test]
    fn test_sigil_keeps_global_scope() {
        let (args, scope) = Classifier::default().classify_with_scope(
            "prog",
            tokens(&["@alias", "--fast"]),
        );
        assert_eq!(scope, Scope::Global);
        assert!(args.global_flags.contains("fast"));
        assert!(args.local_flags.is_empty());
    }

    #[test]
    fn test_sigil_flip_is_configurable() {
        let classifier = Classifier::new(ClassifierOptions::default().with_sigil_flips_scope(true));
        let (args, scope) = classifier.classify_with_scope("prog", tokens(&["@alias", "--fast"]));
        assert_eq!(scope, Scope::Local);
        assert!(args.local_flags.contains("fast"));
    }

    #[test]
    fn test_empty_argv() {
        let args = parse_args(Vec::<String>::new());
        assert_eq!(args, CliArgs::default());
    }

    #[test]
    fn test_program_only() {
        let (args, scope) = Classifier::default().classify_with_scope("prog", VecDeque::new());
        assert_eq!(args, CliArgs::new("prog"));
        assert_eq!(scope, Scope::Global);
    }
}
