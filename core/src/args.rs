//! Command record produced by the classifier.
//!
//! [`CliArgs`] is a plain data record: the classifier fills it in a single
//! pass and nothing mutates it afterwards. Option values live in an
//! [`OptionMap`], which keeps encounter order and accumulates repeated
//! options into a comma-separated value.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Separator used when an option is given more than once in the same scope.
pub const VALUE_SEPARATOR: char = ',';

/// Insertion-ordered option map with comma accumulation.
///
/// # Examples
///
/// ```
/// use rcli_core::OptionMap;
///
/// let mut opts = OptionMap::new();
/// opts.set("tag", "a");
/// opts.set("target", "release");
/// opts.set("tag", "b");
///
/// assert_eq!(opts.get("tag"), Some("a,b"));
/// assert_eq!(opts.names().collect::<Vec<_>>(), vec!["tag", "target"]);
/// assert_eq!(opts.values("tag"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, String)>,
}

impl OptionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`.
    ///
    /// If `name` is already present the new value is appended to the
    /// existing one, joined by [`VALUE_SEPARATOR`].
    pub fn set(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into();
        let value = value.as_ref();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                existing.push(VALUE_SEPARATOR);
                existing.push_str(value);
            }
            None => self.entries.push((name, value.to_string())),
        }
    }

    /// Returns the accumulated value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the individual values recorded for `name`, in encounter order.
    ///
    /// Values that themselves contained a comma cannot be told apart from
    /// repeated occurrences.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|v| v.split(VALUE_SEPARATOR).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `name` has been set.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Option names in first-encounter order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionMapVisitor;

        impl<'de> Visitor<'de> for OptionMapVisitor {
            type Value = OptionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of option names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OptionMap, A::Error> {
                let mut map = OptionMap::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    map.set(name, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OptionMapVisitor)
    }
}

/// Structured result of classifying one argument vector.
///
/// # Examples
///
/// ```
/// use rcli_core::parse_args;
///
/// let args = parse_args(["prog", "-vq", "build", "--target=release", "debug", "main.c"]);
/// assert_eq!(args.program, "prog");
/// assert!(args.global_flags.contains("v"));
/// assert_eq!(args.command, "build");
/// assert_eq!(args.local_options.get("target"), Some("release"));
/// assert_eq!(args.subcommands, vec!["debug"]);
/// assert_eq!(args.positionals, vec!["main.c"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliArgs {
    /// First token of the argument vector.
    pub program: String,
    /// Options seen while still in global scope.
    pub global_options: OptionMap,
    /// Flags seen while still in global scope.
    pub global_flags: BTreeSet<String>,
    /// Command name; empty when none was given.
    pub command: String,
    /// At most one entry: the first plain token after the command.
    pub subcommands: Vec<String>,
    /// Options seen in local scope.
    pub local_options: OptionMap,
    /// Flags seen in local scope.
    pub local_flags: BTreeSet<String>,
    /// Remaining plain tokens.
    pub positionals: Vec<String>,
    /// Context tokens, prefix retained.
    pub context_args: Vec<String>,
}

impl CliArgs {
    /// Creates an empty record for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Returns `true` once a command has been assigned.
    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }

    /// The subcommand, if one was given.
    pub fn subcommand(&self) -> Option<&str> {
        self.subcommands.first().map(String::as_str)
    }

    /// The first context token, used as the handler context.
    pub fn context(&self) -> Option<&str> {
        self.context_args.first().map(String::as_str)
    }

    /// Looks up an option in local scope first, then global scope.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.local_options
            .get(name)
            .or_else(|| self.global_options.get(name))
    }

    /// Returns `true` if `name` was given as a flag in either scope.
    pub fn has_flag(&self, name: &str) -> bool {
        self.local_flags.contains(name) || self.global_flags.contains(name)
    }
}
