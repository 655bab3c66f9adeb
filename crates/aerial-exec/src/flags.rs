//! Ordered command-line flag maps.

use std::ffi::OsString;

/// A single command-line flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    /// Boolean switch rendered as `--name`.
    Switch(String),
    /// Valued flag rendered as `--name value`.
    Value(String, OsString),
    /// Positional argument rendered as-is after all named flags.
    Positional(OsString),
}

/// How flag names are prefixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashStyle {
    /// `-x` for single-character names, `--name` otherwise.
    #[default]
    Gnu,
    /// `-name` for every flag, as poppler and X11 tools expect.
    Single,
}

/// Ordered set of flags for an external tool.
///
/// Named flags keep their insertion order and positionals are always
/// appended last, so `--headless --convert-to pdf input.docx` comes out the
/// same way regardless of when the input was added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    flags: Vec<Flag>,
    style: DashStyle,
}

impl Flags {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty flag set rendered with single dashes.
    pub fn single_dash() -> Self {
        Self {
            flags: Vec::new(),
            style: DashStyle::Single,
        }
    }

    /// Add a boolean switch.
    pub fn switch(mut self, name: impl Into<String>) -> Self {
        self.flags.push(Flag::Switch(name.into()));
        self
    }

    /// Add a flag with a value.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.flags.push(Flag::Value(name.into(), value.into()));
        self
    }

    /// Add a positional argument.
    pub fn positional(mut self, value: impl Into<OsString>) -> Self {
        self.flags.push(Flag::Positional(value.into()));
        self
    }

    /// Whether a named flag is present.
    pub fn contains(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| match flag {
            Flag::Switch(n) | Flag::Value(n, _) => n == name,
            Flag::Positional(_) => false,
        })
    }

    /// Get the value of a valued flag.
    pub fn get(&self, name: &str) -> Option<&OsString> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::Value(n, v) if n == name => Some(v),
            _ => None,
        })
    }

    /// Iterate over the flags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Render into command-line arguments.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.flags.len() * 2);
        let mut positionals = Vec::new();

        for flag in &self.flags {
            match flag {
                Flag::Switch(name) => args.push(self.dashed(name)),
                Flag::Value(name, value) => {
                    args.push(self.dashed(name));
                    args.push(value.clone());
                }
                Flag::Positional(value) => positionals.push(value.clone()),
            }
        }

        args.extend(positionals);
        args
    }

    fn dashed(&self, name: &str) -> OsString {
        match self.style {
            DashStyle::Gnu if name.chars().count() > 1 => OsString::from(format!("--{}", name)),
            _ => OsString::from(format!("-{}", name)),
        }
    }
}
