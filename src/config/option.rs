//! A single named, typed configuration value
//!
//! Values are kept as canonical text and coerced on access. Hand-edited
//! files are allowed to be sloppy: a typed getter that cannot parse its
//! text returns `0`, `0.0` or `false` instead of failing.

use crate::codec::dirspec::{parse_directory_entries, DirectoryEntry};
use crate::config::section::bracketed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The value type of an option. Fixed when the option is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Boolean,
    Integer,
    Float,
    String,
    Filename,
    #[serde(alias = "list-marker")]
    List,
}

impl OptionKind {
    /// Placeholder shown for the value in help text
    pub fn value_hint(self) -> &'static str {
        match self {
            OptionKind::Boolean => "BOOL",
            OptionKind::Integer => "INT",
            OptionKind::Float => "FLOAT",
            OptionKind::String => "TEXT",
            OptionKind::Filename => "FILE",
            OptionKind::List => "LINES",
        }
    }

    /// Values of these kinds are written inside double quotes
    pub fn is_quoted(self) -> bool {
        matches!(self, OptionKind::String | OptionKind::Filename)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Boolean => "boolean",
            OptionKind::Integer => "integer",
            OptionKind::Float => "float",
            OptionKind::String => "string",
            OptionKind::Filename => "filename",
            OptionKind::List => "list",
        };
        f.write_str(name)
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(OptionKind::Boolean),
            "integer" | "int" => Ok(OptionKind::Integer),
            "float" | "double" => Ok(OptionKind::Float),
            "string" => Ok(OptionKind::String),
            "filename" => Ok(OptionKind::Filename),
            "list" | "list-marker" => Ok(OptionKind::List),
            other => Err(format!("unknown option kind '{}'", other)),
        }
    }
}

/// Parse boolean text leniently. Unrecognised text is `false`.
pub fn parse_boolean(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Parse integer text, falling back to `0`.
pub fn parse_integer(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

/// Parse float text, falling back to `0.0`.
pub fn parse_floating(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Rewrite `text` into the canonical encoding for `kind`.
///
/// Scalar values occupy one line of the file, so line breaks in string
/// and filename values are folded into single spaces.
pub fn canonical(kind: OptionKind, text: &str) -> String {
    match kind {
        OptionKind::Boolean => parse_boolean(text).to_string(),
        OptionKind::Integer => parse_integer(text).to_string(),
        OptionKind::Float => parse_floating(text).to_string(),
        OptionKind::String | OptionKind::Filename => text.lines().collect::<Vec<_>>().join(" "),
        OptionKind::List => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    name: String,
    kind: OptionKind,
    default_value: String,
    current_value: String,
    cli_flag: Option<char>,
    cli_enabled: bool,
    modified: bool,
    description: String,
    built_in: bool,
    active: bool,
}

impl ConfigOption {
    /// Create an option whose current value starts at its default.
    /// List options name their block, so their names are bracketed.
    pub fn new(name: &str, kind: OptionKind, default_value: &str) -> Self {
        let default_value = canonical(kind, default_value);
        let name = match kind {
            OptionKind::List => bracketed(name),
            _ => name.trim().to_string(),
        };
        Self {
            name,
            kind,
            current_value: default_value.clone(),
            default_value,
            cli_flag: None,
            cli_enabled: false,
            modified: false,
            description: String::new(),
            built_in: false,
            active: true,
        }
    }

    /// The shared placeholder handed out when a lookup misses
    pub(crate) const fn inactive() -> Self {
        Self {
            name: String::new(),
            kind: OptionKind::String,
            default_value: String::new(),
            current_value: String::new(),
            cli_flag: None,
            cli_enabled: false,
            modified: false,
            description: String::new(),
            built_in: false,
            active: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_cli(mut self, flag: Option<char>, enabled: bool) -> Self {
        self.cli_flag = flag;
        self.cli_enabled = enabled;
        self
    }

    pub fn with_built_in(mut self, built_in: bool) -> Self {
        self.built_in = built_in;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn cli_flag(&self) -> Option<char> {
        self.cli_flag
    }

    pub fn cli_enabled(&self) -> bool {
        self.cli_enabled
    }

    pub fn built_in(&self) -> bool {
        self.built_in
    }

    /// False only for the lookup-miss placeholder
    pub fn active(&self) -> bool {
        self.active
    }

    pub fn modified(&self) -> bool {
        self.modified
    }

    pub fn unmodify(&mut self) {
        self.modified = false;
    }

    /// True for options spanning a multi-line block instead of one line
    pub fn is_list(&self) -> bool {
        self.kind == OptionKind::List
    }

    pub fn value(&self) -> &str {
        &self.current_value
    }

    pub fn set_value(&mut self, value: &str) {
        self.current_value = canonical(self.kind, value);
        self.modified = true;
    }

    /// Store text read from a file. Does not mark the option modified.
    pub(crate) fn load(&mut self, value: &str) {
        self.current_value = value.to_string();
    }

    pub fn reset(&mut self) {
        self.current_value = self.default_value.clone();
        self.modified = true;
    }

    pub fn boolean_value(&self) -> bool {
        parse_boolean(&self.current_value)
    }

    pub fn set_boolean_value(&mut self, value: bool) {
        self.set_value(&value.to_string());
    }

    pub fn integer_value(&self) -> i64 {
        parse_integer(&self.current_value)
    }

    pub fn set_integer_value(&mut self, value: i64) {
        self.set_value(&value.to_string());
    }

    pub fn floating_value(&self) -> f64 {
        parse_floating(&self.current_value)
    }

    pub fn set_floating_value(&mut self, value: f64) {
        self.set_value(&value.to_string());
    }

    /// Lines of a list option, blank lines dropped
    pub fn list_items(&self) -> Vec<&str> {
        self.current_value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn set_list_items<S: AsRef<str>>(&mut self, items: &[S]) {
        let joined = items
            .iter()
            .map(|item| item.as_ref().trim())
            .collect::<Vec<_>>()
            .join("\n");
        self.set_value(&joined);
    }

    /// Interpret each list line as a directory entry
    pub fn directory_entries(&self) -> Vec<DirectoryEntry> {
        parse_directory_entries(&self.current_value)
    }

    /// The value as it appears on the right of `=` in a file
    pub fn encoded_value(&self) -> String {
        if self.kind.is_quoted() {
            format!("\"{}\"", self.current_value)
        } else {
            self.current_value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_integer_reads_zero() {
        let mut opt = ConfigOption::new("count", OptionKind::Integer, "3");
        opt.load("not-a-number");
        assert_eq!(opt.integer_value(), 0);
        assert!(!opt.modified());
    }

    #[test]
    fn test_setters_canonicalise_and_mark_modified() {
        let mut opt = ConfigOption::new("ratio", OptionKind::Float, "1.5");
        assert!(!opt.modified());
        opt.set_floating_value(2.25);
        assert_eq!(opt.value(), "2.25");
        assert!(opt.modified());

        let mut flag = ConfigOption::new("verbose", OptionKind::Boolean, "no");
        assert_eq!(flag.default_value(), "false");
        flag.set_value("ON");
        assert_eq!(flag.value(), "true");
        assert!(flag.boolean_value());
    }

    #[test]
    fn test_modified_stays_until_unmodify() {
        let mut opt = ConfigOption::new("name", OptionKind::String, "a");
        opt.set_value("b");
        opt.load("c");
        assert!(opt.modified());
        opt.unmodify();
        assert!(!opt.modified());
        opt.reset();
        assert_eq!(opt.value(), "a");
        assert!(opt.modified());
    }

    #[test]
    fn test_inactive_defaults() {
        let opt = ConfigOption::inactive();
        assert!(!opt.active());
        assert_eq!(opt.integer_value(), 0);
        assert_eq!(opt.floating_value(), 0.0);
        assert!(!opt.boolean_value());
        assert_eq!(opt.value(), "");
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(parse_boolean("Yes"));
        assert!(parse_boolean(" 1 "));
        assert!(!parse_boolean("maybe"));
        assert!(!parse_boolean(""));
    }

    #[test]
    fn test_list_items_and_encoding() {
        let mut opt = ConfigOption::new("recent-files", OptionKind::List, "");
        assert_eq!(opt.name(), "[recent-files]");
        opt.set_list_items(&["a.txt", " b.txt ", ""]);
        assert_eq!(opt.list_items(), vec!["a.txt", "b.txt"]);
        assert!(opt.is_list());

        let file = ConfigOption::new("log-file", OptionKind::Filename, "out.log");
        assert_eq!(file.encoded_value(), "\"out.log\"");
    }

    #[test]
    fn test_scalar_text_is_single_line() {
        let mut opt = ConfigOption::new("title", OptionKind::String, "one\ntwo");
        assert_eq!(opt.default_value(), "one two");
        opt.set_value("a\r\nb\n");
        assert_eq!(opt.value(), "a b");
        assert_eq!(opt.encoded_value(), "\"a b\"");

        let mut list = ConfigOption::new("items", OptionKind::List, "");
        list.set_value("a\nb");
        assert_eq!(list.list_items(), vec!["a", "b"]);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("list-marker".parse::<OptionKind>(), Ok(OptionKind::List));
        assert_eq!("INT".parse::<OptionKind>(), Ok(OptionKind::Integer));
        assert!("complex".parse::<OptionKind>().is_err());
    }
}
