//! Directory entries stored in list options
//!
//! Each line reads `"name" "directory" [active|inactive]`. Tokens may be
//! quoted or bare. A line without a directory yields an inactive entry with
//! no path rather than a guessed default.

use std::fmt;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub directory: Option<PathBuf>,
    pub active: bool,
}

impl DirectoryEntry {
    pub fn new(name: &str, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            directory: Some(directory.into()),
            active: true,
        }
    }

    /// Parse one list line. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let tokens = tokenize(line);
        let mut tokens = tokens.into_iter();
        let name = tokens.next()?;
        let directory = tokens.next().filter(|d| !d.is_empty()).map(PathBuf::from);
        let flag = tokens.next();

        if directory.is_none() {
            warn!("Directory entry '{}' has no directory; marking inactive", name);
        }

        let active = directory.is_some()
            && !matches!(flag.as_deref(), Some("inactive") | Some("false") | Some("0"));

        Some(Self {
            name,
            directory,
            active,
        })
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.active { "active" } else { "inactive" };
        match &self.directory {
            Some(dir) => write!(f, "\"{}\" \"{}\" {}", self.name, dir.display(), state),
            None => write!(f, "\"{}\"", self.name),
        }
    }
}

/// Interpret every non-blank line of a list value
pub fn parse_directory_entries(value: &str) -> Vec<DirectoryEntry> {
    value.lines().filter_map(DirectoryEntry::parse).collect()
}

/// Render entries back into a list value
pub fn format_directory_entries(entries: &[DirectoryEntry]) -> String {
    entries
        .iter()
        .map(DirectoryEntry::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.trim().chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let token: String = chars.by_ref().take_while(|&c| c != '"').collect();
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }

    tokens
}
