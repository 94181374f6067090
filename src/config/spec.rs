//! Declarative section-group specifications
//!
//! A `SectionGroupSpec` is the only way a `SectionGroup` gets built. Specs
//! are usually written in TOML and embedded from `schemas/`.

use crate::config::option::OptionKind;
use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionGroupSpec {
    pub config_type: String,
    #[serde(default)]
    pub version: u32,
    pub base_name: Option<String>,
    pub extension: Option<String>,
    pub directory: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionKind,
    #[serde(default)]
    pub default: String,
    pub cli_flag: Option<char>,
    #[serde(default)]
    pub cli_enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub built_in: bool,
}

fn default_true() -> bool {
    true
}

impl SectionGroupSpec {
    pub fn new(config_type: &str) -> Self {
        Self {
            config_type: config_type.to_string(),
            version: 0,
            base_name: None,
            extension: None,
            directory: None,
            active: true,
            comments: String::new(),
            sections: Vec::new(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_comments(mut self, comments: &str) -> Self {
        self.comments = comments.to_string();
        self
    }

    pub fn with_section(mut self, section: SectionSpec) -> Self {
        self.sections.push(section);
        self
    }
}

impl SectionSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }
}

impl OptionSpec {
    pub fn new(name: &str, kind: OptionKind, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: default.to_string(),
            cli_flag: None,
            cli_enabled: false,
            description: String::new(),
            built_in: false,
        }
    }

    /// Expose the option on the command line, optionally with a short flag
    pub fn cli(mut self, flag: Option<char>) -> Self {
        self.cli_flag = flag;
        self.cli_enabled = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}
