use crate::cli::OptionAddress;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config type must not be empty")]
    EmptyConfigType,

    #[error("Config type '{0}' is already registered")]
    DuplicateConfigType(String),

    #[error("Duplicate section {section} in config type '{config_type}'")]
    DuplicateSection { config_type: String, section: String },

    #[error("Section {section} is reserved in config type '{config_type}'")]
    ReservedSection { config_type: String, section: String },

    #[error("Duplicate option '{option}' in section {section}")]
    DuplicateOption { section: String, option: String },

    #[error("Command-line flag -{flag} is claimed by both {existing} and {claimant}")]
    CliFlagCollision {
        flag: char,
        existing: OptionAddress,
        claimant: OptionAddress,
    },

    #[error("Command-line option --{name} is claimed by both {existing} and {claimant}")]
    CliNameCollision {
        name: String,
        existing: OptionAddress,
        claimant: OptionAddress,
    },

    #[error("Unknown config type: {0}")]
    UnknownConfigType(String),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schema: {0}")]
    Schema(#[from] toml::de::Error),

    #[error("Invalid override '{0}'")]
    InvalidOverride(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
