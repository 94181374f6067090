//! inireg - hierarchical multi-file INI configuration registry
//!
//! Applications declare several configuration files ("config types"), each
//! an ordered set of sections holding ordered, typed options. The registry
//! parses them from INI-style text, writes them back in schema order, and
//! exposes every option through `(config_type, section, option)`.

pub mod cli;
pub mod codec;
pub mod config;
pub mod types;

pub use cli::{CliKey, CliOverrides, OptionAddress};
pub use codec::{DirectoryEntry, IniReader, IniWriter, ParseReport};
pub use config::{
    ConfigOption, ConfigRegistry, OptionKind, OptionSpec, Section, SectionGroup, SectionGroupSpec,
    SectionSpec,
};
pub use types::ConfigError;
