//! Built-in options and the schemas shipped with the binary

use crate::config::option::{ConfigOption, OptionKind};
use crate::config::section::Section;
use crate::config::spec::SectionGroupSpec;
use crate::types::Result;
use include_dir::{include_dir, Dir};
use tracing::{debug, warn};

// Embed the schemas directory at compile time
static SCHEMA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/schemas");

/// Marker section at the top of every file
pub const FORMAT_SECTION: &str = "[format]";

/// Free-text section following the marker section
pub const COMMENTS_SECTION: &str = "[comments]";

pub const CONFIG_TYPE_OPTION: &str = "config-type";
pub const VERSION_OPTION: &str = "version";

/// Section names a schema may not declare
pub const RESERVED_SECTIONS: [&str; 2] = [FORMAT_SECTION, COMMENTS_SECTION];

/// Build the `[format]` section carrying the config type and version
pub fn format_section(config_type: &str, version: u32) -> Result<Section> {
    let mut section = Section::new(
        FORMAT_SECTION,
        "Identifies the kind of file and the schema version it was written with.\n\
         Do not edit; an older version is upgraded on the next save.",
    );

    let options = [
        ConfigOption::new(CONFIG_TYPE_OPTION, OptionKind::String, config_type)
            .with_description("Kind of configuration file")
            .with_built_in(true),
        ConfigOption::new(VERSION_OPTION, OptionKind::Integer, &version.to_string())
            .with_description("Schema version")
            .with_built_in(true),
    ];
    for opt in options {
        section.add_option(opt)?;
    }

    Ok(section)
}

/// Specs embedded from `schemas/*.toml`. Files that fail to parse are
/// logged and skipped.
pub fn builtin_specs() -> Vec<SectionGroupSpec> {
    let mut specs = Vec::new();

    for file in SCHEMA_DIR.files() {
        let Some(file_name) = file.path().file_name() else {
            continue;
        };
        let file_name_str = file_name.to_string_lossy();
        if !file_name_str.ends_with(".toml") {
            continue;
        }

        let Some(content) = file.contents_utf8() else {
            warn!("Invalid UTF-8 in schema {}", file_name_str);
            continue;
        };

        match SectionGroupSpec::from_toml_str(content) {
            Ok(spec) => {
                debug!("Loaded schema {} for config type {}", file_name_str, spec.config_type);
                specs.push(spec);
            }
            Err(e) => {
                warn!("Failed to parse schema {}: {}", file_name_str, e);
            }
        }
    }

    specs.sort_by(|a, b| a.config_type.cmp(&b.config_type));
    specs
}
