//! Schema and live values for one config type
//!
//! A `SectionGroup` corresponds to one physical file. Its sections are
//! kept in declaration order, which is also the order they are written in.

use crate::config::defaults::{format_section, RESERVED_SECTIONS};
use crate::config::option::ConfigOption;
use crate::config::section::{bracketed, Section};
use crate::config::spec::{SectionGroupSpec, SectionSpec};
use crate::types::{ConfigError, Result};
use path_clean::PathClean;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

static INACTIVE_SECTION: Section = Section::inactive();
static INACTIVE_OPTION: ConfigOption = ConfigOption::inactive();

/// Text of the `[comments]` section.
///
/// `is_set` tells "never assigned" apart from "explicitly cleared".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentBlock {
    text: String,
    set: bool,
}

impl CommentBlock {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            set: false,
        }
    }

    const fn empty() -> Self {
        Self {
            text: String::new(),
            set: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.set = true;
    }

    pub fn clear(&mut self) {
        self.set("");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup {
    config_type: String,
    sections: Vec<Section>,
    ordinal_version: u32,
    comments: CommentBlock,
    directory: Option<PathBuf>,
    base_name: String,
    extension: String,
    active: bool,
    modified: bool,
    legacy: bool,
}

impl SectionGroup {
    /// Build a group from its declarative spec.
    ///
    /// A `[format]` section holding the built-in options is always placed
    /// first. A declared `[format]` or `[comments]` section, a duplicate
    /// section name, or a duplicate option name within a section rejects
    /// the whole spec.
    pub fn from_spec(spec: SectionGroupSpec) -> Result<Self> {
        let config_type = spec.config_type.trim().to_string();
        if config_type.is_empty() {
            return Err(ConfigError::EmptyConfigType);
        }

        let mut seen = HashSet::new();
        for section in &spec.sections {
            let name = bracketed(&section.name);
            reject_reserved(&config_type, &name)?;
            if !seen.insert(name.clone()) {
                return Err(ConfigError::DuplicateSection {
                    config_type: config_type.clone(),
                    section: name,
                });
            }
        }

        let mut sections = vec![format_section(&config_type, spec.version)?];
        for section_spec in spec.sections {
            sections.push(build_section(section_spec)?);
        }

        debug!(
            "Built section group '{}' with {} sections",
            config_type,
            sections.len()
        );

        Ok(Self {
            base_name: spec.base_name.unwrap_or_else(|| config_type.clone()),
            extension: spec.extension.unwrap_or_else(|| config_type.clone()),
            config_type,
            sections,
            ordinal_version: spec.version,
            comments: CommentBlock::new(&spec.comments),
            directory: spec.directory,
            active: spec.active,
            modified: false,
            legacy: false,
        })
    }

    pub(crate) const fn inactive() -> Self {
        Self {
            config_type: String::new(),
            sections: Vec::new(),
            ordinal_version: 0,
            comments: CommentBlock::empty(),
            directory: None,
            base_name: String::new(),
            extension: String::new(),
            active: false,
            modified: false,
            legacy: false,
        }
    }

    pub fn config_type(&self) -> &str {
        &self.config_type
    }

    pub fn ordinal_version(&self) -> u32 {
        self.ordinal_version
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub(crate) fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.iter_mut()
    }

    pub fn comments(&self) -> &CommentBlock {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut CommentBlock {
        &mut self.comments
    }

    /// Add options to a section, creating it at the end if absent.
    ///
    /// Nothing is added if any name collides with an existing option of
    /// the target section or repeats within `spec`, or if the target is
    /// `[format]` or `[comments]`.
    ///
    /// Options added here on a registered group are not reachable from the
    /// command line; `ConfigRegistry::add_options` also maps their keys.
    pub fn add_options(&mut self, spec: SectionSpec) -> Result<()> {
        let name = bracketed(&spec.name);
        reject_reserved(&self.config_type, &name)?;
        let built = build_section(spec)?;

        match self.sections.iter_mut().find(|s| s.name() == name) {
            Some(existing) => {
                if let Some(clash) = built.options().iter().find(|o| existing.contains(o.name())) {
                    return Err(ConfigError::DuplicateOption {
                        section: name,
                        option: clash.name().to_string(),
                    });
                }
                for opt in built.options() {
                    existing.add_option(opt.clone())?;
                }
            }
            None => self.sections.push(built),
        }
        Ok(())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        let name = bracketed(name);
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        let name = bracketed(name);
        self.sections.iter_mut().find(|s| s.name() == name)
    }

    pub fn option(&self, section: &str, name: &str) -> Option<&ConfigOption> {
        self.section(section).and_then(|s| s.option(name))
    }

    pub fn option_mut(&mut self, section: &str, name: &str) -> Option<&mut ConfigOption> {
        self.section_mut(section).and_then(|s| s.option_mut(name))
    }

    /// Section lookup returning the inactive placeholder on a miss
    pub fn find_inisection(&self, name: &str) -> &Section {
        self.section(name).unwrap_or(&INACTIVE_SECTION)
    }

    /// The option container of a section; same miss contract as
    /// [`find_inisection`](Self::find_inisection)
    pub fn find_options(&self, section_name: &str) -> &Section {
        self.find_inisection(section_name)
    }

    pub fn find_option_spec(&self, option_name: &str, section_name: &str) -> &ConfigOption {
        self.option(section_name, option_name)
            .unwrap_or(&INACTIVE_OPTION)
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = Some(directory.into());
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Physical path of the file.
    ///
    /// With no name, the path is `<directory>/<base_name>.<extension>`.
    /// A supplied bare file name is placed in the directory and given the
    /// extension if it has none; a name with its own directory part is
    /// used as given.
    pub fn file_specification(&self, name: Option<&Path>) -> PathBuf {
        let directory = self.directory.clone().unwrap_or_else(|| PathBuf::from("."));

        let path = match name {
            None if self.extension.is_empty() => directory.join(&self.base_name),
            None => directory.join(format!("{}.{}", self.base_name, self.extension)),
            Some(name) => {
                let mut path = if name.is_absolute() || has_directory_part(name) {
                    name.to_path_buf()
                } else {
                    directory.join(name)
                };
                if path.extension().is_none() && !self.extension.is_empty() {
                    path.set_extension(&self.extension);
                }
                path
            }
        };

        path.clean()
    }

    /// True if the group itself or any option has been changed
    pub fn modified(&self) -> bool {
        self.modified || self.sections.iter().any(Section::modified)
    }

    pub fn set_modified(&mut self) {
        self.modified = true;
    }

    pub fn unmodify(&mut self) {
        self.modified = false;
        self.sections.iter_mut().for_each(Section::unmodify);
    }

    /// True after reading a file older than this schema, until the next
    /// successful save
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    pub(crate) fn set_legacy(&mut self, legacy: bool) {
        self.legacy = legacy;
    }
}

fn reject_reserved(config_type: &str, section: &str) -> Result<()> {
    if RESERVED_SECTIONS.contains(&section) {
        return Err(ConfigError::ReservedSection {
            config_type: config_type.to_string(),
            section: section.to_string(),
        });
    }
    Ok(())
}

fn has_directory_part(path: &Path) -> bool {
    path.parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty())
}

fn build_section(spec: SectionSpec) -> Result<Section> {
    let mut section = Section::new(&spec.name, &spec.description);
    for opt in spec.options {
        let option = ConfigOption::new(&opt.name, opt.kind, &opt.default)
            .with_description(&opt.description)
            .with_cli(opt.cli_flag, opt.cli_enabled)
            .with_built_in(opt.built_in);
        section.add_option(option)?;
    }
    Ok(section)
}
