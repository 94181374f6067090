//! Parse a file into a section group's live values

use crate::codec::document::{unescape_line, IniDocument};
use crate::codec::file_error;
use crate::config::defaults::{COMMENTS_SECTION, CONFIG_TYPE_OPTION, FORMAT_SECTION, VERSION_OPTION};
use crate::config::SectionGroup;
use crate::types::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a parse found besides the option values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// Version written in the file, if any
    pub file_version: Option<i64>,
    /// File is missing its version or predates the schema
    pub legacy: bool,
    /// Declared sections with no header in the file
    pub missing_sections: Vec<String>,
}

pub struct IniReader<'a> {
    group: &'a mut SectionGroup,
    path: PathBuf,
}

impl<'a> IniReader<'a> {
    pub fn new(group: &'a mut SectionGroup, path: impl Into<PathBuf>) -> Self {
        Self {
            group,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the bound file. An unreadable file is reported, not fatal.
    pub fn parse(&mut self) -> Result<ParseReport> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            file_error("Cannot open for reading", &self.path);
            ConfigError::Read {
                path: self.path.clone(),
                source: e,
            }
        })?;

        info!("Reading {} file {}", self.group.config_type(), self.path.display());
        Ok(self.parse_str(&content))
    }

    /// Load values from text.
    ///
    /// Sections and options are visited in declared order and looked up by
    /// name, so a file with reordered or missing blocks still loads. Absent
    /// lines leave the current value alone. The `[format]` options are never
    /// loaded; they describe the schema, not the file.
    pub fn parse_str(&mut self, content: &str) -> ParseReport {
        let doc = IniDocument::parse(content);
        let mut report = ParseReport::default();

        self.check_format(&doc, &mut report);

        if let Some(block) = doc.block(COMMENTS_SECTION) {
            self.group.comments_mut().set(&block.text());
        }

        for section in self.group.sections_mut() {
            if section.name() == FORMAT_SECTION {
                continue;
            }
            let section_block = doc.block(section.name());
            if section_block.is_none() {
                report.missing_sections.push(section.name().to_string());
            }

            let section_name = section.name().to_string();
            let scalar_names: Vec<String> = section
                .options()
                .iter()
                .filter(|opt| !opt.is_list())
                .map(|opt| opt.name().to_string())
                .collect();

            for opt in section.options_mut() {
                if opt.is_list() {
                    // A list sharing its section's header also shares the
                    // block with the section's scalar settings
                    let shared = opt.name() == section_name;
                    let block = if shared {
                        section_block
                    } else {
                        doc.block(opt.name())
                    };
                    if let Some(block) = block {
                        let items: Vec<&str> = block
                            .entries()
                            .filter(|line| !(shared && is_setting_of(line, &scalar_names)))
                            .map(|line| unescape_line(line).trim())
                            .collect();
                        opt.load(&items.join("\n"));
                    }
                } else if let Some(value) = section_block.and_then(|b| b.setting(opt.name())) {
                    opt.load(value);
                }
            }
        }

        if !report.missing_sections.is_empty() {
            debug!(
                "Sections not found in {}: {}",
                self.path.display(),
                report.missing_sections.join(", ")
            );
        }

        report
    }

    fn check_format(&self, doc: &IniDocument, report: &mut ParseReport) {
        let format = doc.block(FORMAT_SECTION);

        if let Some(found) = format.and_then(|b| b.setting(CONFIG_TYPE_OPTION)) {
            if found != self.group.config_type() {
                warn!(
                    "{} declares config type '{}', expected '{}'",
                    self.path.display(),
                    found,
                    self.group.config_type()
                );
            }
        }

        // Unparseable version text counts as absent
        report.file_version = format
            .and_then(|b| b.setting(VERSION_OPTION))
            .and_then(|v| v.trim().parse::<i64>().ok());

        let expected = i64::from(self.group.ordinal_version());
        report.legacy = match report.file_version {
            Some(version) => version < expected,
            None => true,
        };

        if report.legacy {
            warn!(
                "{} is a legacy file (version {:?}, schema {}); it will be upgraded on save",
                self.path.display(),
                report.file_version,
                expected
            );
        }
    }
}

fn is_setting_of(line: &str, names: &[String]) -> bool {
    line.split_once('=')
        .is_some_and(|(key, _)| names.iter().any(|name| name == key.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionKind, OptionSpec, SectionGroupSpec, SectionSpec};

    fn group() -> SectionGroup {
        SectionGroup::from_spec(
            SectionGroupSpec::new("rc")
                .with_version(2)
                .with_comments("default comment")
                .with_section(
                    SectionSpec::new("S1", "")
                        .with_option(OptionSpec::new("a", OptionKind::Boolean, "false"))
                        .with_option(OptionSpec::new("b", OptionKind::Integer, "7")),
                )
                .with_section(
                    SectionSpec::new("S2", "")
                        .with_option(OptionSpec::new("c", OptionKind::String, ""))
                        .with_option(OptionSpec::new("[files]", OptionKind::List, "")),
                )
                .with_section(
                    SectionSpec::new("paths", "")
                        .with_option(OptionSpec::new("depth", OptionKind::Integer, "1"))
                        .with_option(OptionSpec::new("[paths]", OptionKind::List, "")),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_reordered_file_loads() {
        let mut g = group();
        let text = "\
[paths]
depth = 4
/a
/b

[S2]
c = \"hello\"

[files]
one.txt
two.txt

[S1]
b = 3
a = true

[format]
config-type = \"rc\"
version = 2
";
        let report = IniReader::new(&mut g, "test.rc").parse_str(text);
        assert!(!report.legacy);
        assert_eq!(report.file_version, Some(2));
        assert!(report.missing_sections.is_empty());

        assert!(g.find_option_spec("a", "S1").boolean_value());
        assert_eq!(g.find_option_spec("b", "S1").integer_value(), 3);
        assert_eq!(g.find_option_spec("c", "S2").value(), "hello");
        assert_eq!(g.find_option_spec("[files]", "S2").list_items(), vec!["one.txt", "two.txt"]);
        assert_eq!(g.find_option_spec("[paths]", "paths").list_items(), vec!["/a", "/b"]);
        assert_eq!(g.find_option_spec("depth", "paths").integer_value(), 4);
        assert!(!g.modified());
    }

    #[test]
    fn test_missing_lines_keep_defaults() {
        let mut g = group();
        let report = IniReader::new(&mut g, "x.rc").parse_str("[format]\nversion = 2\n[S1]\na = true\n");
        assert_eq!(g.find_option_spec("b", "S1").integer_value(), 7);
        assert_eq!(report.missing_sections, vec!["[S2]".to_string(), "[paths]".to_string()]);
        assert!(!g.comments().is_set());
    }

    #[test]
    fn test_bad_number_is_tolerated() {
        let mut g = group();
        IniReader::new(&mut g, "x.rc").parse_str("[format]\nversion = 2\n[S1]\nb = not-a-number\n");
        let b = g.find_option_spec("b", "S1");
        assert_eq!(b.integer_value(), 0);
        assert!(!b.modified());
    }

    #[test]
    fn test_legacy_detection() {
        let mut g = group();
        let report = IniReader::new(&mut g, "x.rc").parse_str("[S1]\na = true\n");
        assert!(report.legacy);
        assert_eq!(report.file_version, None);

        let report = IniReader::new(&mut g, "x.rc").parse_str("[format]\nversion = 0\n");
        assert!(report.legacy);
        assert_eq!(report.file_version, Some(0));

        let report = IniReader::new(&mut g, "x.rc").parse_str("[format]\nversion = 5\n");
        assert!(!report.legacy);
    }

    #[test]
    fn test_built_in_options_not_loaded() {
        let mut g = group();
        IniReader::new(&mut g, "x.rc").parse_str("[format]\nconfig-type = \"usr\"\nversion = 1\n");
        assert_eq!(g.find_option_spec(VERSION_OPTION, FORMAT_SECTION).integer_value(), 2);
        assert_eq!(g.find_option_spec(CONFIG_TYPE_OPTION, FORMAT_SECTION).value(), "rc");
    }

    #[test]
    fn test_built_in_flag_outside_format_still_loads() {
        let mut spec = OptionSpec::new("x", OptionKind::Integer, "1");
        spec.built_in = true;
        let mut g = SectionGroup::from_spec(
            SectionGroupSpec::new("rc")
                .with_version(2)
                .with_section(SectionSpec::new("S1", "").with_option(spec)),
        )
        .unwrap();
        IniReader::new(&mut g, "x.rc").parse_str("[format]\nversion = 2\n[S1]\nx = 5\n");
        assert_eq!(g.find_option_spec("x", "S1").integer_value(), 5);
    }

    #[test]
    fn test_comments_loaded() {
        let mut g = group();
        IniReader::new(&mut g, "x.rc").parse_str("[comments]\n\nhand written\n\n[S1]\n");
        assert!(g.comments().is_set());
        assert_eq!(g.comments().text(), "hand written");
    }

    #[test]
    fn test_unreadable_file() {
        let mut g = group();
        let result = IniReader::new(&mut g, "/nonexistent/dir/x.rc").parse();
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
