//! The configuration registry
//!
//! Owns every registered `SectionGroup`, keyed by config type, and resolves
//! the three-part key `(config_type, section, option)` no matter which file
//! an option lives in. Registration also feeds the command-line override
//! mapping.
//!
//! The registry is plain owned state mutated through `&mut self`. It is
//! meant to be built once at startup, with every group registered before the
//! first read or write, and used from a single thread. Wrap it in a `Mutex`
//! if it must be shared.

use crate::cli::{parse_override, CliKey, CliOverrides, OptionAddress};
use crate::codec::{IniReader, IniWriter, ParseReport};
use crate::config::defaults::builtin_specs;
use crate::config::option::{ConfigOption, OptionKind};
use crate::config::section::Section;
use crate::config::{SectionGroup, SectionGroupSpec, SectionSpec};
use crate::types::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

static INACTIVE_GROUP: SectionGroup = SectionGroup::inactive();

pub struct ConfigRegistry {
    home: PathBuf,
    groups: Vec<SectionGroup>,
    overrides: CliOverrides,
    errors: Vec<String>,
}

impl ConfigRegistry {
    /// Create an empty registry whose files live in the platform config
    /// directory under `app_name`
    pub fn new(app_name: &str) -> Self {
        let home = dirs::config_dir()
            .map(|dir| dir.join(app_name))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_home(home)
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        debug!("Config home: {}", home.display());
        Self {
            home,
            groups: Vec::new(),
            overrides: CliOverrides::new(),
            errors: Vec::new(),
        }
    }

    /// Directory used by groups that do not name their own
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Register a group built from `spec`.
    ///
    /// Fails without changing anything if the config type is empty or
    /// taken, the spec has duplicate names, or a CLI key is already claimed.
    pub fn register(&mut self, spec: SectionGroupSpec) -> Result<()> {
        let config_type = spec.config_type.clone();
        let result = self.try_register(spec);
        if let Err(e) = &result {
            error!("Cannot register config type '{}': {}", config_type, e);
        }
        self.track(result)
    }

    fn try_register(&mut self, spec: SectionGroupSpec) -> Result<()> {
        let config_type = spec.config_type.trim();
        if config_type.is_empty() {
            return Err(ConfigError::EmptyConfigType);
        }
        if self.group(config_type).is_some() {
            return Err(ConfigError::DuplicateConfigType(config_type.to_string()));
        }

        let mut group = SectionGroup::from_spec(spec)?;
        if group.directory().is_none() {
            group.set_directory(self.home.clone());
        }

        let planned = self.overrides.plan(&group)?;
        let flags = planned.len();
        self.overrides.commit(group.config_type(), planned);

        info!(
            "Registered config type '{}' ({} sections, {} command-line keys)",
            group.config_type(),
            group.sections().len(),
            flags
        );
        self.groups.push(group);
        Ok(())
    }

    /// Register every schema embedded in the binary
    pub fn register_builtin(&mut self) -> Result<()> {
        for spec in builtin_specs() {
            self.register(spec)?;
        }
        Ok(())
    }

    /// Add options to a registered group and map any new command-line keys.
    ///
    /// Nothing changes if the options clash with the group or a key is
    /// already claimed.
    pub fn add_options(&mut self, config_type: &str, spec: SectionSpec) -> Result<()> {
        let result = self.try_add_options(config_type, spec);
        self.track(result)
    }

    fn try_add_options(&mut self, config_type: &str, spec: SectionSpec) -> Result<()> {
        let mut updated = self
            .group(config_type)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownConfigType(config_type.to_string()))?;
        updated.add_options(spec)?;

        let planned = self.overrides.plan(&updated)?;
        self.overrides.commit(config_type, planned);
        if let Some(group) = self.group_mut(config_type) {
            *group = updated;
        }
        Ok(())
    }

    pub fn config_types(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(SectionGroup::config_type)
    }

    pub fn groups(&self) -> &[SectionGroup] {
        &self.groups
    }

    pub fn group(&self, config_type: &str) -> Option<&SectionGroup> {
        self.groups.iter().find(|g| g.config_type() == config_type)
    }

    pub fn group_mut(&mut self, config_type: &str) -> Option<&mut SectionGroup> {
        self.groups.iter_mut().find(|g| g.config_type() == config_type)
    }

    /// Group lookup returning the inactive placeholder on a miss.
    /// Check `active()` before use.
    pub fn find(&self, config_type: &str) -> &SectionGroup {
        self.group(config_type).unwrap_or(&INACTIVE_GROUP)
    }

    pub fn find_options(&self, config_type: &str, section: &str) -> &Section {
        self.find(config_type).find_options(section)
    }

    pub fn find_option_spec(&self, config_type: &str, section: &str, name: &str) -> &ConfigOption {
        self.find(config_type).find_option_spec(name, section)
    }

    pub fn option(&self, config_type: &str, section: &str, name: &str) -> Option<&ConfigOption> {
        self.group(config_type).and_then(|g| g.option(section, name))
    }

    pub fn option_mut(
        &mut self,
        config_type: &str,
        section: &str,
        name: &str,
    ) -> Option<&mut ConfigOption> {
        self.group_mut(config_type)
            .and_then(|g| g.option_mut(section, name))
    }

    /// Parse a file into the group for `config_type`.
    ///
    /// Without a file name the group's own path is used. A legacy file
    /// still loads but leaves the group modified and flagged legacy, so the
    /// next save upgrades it.
    pub fn read(&mut self, file_name: Option<&Path>, config_type: &str) -> Result<ParseReport> {
        let result = match self.group_mut(config_type) {
            None => Err(ConfigError::UnknownConfigType(config_type.to_string())),
            Some(group) => {
                let path = group.file_specification(file_name);
                let result = IniReader::new(&mut *group, path).parse();
                if matches!(&result, Ok(report) if report.legacy) {
                    group.set_legacy(true);
                    group.set_modified();
                }
                result
            }
        };
        self.track(result)
    }

    /// Write the group for `config_type`, returning the path written
    pub fn write(&mut self, file_name: Option<&Path>, config_type: &str) -> Result<PathBuf> {
        let result = match self.group_mut(config_type) {
            None => Err(ConfigError::UnknownConfigType(config_type.to_string())),
            Some(group) => {
                let path = group.file_specification(file_name);
                let written = IniWriter::new(&*group, path.clone()).write();
                written.map(|()| {
                    group.unmodify();
                    group.set_legacy(false);
                    path
                })
            }
        };
        self.track(result)
    }

    /// Read every active group from its own path.
    ///
    /// Missing files are skipped (first run); unreadable ones are recorded
    /// in `error_message` and skipped.
    pub fn read_all(&mut self) -> Vec<(String, ParseReport)> {
        let candidates: Vec<(String, PathBuf)> = self
            .groups
            .iter()
            .filter(|g| g.active())
            .map(|g| (g.config_type().to_string(), g.file_specification(None)))
            .collect();

        let mut reports = Vec::new();
        for (config_type, path) in candidates {
            if !path.exists() {
                info!("No {} file at {}; using defaults", config_type, path.display());
                continue;
            }
            if let Ok(report) = self.read(None, &config_type) {
                reports.push((config_type, report));
            }
        }
        reports
    }

    /// Write every active group
    pub fn write_all(&mut self) -> Result<Vec<PathBuf>> {
        self.write_where(|_| true)
    }

    /// Write only the active groups that changed since the last save
    pub fn write_modified(&mut self) -> Result<Vec<PathBuf>> {
        self.write_where(SectionGroup::modified)
    }

    fn write_where(&mut self, wanted: impl Fn(&SectionGroup) -> bool) -> Result<Vec<PathBuf>> {
        let targets: Vec<String> = self
            .groups
            .iter()
            .filter(|g| g.active() && wanted(*g))
            .map(|g| g.config_type().to_string())
            .collect();

        targets
            .iter()
            .map(|config_type| self.write(None, config_type))
            .collect()
    }

    pub fn value(&self, config_type: &str, section: &str, name: &str) -> &str {
        self.find_option_spec(config_type, section, name).value()
    }

    pub fn boolean_value(&self, config_type: &str, section: &str, name: &str) -> bool {
        self.find_option_spec(config_type, section, name).boolean_value()
    }

    pub fn integer_value(&self, config_type: &str, section: &str, name: &str) -> i64 {
        self.find_option_spec(config_type, section, name).integer_value()
    }

    pub fn floating_value(&self, config_type: &str, section: &str, name: &str) -> f64 {
        self.find_option_spec(config_type, section, name).floating_value()
    }

    /// Returns false if the option does not exist
    pub fn set_value(&mut self, config_type: &str, section: &str, name: &str, value: &str) -> bool {
        self.with_option(config_type, section, name, |opt| opt.set_value(value))
    }

    pub fn set_boolean_value(&mut self, config_type: &str, section: &str, name: &str, value: bool) -> bool {
        self.with_option(config_type, section, name, |opt| opt.set_boolean_value(value))
    }

    pub fn set_integer_value(&mut self, config_type: &str, section: &str, name: &str, value: i64) -> bool {
        self.with_option(config_type, section, name, |opt| opt.set_integer_value(value))
    }

    pub fn set_floating_value(&mut self, config_type: &str, section: &str, name: &str, value: f64) -> bool {
        self.with_option(config_type, section, name, |opt| opt.set_floating_value(value))
    }

    fn with_option(
        &mut self,
        config_type: &str,
        section: &str,
        name: &str,
        apply: impl FnOnce(&mut ConfigOption),
    ) -> bool {
        match self.option_mut(config_type, section, name) {
            Some(opt) => {
                apply(opt);
                true
            }
            None => false,
        }
    }

    pub fn overrides(&self) -> &CliOverrides {
        &self.overrides
    }

    /// Apply a `key=value` command-line override.
    ///
    /// A boolean option given without a value is set to `true`.
    pub fn apply_override(&mut self, token: &str) -> Result<OptionAddress> {
        let result = self.try_apply_override(token);
        self.track(result)
    }

    fn try_apply_override(&mut self, token: &str) -> Result<OptionAddress> {
        let invalid = || ConfigError::InvalidOverride(token.to_string());
        let (key, value) = parse_override(token)?;
        let address = self.overrides.resolve(&key).cloned().ok_or_else(invalid)?;

        let opt = self
            .option_mut(&address.config_type, &address.section, &address.option)
            .ok_or_else(invalid)?;
        let value = match value {
            Some(value) => value,
            None if opt.kind() == OptionKind::Boolean => "true".to_string(),
            None => return Err(invalid()),
        };

        opt.set_value(&value);
        debug!("Override {} = {}", address, opt.value());
        Ok(address)
    }

    /// One help line per command-line key: flags, location and current
    /// setting
    pub fn cli_help(&self) -> Vec<String> {
        self.overrides
            .iter()
            .filter_map(|(key, address)| match key {
                CliKey::Long(_) => Some((key, address)),
                CliKey::Short(_) => None,
            })
            .map(|(key, address)| {
                let section = self.find_options(&address.config_type, &address.section);
                let opt = section.find_option_spec(&address.option);
                let flags = match self.overrides.short_flag_for(address) {
                    Some(c) => format!("-{}, {} <{}>", c, key, opt.kind().value_hint()),
                    None => format!("    {} <{}>", key, opt.kind().value_hint()),
                };
                let mut line = format!(
                    "{:<28} {} {} {}",
                    flags,
                    address.config_type,
                    section.name(),
                    section.setting_line(&address.option).trim_end()
                );
                if !opt.description().is_empty() {
                    line.push_str(&format!("  # {}", opt.description().lines().next().unwrap_or("")));
                }
                line
            })
            .collect()
    }

    /// All failures recorded so far, one per line
    pub fn error_message(&self) -> String {
        self.errors.join("\n")
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.errors.push(e.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionSpec;
    use std::fs;

    fn rc_spec() -> SectionGroupSpec {
        SectionGroupSpec::new("rc")
            .with_version(2)
            .with_section(
                SectionSpec::new("S1", "")
                    .with_option(OptionSpec::new("a", OptionKind::Boolean, "true").cli(Some('a')))
                    .with_option(OptionSpec::new("b", OptionKind::Integer, "3").cli(None)),
            )
            .with_section(
                SectionSpec::new("S2", "")
                    .with_option(OptionSpec::new("c", OptionKind::String, "hello")),
            )
    }

    #[test]
    fn test_duplicate_config_type() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        registry.register(rc_spec()).unwrap();
        registry.set_integer_value("rc", "S1", "b", 9);

        let second = SectionGroupSpec::new("rc").with_section(SectionSpec::new("other", ""));
        assert!(matches!(
            registry.register(second),
            Err(ConfigError::DuplicateConfigType(_))
        ));
        assert_eq!(registry.groups().len(), 1);
        assert_eq!(registry.integer_value("rc", "S1", "b"), 9);
        assert!(!registry.find_options("rc", "other").active());
        assert!(registry.error_message().contains("already registered"));
    }

    #[test]
    fn test_empty_config_type() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        assert!(matches!(
            registry.register(SectionGroupSpec::new("")),
            Err(ConfigError::EmptyConfigType)
        ));
    }

    #[test]
    fn test_flag_collision_rejects_whole_group() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        registry.register(rc_spec()).unwrap();

        let usr = SectionGroupSpec::new("usr").with_section(
            SectionSpec::new("ui", "")
                .with_option(OptionSpec::new("theme", OptionKind::String, "").cli(Some('t')))
                .with_option(OptionSpec::new("autosave", OptionKind::Boolean, "").cli(Some('a'))),
        );
        assert!(matches!(
            registry.register(usr),
            Err(ConfigError::CliFlagCollision { flag: 'a', .. })
        ));
        assert!(registry.group("usr").is_none());
        assert!(registry.overrides().lookup("-t").is_none());
    }

    #[test]
    fn test_null_object_lookups() {
        let registry = ConfigRegistry::with_home("/tmp/inireg-test");
        assert!(!registry.find("unknown-type").active());
        assert!(!registry.find_options("unknown-type", "unknown-section").active());
        let opt = registry.find_option_spec("unknown-type", "unknown-section", "x");
        assert!(!opt.active());
        assert_eq!(opt.integer_value(), 0);
        assert!(!registry.boolean_value("unknown-type", "s", "x"));
        assert_eq!(registry.floating_value("unknown-type", "s", "x"), 0.0);
        assert_eq!(registry.value("unknown-type", "s", "x"), "");
    }

    #[test]
    fn test_typed_accessors() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        registry.register(rc_spec()).unwrap();
        assert!(registry.boolean_value("rc", "[S1]", "a"));
        assert_eq!(registry.value("rc", "S2", "c"), "hello");
        assert!(registry.set_floating_value("rc", "S2", "c", 1.5));
        assert_eq!(registry.floating_value("rc", "S2", "c"), 1.5);
        assert!(!registry.set_value("rc", "S2", "missing", "x"));
        assert!(!registry.set_boolean_value("zz", "S2", "c", true));
    }

    #[test]
    fn test_read_unknown_type_short_circuits() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        assert!(matches!(
            registry.read(None, "nope"),
            Err(ConfigError::UnknownConfigType(_))
        ));
        assert!(matches!(
            registry.write(None, "nope"),
            Err(ConfigError::UnknownConfigType(_))
        ));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ConfigRegistry::with_home(dir.path());
        registry.register(rc_spec()).unwrap();
        registry.set_integer_value("rc", "S1", "b", 42);

        let path = registry.write(None, "rc").unwrap();
        assert_eq!(path, dir.path().join("rc.rc"));
        assert!(!registry.find("rc").modified());

        let mut other = ConfigRegistry::with_home(dir.path());
        other.register(rc_spec()).unwrap();
        let report = other.read(None, "rc").unwrap();
        assert!(!report.legacy);
        assert_eq!(other.integer_value("rc", "S1", "b"), 42);
        assert!(!other.find("rc").modified());
    }

    #[test]
    fn test_legacy_file_marks_group() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rc.rc"), "[format]\nversion = 0\n\n[S1]\nb = 5\n").unwrap();

        let mut registry = ConfigRegistry::with_home(dir.path());
        registry.register(rc_spec()).unwrap();
        let report = registry.read(None, "rc").unwrap();

        assert!(report.legacy);
        assert!(registry.find("rc").is_legacy());
        assert!(registry.find("rc").modified());
        assert_eq!(registry.integer_value("rc", "S1", "b"), 5);

        let written = registry.write_modified().unwrap();
        assert_eq!(written.len(), 1);
        assert!(!registry.find("rc").is_legacy());
        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains("version = 2"));
    }

    #[test]
    fn test_read_all_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ConfigRegistry::with_home(dir.path());
        registry.register(rc_spec()).unwrap();
        assert!(registry.read_all().is_empty());
        assert!(registry.error_message().is_empty());

        registry.write_all().unwrap();
        let reports = registry.read_all();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "rc");
    }

    #[test]
    fn test_apply_override() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        registry.register(rc_spec()).unwrap();

        registry.apply_override("-a=false").unwrap();
        assert!(!registry.boolean_value("rc", "S1", "a"));
        registry.apply_override("a").unwrap();
        assert!(registry.boolean_value("rc", "S1", "a"));

        let address = registry.apply_override("--b=12").unwrap();
        assert_eq!(address, OptionAddress::new("rc", "[S1]", "b"));
        assert_eq!(registry.integer_value("rc", "S1", "b"), 12);

        registry.apply_override("b=7").unwrap();
        assert_eq!(registry.integer_value("rc", "S1", "b"), 7);
        registry.apply_override("-b=8").unwrap();
        assert_eq!(registry.integer_value("rc", "S1", "b"), 8);

        // Known key, but integers need a value
        assert!(matches!(
            registry.apply_override("b"),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert_eq!(registry.integer_value("rc", "S1", "b"), 8);
        assert!(registry.apply_override("--c=x").is_err());
    }

    #[test]
    fn test_add_options_maps_new_keys() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        registry.register(rc_spec()).unwrap();

        let extra = SectionSpec::new("S2", "")
            .with_option(OptionSpec::new("depth", OptionKind::Integer, "1").cli(Some('d')));
        registry.add_options("rc", extra).unwrap();
        registry.apply_override("-d=4").unwrap();
        assert_eq!(registry.integer_value("rc", "S2", "depth"), 4);
        assert_eq!(registry.overrides().lookup("-a"), Some(&OptionAddress::new("rc", "[S1]", "a")));

        let clash = SectionSpec::new("S3", "")
            .with_option(OptionSpec::new("all", OptionKind::Boolean, "").cli(Some('a')));
        assert!(matches!(
            registry.add_options("rc", clash),
            Err(ConfigError::CliFlagCollision { flag: 'a', .. })
        ));
        assert!(registry.group("rc").and_then(|g| g.section("S3")).is_none());

        assert!(matches!(
            registry.add_options("zz", SectionSpec::new("S1", "")),
            Err(ConfigError::UnknownConfigType(_))
        ));
    }

    #[test]
    fn test_cli_help_lists_long_names() {
        let mut registry = ConfigRegistry::with_home("/tmp/inireg-test");
        registry.register(rc_spec()).unwrap();
        let help = registry.cli_help();
        assert_eq!(help.len(), 2);
        assert!(help.iter().any(|l| l.starts_with("-a, --a") && l.contains("a = true")));
        assert!(help.iter().any(|l| l.contains("--b") && l.contains("b = 3")));
    }
}
