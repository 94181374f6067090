//! Command-line override mapping
//!
//! Every CLI-enabled option is reachable by its long name, and by its short
//! flag when it has one. The mapping only resolves keys; tokenizing the
//! command line is left to the caller.

use crate::config::SectionGroup;
use crate::types::{ConfigError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The three-part key of an option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OptionAddress {
    pub config_type: String,
    pub section: String,
    pub option: String,
}

impl OptionAddress {
    pub fn new(config_type: &str, section: &str, option: &str) -> Self {
        Self {
            config_type: config_type.to_string(),
            section: section.to_string(),
            option: option.to_string(),
        }
    }
}

impl fmt::Display for OptionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.config_type, self.section, self.option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CliKey {
    Short(char),
    Long(String),
}

impl CliKey {
    /// Accepts `v`, `-v`, `name` or `--name`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (bare, long_form) = match text.strip_prefix("--") {
            Some(rest) => (rest, true),
            None => (text.strip_prefix('-').unwrap_or(text), false),
        };
        if bare.is_empty() || bare.starts_with('-') {
            return None;
        }

        let mut chars = bare.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !long_form => Some(CliKey::Short(c)),
            _ => Some(CliKey::Long(bare.to_string())),
        }
    }
}

impl fmt::Display for CliKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliKey::Short(c) => write!(f, "-{}", c),
            CliKey::Long(name) => write!(f, "--{}", name),
        }
    }
}

/// Split `key=value`. A bare key has no value.
pub fn parse_override(token: &str) -> Result<(CliKey, Option<String>)> {
    let (key, value) = match token.split_once('=') {
        Some((key, value)) => (key, Some(value.trim().to_string())),
        None => (token, None),
    };
    let key = CliKey::parse(key).ok_or_else(|| ConfigError::InvalidOverride(token.to_string()))?;
    Ok((key, value))
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    entries: BTreeMap<CliKey, OptionAddress>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Work out the full key set of `group`, without adding it.
    ///
    /// Fails on the first key already taken, either by another group or by
    /// another option of the same group. Keys the group itself holds from
    /// an earlier commit do not count as taken.
    pub fn plan(&self, group: &SectionGroup) -> Result<Vec<(CliKey, OptionAddress)>> {
        let mut planned: Vec<(CliKey, OptionAddress)> = Vec::new();

        for section in group.sections() {
            for opt in section.options().iter().filter(|o| o.cli_enabled()) {
                let address = OptionAddress::new(group.config_type(), section.name(), opt.name());

                let mut keys = vec![CliKey::Long(opt.name().to_string())];
                if let Some(flag) = opt.cli_flag() {
                    keys.push(CliKey::Short(flag));
                }

                for key in keys {
                    let existing = self
                        .entries
                        .get(&key)
                        .filter(|a| a.config_type != group.config_type())
                        .or_else(|| planned.iter().find(|(k, _)| *k == key).map(|(_, a)| a));
                    if let Some(existing) = existing {
                        return Err(collision(key, existing.clone(), address));
                    }
                    planned.push((key, address.clone()));
                }
            }
        }

        Ok(planned)
    }

    /// Replace every key of `config_type` with `planned`
    pub(crate) fn commit(&mut self, config_type: &str, planned: Vec<(CliKey, OptionAddress)>) {
        self.entries.retain(|_, a| a.config_type != config_type);
        self.entries.extend(planned);
    }

    /// A short key with no flag behind it falls back to the one-letter
    /// long name
    pub fn resolve(&self, key: &CliKey) -> Option<&OptionAddress> {
        self.entries.get(key).or_else(|| match key {
            CliKey::Short(c) => self.entries.get(&CliKey::Long(c.to_string())),
            CliKey::Long(_) => None,
        })
    }

    /// Resolve a key written as `v`, `-v`, `name` or `--name`
    pub fn lookup(&self, text: &str) -> Option<&OptionAddress> {
        CliKey::parse(text).and_then(|key| self.resolve(&key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CliKey, &OptionAddress)> {
        self.entries.iter()
    }

    /// Short flag mapped to the same option, if any
    pub fn short_flag_for(&self, address: &OptionAddress) -> Option<char> {
        self.entries.iter().find_map(|(key, a)| match key {
            CliKey::Short(c) if a == address => Some(*c),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collision(key: CliKey, existing: OptionAddress, claimant: OptionAddress) -> ConfigError {
    match key {
        CliKey::Short(flag) => ConfigError::CliFlagCollision {
            flag,
            existing,
            claimant,
        },
        CliKey::Long(name) => ConfigError::CliNameCollision {
            name,
            existing,
            claimant,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionKind, OptionSpec, SectionGroupSpec, SectionSpec};

    fn group(config_type: &str, sections: Vec<SectionSpec>) -> SectionGroup {
        let mut spec = SectionGroupSpec::new(config_type);
        for section in sections {
            spec = spec.with_section(section);
        }
        SectionGroup::from_spec(spec).unwrap()
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!(CliKey::parse("v"), Some(CliKey::Short('v')));
        assert_eq!(CliKey::parse("-v"), Some(CliKey::Short('v')));
        assert_eq!(CliKey::parse("--v"), Some(CliKey::Long("v".to_string())));
        assert_eq!(CliKey::parse("--verbose"), Some(CliKey::Long("verbose".to_string())));
        assert_eq!(CliKey::parse("verbose"), Some(CliKey::Long("verbose".to_string())));
        assert_eq!(CliKey::parse("-"), None);
        assert_eq!(CliKey::parse("---x"), None);
    }

    #[test]
    fn test_parse_override() {
        let (key, value) = parse_override("-v=true").unwrap();
        assert_eq!(key, CliKey::Short('v'));
        assert_eq!(value.as_deref(), Some("true"));

        let (key, value) = parse_override("--verbose").unwrap();
        assert_eq!(key, CliKey::Long("verbose".to_string()));
        assert_eq!(value, None);

        assert!(parse_override("=3").is_err());
    }

    #[test]
    fn test_plan_and_resolve() {
        let g = group(
            "rc",
            vec![SectionSpec::new("interaction", "")
                .with_option(OptionSpec::new("verbose", OptionKind::Boolean, "false").cli(Some('v')))
                .with_option(OptionSpec::new("quiet", OptionKind::Boolean, "false"))],
        );

        let mut overrides = CliOverrides::new();
        let planned = overrides.plan(&g).unwrap();
        assert_eq!(planned.len(), 2);
        overrides.commit("rc", planned);

        let address = OptionAddress::new("rc", "[interaction]", "verbose");
        assert_eq!(overrides.lookup("-v"), Some(&address));
        assert_eq!(overrides.lookup("--verbose"), Some(&address));
        assert_eq!(overrides.lookup("quiet"), None);
        assert_eq!(overrides.short_flag_for(&address), Some('v'));
    }

    #[test]
    fn test_flag_collision_within_group() {
        let g = group(
            "rc",
            vec![
                SectionSpec::new("one", "")
                    .with_option(OptionSpec::new("verbose", OptionKind::Boolean, "").cli(Some('v'))),
                SectionSpec::new("two", "")
                    .with_option(OptionSpec::new("version-check", OptionKind::Boolean, "").cli(Some('v'))),
            ],
        );

        let err = CliOverrides::new().plan(&g).unwrap_err();
        match err {
            ConfigError::CliFlagCollision { flag, existing, claimant } => {
                assert_eq!(flag, 'v');
                assert_eq!(existing.section, "[one]");
                assert_eq!(claimant.section, "[two]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_name_collision_across_groups() {
        let a = group(
            "rc",
            vec![SectionSpec::new("s", "").with_option(OptionSpec::new("theme", OptionKind::String, "").cli(None))],
        );
        let b = group(
            "usr",
            vec![SectionSpec::new("s", "").with_option(OptionSpec::new("theme", OptionKind::String, "").cli(None))],
        );

        let mut overrides = CliOverrides::new();
        let planned = overrides.plan(&a).unwrap();
        overrides.commit("rc", planned);
        assert!(matches!(
            overrides.plan(&b),
            Err(ConfigError::CliNameCollision { .. })
        ));
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_one_letter_name_without_flag() {
        let g = group(
            "rc",
            vec![SectionSpec::new("s", "").with_option(OptionSpec::new("b", OptionKind::Integer, "0").cli(None))],
        );
        let mut overrides = CliOverrides::new();
        let planned = overrides.plan(&g).unwrap();
        overrides.commit("rc", planned);

        let address = OptionAddress::new("rc", "[s]", "b");
        assert_eq!(overrides.lookup("b"), Some(&address));
        assert_eq!(overrides.lookup("-b"), Some(&address));
        assert_eq!(overrides.lookup("--b"), Some(&address));
    }

    #[test]
    fn test_replanning_own_keys() {
        let g = group(
            "rc",
            vec![SectionSpec::new("s", "")
                .with_option(OptionSpec::new("verbose", OptionKind::Boolean, "").cli(Some('v')))],
        );
        let mut overrides = CliOverrides::new();
        let planned = overrides.plan(&g).unwrap();
        overrides.commit("rc", planned);

        let planned = overrides.plan(&g).unwrap();
        assert_eq!(planned.len(), 2);
        overrides.commit("rc", planned);
        assert_eq!(overrides.len(), 2);
    }
}
