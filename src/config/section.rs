//! An ordered, uniquely named collection of options

use crate::codec::document::{escape_line, force_escape};
use crate::config::option::ConfigOption;
use crate::types::{ConfigError, Result};

static INACTIVE_OPTION: ConfigOption = ConfigOption::inactive();

/// Wrap a section name in brackets unless it already has them
pub fn bracketed(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('[') && name.ends_with(']') {
        name.to_string()
    } else {
        format!("[{}]", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    description: String,
    options: Vec<ConfigOption>,
    active: bool,
}

impl Section {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: bracketed(name),
            description: description.to_string(),
            options: Vec::new(),
            active: true,
        }
    }

    pub(crate) const fn inactive() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            options: Vec::new(),
            active: false,
        }
    }

    /// Header text including brackets, e.g. `[rc]`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn add_option(&mut self, option: ConfigOption) -> Result<()> {
        if self.contains(option.name()) {
            return Err(ConfigError::DuplicateOption {
                section: self.name.clone(),
                option: option.name().to_string(),
            });
        }
        self.options.push(option);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.iter().any(|opt| opt.name() == name)
    }

    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// `(name, option)` pairs in declaration order
    pub fn option_pairs(&self) -> impl Iterator<Item = (&str, &ConfigOption)> {
        self.options.iter().map(|opt| (opt.name(), opt))
    }

    pub fn option(&self, name: &str) -> Option<&ConfigOption> {
        self.options.iter().find(|opt| opt.name() == name)
    }

    pub fn option_mut(&mut self, name: &str) -> Option<&mut ConfigOption> {
        self.options.iter_mut().find(|opt| opt.name() == name)
    }

    pub(crate) fn options_mut(&mut self) -> impl Iterator<Item = &mut ConfigOption> {
        self.options.iter_mut()
    }

    /// Look up an option, returning the inactive placeholder on a miss.
    /// Check `active()` before trusting the result.
    pub fn find_option_spec(&self, name: &str) -> &ConfigOption {
        self.option(name).unwrap_or(&INACTIVE_OPTION)
    }

    /// Whether `name` denotes a nested multi-line list block
    pub fn is_section_marker(&self, name: &str) -> bool {
        self.option(name).is_some_and(ConfigOption::is_list)
    }

    /// Returns false if the option does not exist
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.option_mut(name) {
            Some(opt) => {
                opt.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Render one option as file text.
    ///
    /// Scalars become `name = value`. A list option becomes its own
    /// bracketed block followed by one line per item, unless the list
    /// shares the section's name, in which case only the items are
    /// produced. Items that would read back as markup are escaped, as are
    /// items of a shared list that look like one of the section's settings.
    /// Unknown names render as an empty string.
    pub fn setting_line(&self, name: &str) -> String {
        let Some(opt) = self.option(name) else {
            return String::new();
        };

        if !opt.is_list() {
            return format!("{} = {}", opt.name(), opt.encoded_value());
        }

        let shared = opt.name() == self.name;
        let mut text = String::new();
        if !shared {
            text.push_str(opt.name());
            text.push('\n');
        }
        for item in opt.list_items() {
            if shared && self.is_scalar_setting(item) {
                text.push_str(&force_escape(item));
            } else {
                text.push_str(&escape_line(item));
            }
            text.push('\n');
        }
        text
    }

    fn is_scalar_setting(&self, line: &str) -> bool {
        line.split_once('=').is_some_and(|(key, _)| {
            self.option(key.trim()).is_some_and(|opt| !opt.is_list())
        })
    }

    pub fn modified(&self) -> bool {
        self.options.iter().any(ConfigOption::modified)
    }

    pub fn unmodify(&mut self) {
        self.options.iter_mut().for_each(ConfigOption::unmodify);
    }
}
