//! Serialize a section group back to text
//!
//! Output always follows the schema's declared order, whatever order the
//! file had when it was read.

use crate::codec::document::escape_line;
use crate::codec::file_error;
use crate::config::defaults::{COMMENTS_SECTION, FORMAT_SECTION};
use crate::config::{Section, SectionGroup};
use crate::types::{ConfigError, Result};
use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct IniWriter<'a> {
    group: &'a SectionGroup,
    path: PathBuf,
}

impl<'a> IniWriter<'a> {
    pub fn new(group: &'a SectionGroup, path: impl Into<PathBuf>) -> Self {
        Self {
            group,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the file, creating its directory if needed
    pub fn write(&self) -> Result<()> {
        let text = self.render();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        fs::write(&self.path, text).map_err(|e| self.write_error(e))?;

        info!("Wrote {} file {}", self.group.config_type(), self.path.display());
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> ConfigError {
        file_error("Cannot open for writing", &self.path);
        ConfigError::Write {
            path: self.path.clone(),
            source,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let path = self.path.display();

        let _ = writeln!(out, "# {} configuration file", self.group.config_type());
        let _ = writeln!(out, "#");
        let _ = writeln!(out, "# {}", path);
        let _ = writeln!(out, "# Written {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

        for section in self.group.sections() {
            render_section(&mut out, section);
            if section.name() == FORMAT_SECTION {
                self.render_comments(&mut out);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "# End of {}", path);
        out
    }

    fn render_comments(&self, out: &mut String) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", COMMENTS_SECTION);
        let _ = writeln!(out);
        let text = self.group.comments().text();
        if !text.is_empty() {
            for line in text.lines() {
                let _ = writeln!(out, "{}", escape_line(line));
            }
        }
    }
}

fn render_section(out: &mut String, section: &Section) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", section.name());
    write_comment(out, section.description());
    let _ = writeln!(out);

    // Scalars stay under the section header; list blocks follow them
    let (lists, scalars): (Vec<_>, Vec<_>) =
        section.options().iter().partition(|opt| opt.is_list());

    for opt in scalars {
        write_comment(out, opt.description());
        let _ = writeln!(out, "{}", section.setting_line(opt.name()));
    }

    for opt in lists {
        if opt.name() != section.name() {
            let _ = writeln!(out);
        }
        let block = section.setting_line(opt.name());
        match block.split_once('\n') {
            // Keep the description between the block header and its items
            Some((header, items)) if opt.name() != section.name() => {
                let _ = writeln!(out, "{}", header);
                write_comment(out, opt.description());
                out.push_str(items);
            }
            _ => {
                write_comment(out, opt.description());
                out.push_str(&block);
            }
        }
    }
}

fn write_comment(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "# {}", line.trim_end());
    }
}
