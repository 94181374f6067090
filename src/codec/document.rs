//! Line model of an INI-style file
//!
//! The text is split into blocks, one per bracketed header. Lookups are by
//! header name, so the physical order of blocks in the file does not matter.

/// Lines starting with these characters are comments
const COMMENT_MARKERS: [char; 2] = ['#', ';'];

/// Prefix that keeps a free-text line from reading as markup
const ESCAPE: char = '\\';

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKERS)
}

pub fn is_header(line: &str) -> bool {
    let line = line.trim();
    line.len() > 2 && line.starts_with('[') && line.ends_with(']')
}

/// Prefix `line` with the escape character if it would otherwise read as
/// a comment, a header or an escaped line
pub fn escape_line(line: &str) -> String {
    let start = line.trim_start();
    if start.starts_with(COMMENT_MARKERS) || start.starts_with('[') || start.starts_with(ESCAPE) {
        force_escape(line)
    } else {
        line.to_string()
    }
}

/// Escape `line` unconditionally
pub fn force_escape(line: &str) -> String {
    format!("{}{}", ESCAPE, line)
}

pub fn unescape_line(line: &str) -> &str {
    line.strip_prefix(ESCAPE).unwrap_or(line)
}

/// Strip one pair of surrounding double quotes
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    header: Option<String>,
    lines: Vec<String>,
}

impl Block {
    /// Header including brackets; `None` for text before the first header
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Value of the first `name = value` line, unquoted
    pub fn setting(&self, name: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter(|line| !is_comment(line))
            .filter_map(|line| line.split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| unquote(value))
    }

    /// Non-blank, non-comment lines, trimmed but still escaped
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| !is_comment(line))
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
    }

    /// Non-blank, non-comment lines, trimmed and unescaped
    pub fn items(&self) -> Vec<&str> {
        self.entries().map(|line| unescape_line(line).trim()).collect()
    }

    /// Non-comment lines, unescaped, with surrounding blank lines removed
    pub fn text(&self) -> String {
        let kept: Vec<&str> = self
            .lines
            .iter()
            .filter(|line| !is_comment(line))
            .map(|line| unescape_line(line.trim_end()))
            .collect();

        let start = kept.iter().position(|l| !l.is_empty());
        let end = kept.iter().rposition(|l| !l.is_empty());
        match (start, end) {
            (Some(start), Some(end)) => kept[start..=end].join("\n"),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniDocument {
    blocks: Vec<Block>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Self {
        let mut blocks = vec![Block::default()];

        for line in text.lines() {
            if is_header(line) {
                blocks.push(Block {
                    header: Some(line.trim().to_string()),
                    lines: Vec::new(),
                });
            } else if let Some(current) = blocks.last_mut() {
                current.lines.push(line.to_string());
            }
        }

        Self { blocks }
    }

    /// First block with the given header
    pub fn block(&self, header: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.header() == Some(header))
    }

    /// Headers in file order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(Block::header)
    }
}
