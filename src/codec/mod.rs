//! Reading and writing section groups as INI-style text

pub mod dirspec;
pub mod document;
pub mod reader;
pub mod writer;

pub use dirspec::DirectoryEntry;
pub use document::IniDocument;
pub use reader::{IniReader, ParseReport};
pub use writer::IniWriter;

use std::path::Path;
use tracing::error;

/// Report a file that could not be opened
pub(crate) fn file_error(message: &str, path: &Path) {
    error!(path = %path.display(), "{}", message);
}
