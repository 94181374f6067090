//! Configuration model for inireg
//!
//! Three nesting levels, each with unique names:
//! 1. `SectionGroup` - one physical file, keyed by config type
//! 2. `Section` - one bracketed block of that file
//! 3. `ConfigOption` - one typed value inside a section
//!
//! `ConfigRegistry` owns the groups and resolves the three-part key.

pub mod defaults;
mod group;
mod option;
mod registry;
mod section;
mod spec;

pub use defaults::{builtin_specs, COMMENTS_SECTION, FORMAT_SECTION};
pub use group::{CommentBlock, SectionGroup};
pub use option::{ConfigOption, OptionKind};
pub use registry::ConfigRegistry;
pub use section::{bracketed, Section};
pub use spec::{OptionSpec, SectionGroupSpec, SectionSpec};
