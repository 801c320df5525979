//! Source compaction for code embedded in a stub.
//!
//! A compactor strips comments and redundant whitespace while keeping the
//! source semantically equivalent. The stub generator treats its output as
//! opaque text.

mod php;

use std::path::Path;

pub use php::PhpCompactor;

pub trait Compactor: Send + Sync {
    /// Returns true if this compactor knows how to handle `file`.
    fn supports(&self, file: &Path) -> bool;

    fn compact(&self, contents: &str) -> String;
}

/// Passes source through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Compactor for Identity {
    fn supports(&self, _file: &Path) -> bool {
        true
    }

    fn compact(&self, contents: &str) -> String {
        contents.to_string()
    }
}
