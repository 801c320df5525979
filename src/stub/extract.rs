use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::compactor::{Compactor, PhpCompactor};

const BUNDLED_SOURCE: &str = include_str!("extract.php");

static BUNDLED: LazyLock<ExtractCode> =
    LazyLock::new(|| ExtractCode::from_source(BUNDLED_SOURCE, &PhpCompactor));

static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("invalid newline regex"));

/// The self-extraction fallback, split for embedding in a stub.
///
/// `constants` holds the helper's top-level `define(...)` statements, which
/// are emitted before the runtime capability check. `class` holds the
/// remainder of the helper and is emitted after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractCode {
    constants: Vec<String>,
    class: Vec<String>,
}

impl ExtractCode {
    /// The helper shipped with this crate, compacted once per process.
    pub fn bundled() -> &'static ExtractCode {
        &BUNDLED
    }

    /// Derives the embeddable fragments from a PHP helper source.
    ///
    /// The first two lines (open tag and namespace declaration) are dropped,
    /// as are `use` imports of global names, since the helper is inlined into
    /// the global namespace of the stub.
    pub fn from_source(source: &str, compactor: &dyn Compactor) -> Self {
        let compacted = compactor.compact(source);
        let collapsed = NEWLINE_RUN.replace_all(&compacted, "\n");

        let mut code = ExtractCode {
            constants: Vec::new(),
            class: Vec::new(),
        };
        for line in collapsed.split('\n').skip(2) {
            if line.is_empty() || (line.starts_with("use") && !line.contains('\\')) {
                continue;
            }
            if line.starts_with("define") {
                code.constants.push(line.to_string());
            } else {
                code.class.push(line.to_string());
            }
        }

        debug!(
            constants = code.constants.len(),
            class = code.class.len(),
            "derived extraction code"
        );
        code
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    pub fn class(&self) -> &[String] {
        &self.class
    }

    pub fn constants_block(&self) -> String {
        self.constants.join("\n")
    }

    pub fn class_block(&self) -> String {
        self.class.join("\n")
    }
}
