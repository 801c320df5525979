use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::export;
use super::extract::ExtractCode;
use super::mime::MimeType;
use crate::error::{Result, StubError};

/// Token separating the stub from the archive payload.
pub const HALT_MARKER: &str = "__HALT_COMPILER();";

pub const OPEN_TAG: &str = "<?php";

pub const DEFAULT_SHEBANG: &str = "#!/usr/bin/env php";

pub const DEFAULT_BANNER: &str =
    "Generated by Box.\n\n@link https://github.com/herrera-io/php-box/";

/// `$_SERVER` variables the archive runtime is able to munge.
pub const MUNG_WHITELIST: [&str; 4] = [
    "PHP_SELF",
    "REQUEST_URI",
    "SCRIPT_FILENAME",
    "SCRIPT_NAME",
];

/// Everything a stub is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubConfiguration {
    alias: Option<String>,
    banner: String,
    extract: bool,
    index: Option<String>,
    intercept: bool,
    mimetypes: IndexMap<String, MimeType>,
    mung: Vec<String>,
    not_found: Option<String>,
    rewrite: Option<String>,
    shebang: String,
    web: bool,
}

impl Default for StubConfiguration {
    fn default() -> Self {
        Self {
            alias: None,
            banner: DEFAULT_BANNER.to_string(),
            extract: false,
            index: None,
            intercept: false,
            mimetypes: IndexMap::new(),
            mung: Vec::new(),
            not_found: None,
            rewrite: None,
            shebang: DEFAULT_SHEBANG.to_string(),
            web: false,
        }
    }
}

impl StubConfiguration {
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn extract(&self) -> bool {
        self.extract
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn intercept(&self) -> bool {
        self.intercept
    }

    pub fn mimetypes(&self) -> &IndexMap<String, MimeType> {
        &self.mimetypes
    }

    pub fn mung(&self) -> &[String] {
        &self.mung
    }

    pub fn not_found(&self) -> Option<&str> {
        self.not_found.as_deref()
    }

    pub fn rewrite(&self) -> Option<&str> {
        self.rewrite.as_deref()
    }

    pub fn shebang(&self) -> &str {
        &self.shebang
    }

    pub fn web(&self) -> bool {
        self.web
    }
}

/// Assembles the bootstrap script placed in front of an archive payload.
///
/// Setters take `&mut self` and return it, so configuration reads as a chain:
///
/// ```
/// use phar_stub::StubGenerator;
///
/// let stub = StubGenerator::create()
///     .alias("app.phar")
///     .index("bin/app.php")
///     .generate();
/// assert!(stub.ends_with("__HALT_COMPILER();"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StubGenerator {
    config: StubConfiguration,
    extract_code: Option<Arc<ExtractCode>>,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create() -> Self {
        Self::new()
    }

    pub fn config(&self) -> &StubConfiguration {
        &self.config
    }

    /// The extraction fallback embedded when extraction is enabled.
    pub fn extract_code(&self) -> &ExtractCode {
        match self.extract_code.as_deref() {
            Some(code) => code,
            None => ExtractCode::bundled(),
        }
    }

    /// Replaces the bundled extraction fallback.
    pub fn with_extract_code(&mut self, code: ExtractCode) -> &mut Self {
        self.extract_code = Some(Arc::new(code));
        self
    }

    /// Name the archive registers itself under. Without an alias only the
    /// banner and halt marker are rendered.
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.config.alias = Some(alias.into());
        self
    }

    pub fn banner(&mut self, banner: impl Into<String>) -> &mut Self {
        self.config.banner = banner.into();
        self
    }

    pub fn extract(&mut self, extract: bool) -> &mut Self {
        self.config.extract = extract;
        self
    }

    pub fn index(&mut self, index: impl Into<String>) -> &mut Self {
        self.config.index = Some(index.into());
        self
    }

    pub fn intercept(&mut self, intercept: bool) -> &mut Self {
        self.config.intercept = intercept;
        self
    }

    pub fn mimetypes<I, K>(&mut self, mimetypes: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, MimeType)>,
        K: Into<String>,
    {
        self.config.mimetypes = mimetypes
            .into_iter()
            .map(|(ext, mime)| (ext.into(), mime))
            .collect();
        self
    }

    /// Sets the `$_SERVER` variables to munge.
    ///
    /// Every key must be in [`MUNG_WHITELIST`]. On the first unknown key the
    /// call fails and the previously stored list is left untouched. Repeated
    /// keys are kept once, in first-seen order.
    pub fn mung<I, S>(&mut self, keys: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if let Some(invalid) = keys
            .iter()
            .find(|key| !MUNG_WHITELIST.contains(&key.as_str()))
        {
            return Err(StubError::InvalidArgument(format!(
                "The $_SERVER variable \"{invalid}\" is not allowed."
            )));
        }

        let mut unique: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        self.config.mung = unique;
        Ok(self)
    }

    pub fn not_found(&mut self, not_found: impl Into<String>) -> &mut Self {
        self.config.not_found = Some(not_found.into());
        self
    }

    pub fn rewrite(&mut self, rewrite: impl Into<String>) -> &mut Self {
        self.config.rewrite = Some(rewrite.into());
        self
    }

    /// An empty shebang omits the line entirely.
    pub fn shebang(&mut self, shebang: impl Into<String>) -> &mut Self {
        self.config.shebang = shebang.into();
        self
    }

    pub fn web(&mut self, web: bool) -> &mut Self {
        self.config.web = web;
        self
    }

    pub fn generate(&self) -> String {
        let config = &self.config;
        debug!(
            alias = ?config.alias,
            extract = config.extract,
            web = config.web,
            intercept = config.intercept,
            "generating stub"
        );

        let mut stub = Vec::new();
        render_shebang(config, &mut stub);
        stub.push(OPEN_TAG.to_string());
        render_banner(config, &mut stub);

        if config.alias.is_some() {
            let extract = config.extract.then(|| self.extract_code());
            if let Some(code) = extract {
                stub.push(code.constants_block());
                stub.push("if (class_exists('Phar')) {".to_string());
            }
            render_registration(config, &mut stub);
            render_intercept(config, &mut stub);
            render_mung(config, &mut stub);
            render_index(config, &mut stub);
            if let Some(code) = extract {
                render_fallback(config, code, &mut stub);
            }
        }

        stub.push(HALT_MARKER.to_string());
        stub.join("\n")
    }
}

fn render_shebang(config: &StubConfiguration, stub: &mut Vec<String>) {
    if !config.shebang.is_empty() {
        stub.push(config.shebang.clone());
    }
}

fn render_banner(config: &StubConfiguration, stub: &mut Vec<String>) {
    stub.push("/**".to_string());
    for line in config.banner.split('\n') {
        if line.trim().is_empty() {
            stub.push(" *".to_string());
        } else {
            stub.push(format!(" * {line}"));
        }
    }
    stub.push(" */".to_string());
}

fn render_registration(config: &StubConfiguration, stub: &mut Vec<String>) {
    let alias = export::optional(config.alias.as_deref());
    if config.web {
        let mimetypes = export::array(
            config
                .mimetypes
                .iter()
                .map(|(ext, mime)| (export::string(ext), mime.export())),
        );
        stub.push(format!(
            "Phar::webPhar({alias}, {}, {}, {mimetypes}, {});",
            export::optional(config.index.as_deref()),
            export::optional(config.not_found.as_deref()),
            export::optional(config.rewrite.as_deref()),
        ));
    } else {
        stub.push(format!("Phar::mapPhar({alias});"));
    }
}

fn render_intercept(config: &StubConfiguration, stub: &mut Vec<String>) {
    if config.intercept {
        stub.push("Phar::interceptFileFuncs();".to_string());
    }
}

fn render_mung(config: &StubConfiguration, stub: &mut Vec<String>) {
    if !config.mung.is_empty() {
        stub.push(format!("Phar::mungServer({});", export::list(&config.mung)));
    }
}

/// Outside of web mode the index is required straight from the archive.
fn render_index(config: &StubConfiguration, stub: &mut Vec<String>) {
    if config.web {
        return;
    }
    if let Some(index) = &config.index {
        stub.push(format!(
            "require 'phar://' . __FILE__ . '/{}';",
            export::single_quoted(index)
        ));
    }
}

fn render_fallback(config: &StubConfiguration, code: &ExtractCode, stub: &mut Vec<String>) {
    stub.push("} else {".to_string());
    stub.push(
        "$extract = new Extract(__FILE__, Extract::findStubLength(__FILE__));".to_string(),
    );
    stub.push("$dir = $extract->go();".to_string());
    stub.push(
        "set_include_path($dir . PATH_SEPARATOR . get_include_path());".to_string(),
    );
    if let Some(index) = &config.index {
        stub.push(format!("require \"$dir/{}\";", export::double_quoted(index)));
    }
    stub.push("}".to_string());
    stub.push(code.class_block());
}
