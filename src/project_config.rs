use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StubError};
use crate::stub::{MimeType, StubGenerator};

/// File names searched for in a project directory, in order.
pub const CONFIG_FILES: [&str; 2] = ["box.toml", "box.json"];

/// Stub settings read from `box.toml` or `box.json`.
///
/// Every field is optional; unset fields leave the generator default alone.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StubConfig {
    pub alias: Option<String>,
    pub banner: Option<String>,
    pub shebang: Option<String>,
    pub extract: Option<bool>,
    pub intercept: Option<bool>,
    pub index: Option<String>,
    #[serde(alias = "not-found")]
    pub not_found: Option<String>,
    pub rewrite: Option<String>,
    pub web: Option<bool>,
    pub mimetypes: Option<IndexMap<String, MimeType>>,
    pub mung: Option<Vec<String>>,
}

impl StubConfig {
    /// Loads a config file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| StubError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loading stub config");
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StubError::Config(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| StubError::Config(e.to_string()))
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: StubConfig) -> StubConfig {
        StubConfig {
            alias: overrides.alias.or(self.alias),
            banner: overrides.banner.or(self.banner),
            shebang: overrides.shebang.or(self.shebang),
            extract: overrides.extract.or(self.extract),
            intercept: overrides.intercept.or(self.intercept),
            index: overrides.index.or(self.index),
            not_found: overrides.not_found.or(self.not_found),
            rewrite: overrides.rewrite.or(self.rewrite),
            web: overrides.web.or(self.web),
            mimetypes: overrides.mimetypes.or(self.mimetypes),
            mung: overrides.mung.or(self.mung),
        }
    }

    /// Pushes every set field through the generator's setters.
    ///
    /// Fails on the first rejected value, the `mung` whitelist being the only
    /// setter that validates.
    pub fn apply(&self, generator: &mut StubGenerator) -> Result<()> {
        if let Some(alias) = &self.alias {
            generator.alias(alias.as_str());
        }
        if let Some(banner) = &self.banner {
            generator.banner(banner.as_str());
        }
        if let Some(shebang) = &self.shebang {
            generator.shebang(shebang.as_str());
        }
        if let Some(extract) = self.extract {
            generator.extract(extract);
        }
        if let Some(intercept) = self.intercept {
            generator.intercept(intercept);
        }
        if let Some(index) = &self.index {
            generator.index(index.as_str());
        }
        if let Some(not_found) = &self.not_found {
            generator.not_found(not_found.as_str());
        }
        if let Some(rewrite) = &self.rewrite {
            generator.rewrite(rewrite.as_str());
        }
        if let Some(web) = self.web {
            generator.web(web);
        }
        if let Some(mimetypes) = &self.mimetypes {
            generator.mimetypes(mimetypes.clone());
        }
        if let Some(mung) = &self.mung {
            generator.mung(mung.iter().map(String::as_str))?;
        }
        Ok(())
    }
}

/// Looks for a config file in `dir`; `Ok(None)` when there is none.
pub fn load_project_config(dir: &Path) -> Result<Option<StubConfig>> {
    for name in CONFIG_FILES {
        let path = dir.join(name);
        if path.is_file() {
            return StubConfig::load(&path).map(Some);
        }
    }
    Ok(None)
}
