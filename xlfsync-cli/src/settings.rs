use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use xlfsync::Config;

/// Name of the settings file looked up in the root directory.
pub const SETTINGS_FILE_NAME: &str = "xlfsync.toml";

/// Settings read from `xlfsync.toml`. Every field is optional; missing ones
/// keep the library defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub languages: Option<Vec<String>>,
    pub source_language: Option<String>,
    pub two_way: Option<bool>,
    pub xlf_directory: Option<String>,
    /// Relative paths are resolved against the settings file's directory.
    pub output_root: Option<PathBuf>,
}

/// Settings given on the command line; these win over the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub languages: Option<Vec<String>>,
    pub source_language: Option<String>,
    pub two_way: bool,
    pub output_root: Option<PathBuf>,
}

impl FileSettings {
    /// Parses settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid settings")
    }

    /// Loads `path`, resolving a relative `output_root` against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read settings file {}", path.display()))?;
        let mut settings = Self::from_toml(&text)
            .with_context(|| format!("in settings file {}", path.display()))?;
        if let (Some(output_root), Some(dir)) = (settings.output_root.as_mut(), path.parent()) {
            if output_root.is_relative() {
                *output_root = dir.join(&*output_root);
            }
        }
        Ok(settings)
    }

    /// Loads `explicit` if given, else `xlfsync.toml` in `root` if it exists.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = root.join(SETTINGS_FILE_NAME);
                if default_path.is_file() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Combines defaults, the settings file and command-line overrides.
pub fn resolve(root: &Path, file: FileSettings, overrides: Overrides) -> Config {
    let mut config = Config::new(root);
    if let Some(languages) = overrides.languages.or(file.languages) {
        config = config.with_languages(languages);
    }
    if let Some(source_language) = overrides.source_language.or(file.source_language) {
        config = config.with_source_language(source_language);
    }
    if let Some(xlf_directory) = file.xlf_directory {
        config = config.with_xlf_directory(xlf_directory);
    }
    config
        .with_two_way(overrides.two_way || file.two_way.unwrap_or(false))
        .with_output_root(overrides.output_root.or(file.output_root))
}
