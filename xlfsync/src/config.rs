//! Run-wide settings for a conversion.

use std::path::{Component, Path, PathBuf};

use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// Languages a translation memory is kept for unless configured otherwise.
pub const DEFAULT_LANGUAGES: [&str; 13] = [
    "cs", "de", "es", "fr", "it", "ja", "ko", "pl", "pt-BR", "ru", "tr", "zh-Hans", "zh-Hant",
];

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// Name of the directory, next to each artifact, that holds its documents.
pub const DEFAULT_XLF_DIRECTORY: &str = "xlf";

/// Settings shared by every artifact of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory artifact paths are made relative to.
    pub root: PathBuf,
    /// Target languages, processed in this order.
    pub languages: Vec<String>,
    pub source_language: String,
    /// Also write localized artifact copies from the documents.
    pub two_way: bool,
    pub xlf_directory: String,
    /// Where localized copies go; defaults to `root`.
    pub output_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from("."),
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            two_way: false,
            xlf_directory: DEFAULT_XLF_DIRECTORY.to_string(),
            output_root: None,
        }
    }
}

impl Config {
    /// Creates a configuration for `root` with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Config {
            root: root.into(),
            ..Config::default()
        }
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    /// Enables/disables two-way mode.
    pub fn with_two_way(mut self, two_way: bool) -> Self {
        self.two_way = two_way;
        self
    }

    pub fn with_xlf_directory(mut self, name: impl Into<String>) -> Self {
        self.xlf_directory = name.into();
        self
    }

    pub fn with_output_root(mut self, output_root: Option<PathBuf>) -> Self {
        self.output_root = output_root;
        self
    }

    /// Root under which localized copies mirror the source layout.
    pub fn output_root(&self) -> &Path {
        self.output_root.as_deref().unwrap_or(&self.root)
    }

    /// Checks that every language is a well-formed BCP 47 tag and that the
    /// document directory is a plain name.
    pub fn validate(&self) -> Result<(), Error> {
        if self.languages.is_empty() {
            return Err(Error::InvalidConfig("no target languages".to_string()));
        }
        for language in self.languages.iter().chain([&self.source_language]) {
            language.parse::<LanguageIdentifier>().map_err(|e| {
                Error::InvalidConfig(format!("invalid language tag `{language}`: {e}"))
            })?;
        }
        if let Some(duplicate) = self
            .languages
            .iter()
            .enumerate()
            .find(|(i, l)| self.languages[..*i].contains(*l))
            .map(|(_, l)| l)
        {
            return Err(Error::InvalidConfig(format!(
                "language `{duplicate}` is listed twice"
            )));
        }
        let mut components = Path::new(&self.xlf_directory).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(Error::InvalidConfig(format!(
                "`{}` is not a valid directory name",
                self.xlf_directory
            )));
        }
        Ok(())
    }

    /// Forward-slash path of `path` relative to the root, used as the
    /// identity of an artifact inside its documents.
    pub fn relative_id(&self, path: &Path) -> Result<String, Error> {
        let relative = self
            .relative_path(path)
            .ok_or_else(|| Error::PathOutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    /// `path` relative to the root, or `None` when it lies outside.
    pub fn relative_path<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        let root = self.root.strip_prefix(".").unwrap_or(&self.root);
        let path = path.strip_prefix(".").unwrap_or(path);
        let relative = path.strip_prefix(root).ok()?;
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        (!escapes && relative.components().next().is_some()).then_some(relative)
    }
}
