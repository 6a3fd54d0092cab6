//! All error types for the xlfsync crate.
//!
//! Parsers report [`Error::Syntax`] and raw quick-xml errors without knowing
//! which file they came from; [`Error::in_artifact`] turns those into
//! [`Error::MalformedSource`] once the path is known.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An artifact or translation memory document cannot be parsed or reconciled.
    #[error("malformed source {}: {message}", .path.display())]
    MalformedSource { path: PathBuf, message: String },

    /// A reinjection mapping is missing an id the adapter extracts.
    #[error("missing translation for `{id}` in {}", .path.display())]
    MissingTranslation { path: PathBuf, id: String },

    /// An artifact path is not below the configured root directory.
    #[error("{} is not under root directory {}", .path.display(), .root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a syntax error for content that is well-formed but unusable.
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax(message.into())
    }

    /// Creates a missing translation error for the given artifact.
    pub fn missing_translation(path: impl Into<PathBuf>, id: impl Into<String>) -> Self {
        Error::MissingTranslation {
            path: path.into(),
            id: id.into(),
        }
    }

    /// Attributes a parse failure to the file it came from.
    ///
    /// I/O errors and errors that already carry a path are returned unchanged.
    pub fn in_artifact(self, path: &Path) -> Self {
        match self {
            Error::XmlParse(_) | Error::XmlAttribute(_) | Error::Syntax(_) => {
                Error::MalformedSource {
                    path: path.to_path_buf(),
                    message: self.to_string(),
                }
            }
            Error::MalformedSource { path: old, message } if old.as_os_str().is_empty() => {
                Error::MalformedSource {
                    path: path.to_path_buf(),
                    message,
                }
            }
            Error::MissingTranslation { path: old, id } if old.as_os_str().is_empty() => {
                Error::MissingTranslation {
                    path: path.to_path_buf(),
                    id,
                }
            }
            other => other,
        }
    }

    /// Whether the failure is confined to one artifact and the run may continue.
    pub fn is_malformed_source(&self) -> bool {
        matches!(self, Error::MalformedSource { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_malformed_source_display() {
        let error = Error::MalformedSource {
            path: PathBuf::from("src/Strings.resx"),
            message: "unexpected end of file".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "malformed source src/Strings.resx: unexpected end of file"
        );
    }

    #[test]
    fn test_missing_translation_display() {
        let error = Error::missing_translation("Menus.vsct", "cmdFoo|ButtonText");
        assert_eq!(
            error.to_string(),
            "missing translation for `cmdFoo|ButtonText` in Menus.vsct"
        );
    }

    #[test]
    fn test_path_outside_root_display() {
        let error = Error::PathOutsideRoot {
            path: PathBuf::from("/tmp/other/Foo.resx"),
            root: PathBuf::from("/repo"),
        };
        assert!(error.to_string().contains("not under root directory /repo"));
    }

    #[test]
    fn test_in_artifact_wraps_syntax_errors() {
        let error = Error::syntax("duplicate id `Hello`").in_artifact(Path::new("a/Foo.resx"));
        match error {
            Error::MalformedSource { path, message } => {
                assert_eq!(path, PathBuf::from("a/Foo.resx"));
                assert!(message.contains("duplicate id `Hello`"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_in_artifact_keeps_io_errors() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error = Error::Io(io_error).in_artifact(Path::new("Foo.resx"));
        assert!(matches!(error, Error::Io(_)));
        assert!(!error.is_malformed_source());
    }

    #[test]
    fn test_in_artifact_keeps_existing_path() {
        let error = Error::MalformedSource {
            path: PathBuf::from("first.xlf"),
            message: "bad".to_string(),
        }
        .in_artifact(Path::new("second.resx"));
        match error {
            Error::MalformedSource { path, .. } => assert_eq!(path, PathBuf::from("first.xlf")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_in_artifact_fills_missing_translation_path() {
        let error = Error::missing_translation("", "Hello").in_artifact(Path::new("Foo.resx"));
        assert_eq!(
            error.to_string(),
            "missing translation for `Hello` in Foo.resx"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidConfig("no languages".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidConfig"));
        assert!(debug.contains("no languages"));
    }
}
