//! All supported source artifact formats for xlfsync.
//!
//! This module re-exports the adapter type for each format and provides
//! the [`FormatType`] enum for generic format handling across the crate.

pub mod csharp;
pub(crate) mod patch;
pub mod resx;
pub mod vsct;
pub mod xaml;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

// Reexporting the formats for easier access
pub use csharp::CSharpFile;
pub use resx::{ResxEntry, ResxFile};
pub use vsct::VsctFile;
pub use xaml::XamlFile;

use crate::Error;

/// Suffix that marks a C# class of localizable string constants.
pub const LOCALIZABLE_STRINGS_SUFFIX: &str = "LocalizableStrings.cs";

/// Represents all supported source artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// .NET `.resx` resources.
    Resx,
    /// Visual Studio `.vsct` command tables.
    Vsct,
    /// XAML rule files.
    Xaml,
    /// C# `*LocalizableStrings.cs` constant classes.
    CSharp,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use xlfsync::formats::FormatType;
/// assert_eq!(FormatType::Resx.to_string(), "resx");
/// assert_eq!(FormatType::CSharp.to_string(), "csharp");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Resx => write!(f, "resx"),
            FormatType::Vsct => write!(f, "vsct"),
            FormatType::Xaml => write!(f, "xaml"),
            FormatType::CSharp => write!(f, "csharp"),
        }
    }
}

/// Accepts `resx`, `vsct`, `xaml` and `csharp`/`cs`, case-insensitively.
///
/// # Example
/// ```rust
/// use xlfsync::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("VSCT").unwrap(), FormatType::Vsct);
/// assert!(FormatType::from_str("po").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "resx" => Ok(FormatType::Resx),
            "vsct" => Ok(FormatType::Vsct),
            "xaml" => Ok(FormatType::Xaml),
            "csharp" | "cs" => Ok(FormatType::CSharp),
            other => Err(Error::syntax(format!("unknown format `{other}`"))),
        }
    }
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Resx => "resx",
            FormatType::Vsct => "vsct",
            FormatType::Xaml => "xaml",
            FormatType::CSharp => "cs",
        }
    }

    /// Infers the format from a file name.
    ///
    /// C# files only count when they follow the `*LocalizableStrings.cs`
    /// convention; other C# sources carry no translatable strings.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let file_name = path.file_name()?.to_str()?;
        if file_name.ends_with(LOCALIZABLE_STRINGS_SUFFIX) {
            return Some(FormatType::CSharp);
        }
        match path.extension()?.to_str()? {
            "resx" => Some(FormatType::Resx),
            "vsct" => Some(FormatType::Vsct),
            "xaml" => Some(FormatType::Xaml),
            _ => None,
        }
    }

    /// Whether translations can be written back into this format.
    pub fn is_injectable(&self) -> bool {
        !matches!(self, FormatType::CSharp)
    }

    /// File name of the translated copy of `file_name` for `language`,
    /// relative to the directory of the original.
    ///
    /// # Example
    /// ```rust
    /// use xlfsync::formats::FormatType;
    /// use std::path::PathBuf;
    /// assert_eq!(FormatType::Resx.localized_path("Strings.resx", "de"), PathBuf::from("Strings.de.resx"));
    /// assert_eq!(FormatType::Xaml.localized_path("General.xaml", "ja"), PathBuf::from("ja/General.xaml"));
    /// ```
    pub fn localized_path(&self, file_name: &str, language: &str) -> std::path::PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        match self {
            FormatType::Xaml => Path::new(language).join(file_name),
            _ => format!("{stem}.{language}.{}", self.extension()).into(),
        }
    }
}
