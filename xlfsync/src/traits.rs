//! Traits shared by every artifact adapter.
//!
//! [`Parser`] loads one file, [`Extract`] lists its translation units and
//! [`Inject`] writes a translated copy. Only the markup formats implement
//! [`Inject`].

use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    error::Error,
    source::SourceText,
    types::{TranslationUnit, Translations},
};

/// Iterator returned by [`Extract::units`].
pub type Units<'a> = Box<dyn Iterator<Item = TranslationUnit> + 'a>;

/// A trait for loading one artifact from text, bytes or a file.
///
/// # Example
///
/// ```rust,no_run
/// use xlfsync::formats::ResxFile;
/// use xlfsync::traits::{Extract, Parser};
///
/// let resx = ResxFile::read_from("Properties/Resources.resx")?;
/// for unit in resx.units() {
///     println!("{} = {}", unit.id, unit.source);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from decoded text.
    fn from_text(source: SourceText) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_text(SourceText::from(s))
    }

    /// Parse from bytes, honouring a byte-order mark.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_text(SourceText::decode(bytes)?)
    }

    /// Parse from file path. Parse failures are reported as
    /// [`Error::MalformedSource`] naming `path`.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|e| e.in_artifact(path))
    }
}

/// Extraction of translation units in document order.
pub trait Extract {
    /// Returns a fresh iterator over the units; calling it again restarts
    /// from the first unit.
    fn units(&self) -> Units<'_>;
}

/// Reinjection of translated text into a copy of the artifact.
pub trait Inject: Extract {
    /// Writes the translated artifact to `writer`.
    ///
    /// Fails with [`Error::MissingTranslation`] before writing anything when
    /// `translations` lacks an id that [`Extract::units`] yields.
    fn inject_to_writer<W: Write>(&self, writer: W, translations: &Translations)
    -> Result<(), Error>;

    /// Writes the translated artifact to `path`, creating parent directories.
    ///
    /// The file is only created once the translated content is complete.
    fn inject<P: AsRef<Path>>(&self, path: P, translations: &Translations) -> Result<(), Error> {
        let path = path.as_ref();
        let mut content = Vec::new();
        self.inject_to_writer(&mut content, translations)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(fs::File::create(path)?);
        writer.write_all(&content)?;
        writer.flush()?;
        Ok(())
    }
}
