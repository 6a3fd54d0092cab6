//! Format dispatch over the concrete adapters.

use std::{io::Write, path::Path};

use crate::{
    error::Error,
    formats::{CSharpFile, FormatType, ResxFile, VsctFile, XamlFile},
    traits::{Extract, Inject, Parser, Units},
    types::Translations,
};

/// A parsed artifact of any supported format.
#[derive(Debug, Clone)]
pub enum Artifact {
    Resx(ResxFile),
    Vsct(VsctFile),
    Xaml(XamlFile),
    CSharp(CSharpFile),
}

/// An artifact whose format supports reinjection.
#[derive(Debug, Clone, Copy)]
pub enum Injectable<'a> {
    Resx(&'a ResxFile),
    Vsct(&'a VsctFile),
    Xaml(&'a XamlFile),
}

impl Artifact {
    /// Reads `path` with the adapter for `format`.
    pub fn open<P: AsRef<Path>>(path: P, format: FormatType) -> Result<Self, Error> {
        let path = path.as_ref();
        Ok(match format {
            FormatType::Resx => Artifact::Resx(ResxFile::read_from(path)?),
            FormatType::Vsct => Artifact::Vsct(VsctFile::read_from(path)?),
            FormatType::Xaml => Artifact::Xaml(XamlFile::read_from(path)?),
            FormatType::CSharp => Artifact::CSharp(CSharpFile::read_from(path)?),
        })
    }

    pub fn format(&self) -> FormatType {
        match self {
            Artifact::Resx(_) => FormatType::Resx,
            Artifact::Vsct(_) => FormatType::Vsct,
            Artifact::Xaml(_) => FormatType::Xaml,
            Artifact::CSharp(_) => FormatType::CSharp,
        }
    }

    /// The reinjection view of this artifact, if its format has one.
    pub fn as_injectable(&self) -> Option<Injectable<'_>> {
        match self {
            Artifact::Resx(f) => Some(Injectable::Resx(f)),
            Artifact::Vsct(f) => Some(Injectable::Vsct(f)),
            Artifact::Xaml(f) => Some(Injectable::Xaml(f)),
            Artifact::CSharp(_) => None,
        }
    }
}

impl Extract for Artifact {
    fn units(&self) -> Units<'_> {
        match self {
            Artifact::Resx(f) => f.units(),
            Artifact::Vsct(f) => f.units(),
            Artifact::Xaml(f) => f.units(),
            Artifact::CSharp(f) => f.units(),
        }
    }
}

impl Extract for Injectable<'_> {
    fn units(&self) -> Units<'_> {
        match self {
            Injectable::Resx(f) => f.units(),
            Injectable::Vsct(f) => f.units(),
            Injectable::Xaml(f) => f.units(),
        }
    }
}

impl Inject for Injectable<'_> {
    fn inject_to_writer<W: Write>(
        &self,
        writer: W,
        translations: &Translations,
    ) -> Result<(), Error> {
        match self {
            Injectable::Resx(f) => f.inject_to_writer(writer, translations),
            Injectable::Vsct(f) => f.inject_to_writer(writer, translations),
            Injectable::Xaml(f) => f.inject_to_writer(writer, translations),
        }
    }
}
