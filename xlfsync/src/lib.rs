#![forbid(unsafe_code)]
//! Translation memory synchronization for .NET source artifacts.
//!
//! Extracts translatable strings from `.resx`, `.vsct`, `.xaml` and C#
//! `*LocalizableStrings.cs` files, reconciles them with per-language XLIFF 1.2
//! documents, and optionally writes the translations back into localized
//! copies of the artifacts.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlfsync::{Config, Converter};
//!
//! let config = Config::new("repo").with_languages(["de", "fr"]).with_two_way(true);
//! let converter = Converter::new(config)?;
//! let report = converter.convert("repo/src/Resources/Strings.resx")?;
//! println!("{:?}", report.merge);
//! # Ok::<(), xlfsync::Error>(())
//! ```
//!
//! # Building blocks
//!
//! - [`formats`]: one adapter per artifact format, implementing [`Extract`] and,
//!   for the markup formats, [`Inject`]
//! - [`Snapshot`]: the id-unique units of one artifact
//! - [`merge()`]: reconciles a snapshot with a [`Document`]
//! - [`neutral_template`]: the language-free skeleton of a document
//! - [`reinject()`]: writes a localized artifact from a document
//!
//! Running a conversion twice with an unchanged artifact leaves every
//! document byte-for-byte identical.

pub mod artifact;
pub mod config;
pub mod converter;
pub mod error;
pub mod formats;
pub mod merge;
pub mod neutral;
pub mod reinject;
pub mod snapshot;
pub mod source;
pub mod traits;
pub mod types;
pub mod xliff;

// Re-export most used types for easy consumption
pub use crate::{
    artifact::{Artifact, Injectable},
    config::Config,
    converter::{ArtifactReport, ArtifactStatus, Converter, RunReport},
    error::Error,
    formats::FormatType,
    merge::{MergeReport, merge},
    neutral::neutral_template,
    reinject::{reinject, translations_for},
    snapshot::Snapshot,
    traits::{Extract, Inject, Parser},
    types::{TargetState, TranslationUnit, Translations},
    xliff::{Document, Markup, Retained, Unit},
};
