//! The per-artifact pipeline: extract, merge per language, derive the
//! neutral template and, in two-way mode, write localized copies.
//!
//! Failures confined to one artifact or one language are logged and
//! recorded in the returned report; filesystem errors and contract
//! violations such as [`Error::PathOutsideRoot`] stop the run.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::{
    artifact::Artifact,
    config::Config,
    error::Error,
    formats::FormatType,
    merge::{MergeReport, merge},
    neutral::neutral_template,
    reinject::reinject,
    snapshot::Snapshot,
    traits::Parser,
    types::TargetState,
    xliff::Document,
};

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// At least one language document was merged.
    Converted,
    /// The artifact has no translatable strings; nothing was written.
    Empty,
    /// The artifact, or every one of its documents, could not be read.
    Malformed,
}

/// Outcome of converting one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub path: PathBuf,
    /// Root-relative identity recorded in the documents.
    pub original: String,
    pub format: String,
    pub status: ArtifactStatus,
    pub units: usize,
    /// Translation memory documents written, neutral template included.
    pub documents: Vec<PathBuf>,
    /// Localized artifact copies written in two-way mode.
    pub localized: Vec<PathBuf>,
    pub skipped_languages: Vec<String>,
    pub merge: MergeReport,
    /// Units across all language documents that still await a translator.
    pub pending: usize,
    /// Logged failures that did not stop the run.
    pub errors: Vec<String>,
}

impl ArtifactReport {
    fn new(path: &Path, original: String, format: FormatType) -> Self {
        ArtifactReport {
            path: path.to_path_buf(),
            original,
            format: format.to_string(),
            status: ArtifactStatus::Converted,
            units: 0,
            documents: Vec::new(),
            localized: Vec::new(),
            skipped_languages: Vec::new(),
            merge: MergeReport::default(),
            pending: 0,
            errors: Vec::new(),
        }
    }
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub artifacts: usize,
    pub converted: usize,
    pub skipped: usize,
    pub documents_written: usize,
    pub localized_written: usize,
    pub merge: MergeReport,
    pub pending: usize,
    pub reports: Vec<ArtifactReport>,
}

impl RunReport {
    pub fn push(&mut self, report: ArtifactReport) {
        self.artifacts += 1;
        match report.status {
            ArtifactStatus::Converted => self.converted += 1,
            ArtifactStatus::Empty | ArtifactStatus::Malformed => self.skipped += 1,
        }
        self.documents_written += report.documents.len();
        self.localized_written += report.localized.len();
        self.merge += report.merge;
        self.pending += report.pending;
        self.reports.push(report);
    }

    /// Whether any artifact or language was skipped because of an error.
    pub fn has_errors(&self) -> bool {
        self.reports
            .iter()
            .any(|r| r.status == ArtifactStatus::Malformed || !r.errors.is_empty())
    }
}

/// Drives conversions for one validated [`Config`].
///
/// # Example
///
/// ```rust,no_run
/// use xlfsync::{Config, Converter};
///
/// let converter = Converter::new(Config::new("repo").with_languages(["de", "ja"]))?;
/// let report = converter.convert("repo/src/Properties/Resources.resx")?;
/// println!("{} documents written", report.documents.len());
/// # Ok::<(), xlfsync::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: Config,
}

impl Converter {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Converter { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Converts every path in order and collects the reports.
    pub fn convert_all<I, P>(&self, paths: I) -> Result<RunReport, Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut run = RunReport::default();
        for path in paths {
            run.push(self.convert(path)?);
        }
        Ok(run)
    }

    /// Converts one artifact, inferring its format from the file name.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<ArtifactReport, Error> {
        let path = path.as_ref();
        let format = FormatType::from_path(path).ok_or_else(|| Error::MalformedSource {
            path: path.to_path_buf(),
            message: "unsupported artifact format".to_string(),
        })?;
        self.convert_as(path, format)
    }

    /// Converts one artifact with the adapter for `format`.
    pub fn convert_as<P: AsRef<Path>>(
        &self,
        path: P,
        format: FormatType,
    ) -> Result<ArtifactReport, Error> {
        let path = path.as_ref();
        let original = document_original(&self.config.relative_id(path)?, format);
        let base = base_name(&original);
        let mut report = ArtifactReport::new(path, original, format);

        let parsed = Artifact::open(path, format)
            .and_then(|artifact| {
                let snapshot = Snapshot::build(&artifact).map_err(|e| e.in_artifact(path))?;
                Ok((artifact, snapshot))
            });
        let (artifact, snapshot) = match parsed {
            Ok(parsed) => parsed,
            Err(e) if e.is_malformed_source() => {
                warn!("Skipping {}: {}", path.display(), e);
                report.status = ArtifactStatus::Malformed;
                report.errors.push(e.to_string());
                return Ok(report);
            }
            Err(e) => return Err(e),
        };

        if !snapshot.has_units() {
            debug!("No translatable strings in {}", path.display());
            report.status = ArtifactStatus::Empty;
            return Ok(report);
        }
        report.units = snapshot.len();

        let xlf_dir = path
            .parent()
            .unwrap_or(Path::new(""))
            .join(&self.config.xlf_directory);
        let mut merged: Vec<(&str, Document)> = Vec::new();

        for language in &self.config.languages {
            let doc_path = xlf_dir.join(format!("{base}.{language}.xlf"));
            match self.merge_language(&report.original, language, &snapshot, &doc_path) {
                Ok((document, merge_report)) => {
                    debug!(
                        "{} [{}]: {} added, {} updated, {} unchanged, {} removed",
                        report.original,
                        language,
                        merge_report.added,
                        merge_report.updated,
                        merge_report.unchanged,
                        merge_report.removed
                    );
                    info!("Wrote {}", doc_path.display());
                    report.merge += merge_report;
                    report.pending += document
                        .units
                        .iter()
                        .filter(|u| u.state.is_some_and(TargetState::is_pending))
                        .count();
                    report.documents.push(doc_path);
                    merged.push((language.as_str(), document));
                }
                Err(e) if e.is_malformed_source() => {
                    warn!("Skipping {} [{}]: {}", path.display(), language, e);
                    report.skipped_languages.push(language.clone());
                    report.errors.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        let Some((_, first)) = merged.first() else {
            report.status = ArtifactStatus::Malformed;
            return Ok(report);
        };
        let neutral_path = xlf_dir.join(format!("{base}.xlf"));
        neutral_template(first).write_to(&neutral_path)?;
        info!("Wrote {}", neutral_path.display());
        report.documents.push(neutral_path);

        if self.config.two_way {
            self.write_localized(path, &artifact, &merged, &mut report)?;
        }

        Ok(report)
    }

    /// Loads or creates the document for one language, merges and persists it.
    ///
    /// Only reading an existing document can fail with a malformed source,
    /// and persisting is atomic, so a failed pass leaves no document behind
    /// that was not there before.
    fn merge_language(
        &self,
        original: &str,
        language: &str,
        snapshot: &Snapshot,
        doc_path: &Path,
    ) -> Result<(Document, MergeReport), Error> {
        let mut document = if doc_path.exists() {
            Document::read_from(doc_path)?
        } else {
            Document::new(
                original,
                self.config.source_language.as_str(),
                Some(language.to_string()),
            )
        };
        let merge_report = merge(&mut document, snapshot);
        document.write_to(doc_path)?;
        Ok((document, merge_report))
    }

    fn write_localized(
        &self,
        path: &Path,
        artifact: &Artifact,
        merged: &[(&str, Document)],
        report: &mut ArtifactReport,
    ) -> Result<(), Error> {
        let Some(injectable) = artifact.as_injectable() else {
            debug!("{} is extract-only; no localized copies", path.display());
            return Ok(());
        };
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        let relative_dir = self
            .config
            .relative_path(path)
            .and_then(Path::parent)
            .unwrap_or(Path::new(""));
        let output_dir = self.config.output_root().join(relative_dir);

        for (language, document) in merged {
            let output = output_dir.join(artifact.format().localized_path(file_name, language));
            match reinject(&injectable, document, &output) {
                Ok(()) => {
                    info!("Wrote {}", output.display());
                    report.localized.push(output);
                }
                Err(e @ Error::MissingTranslation { .. }) => {
                    error!("{e}");
                    report.errors.push(e.to_string());
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// The path recorded in documents. C# string classes are recorded under the
/// `.resx` they are eventually converted to.
fn document_original(relative: &str, format: FormatType) -> String {
    match (format, relative.strip_suffix(".cs")) {
        (FormatType::CSharp, Some(stem)) => format!("{stem}.resx"),
        _ => relative.to_string(),
    }
}

/// File name part shared by all documents of an artifact. `.resx` drops its
/// extension; other formats keep theirs so `Foo.resx` and `Foo.vsct` differ.
fn base_name(original: &str) -> String {
    let file_name = original.rsplit('/').next().unwrap_or(original);
    file_name
        .strip_suffix(".resx")
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_original_for_csharp() {
        assert_eq!(
            document_original("src/LocalizableStrings.cs", FormatType::CSharp),
            "src/LocalizableStrings.resx"
        );
        assert_eq!(
            document_original("src/Strings.resx", FormatType::Resx),
            "src/Strings.resx"
        );
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("src/Strings.resx"), "Strings");
        assert_eq!(base_name("src/LocalizableStrings.resx"), "LocalizableStrings");
        assert_eq!(base_name("Menus.vsct"), "Menus.vsct");
        assert_eq!(base_name("Rules/General.xaml"), "General.xaml");
    }

    #[test]
    fn test_run_report_totals() {
        let mut run = RunReport::default();
        let mut converted = ArtifactReport::new(Path::new("a.resx"), "a.resx".into(), FormatType::Resx);
        converted.documents = vec![PathBuf::from("xlf/a.de.xlf"), PathBuf::from("xlf/a.xlf")];
        converted.merge.added = 3;
        let mut empty = ArtifactReport::new(Path::new("b.resx"), "b.resx".into(), FormatType::Resx);
        empty.status = ArtifactStatus::Empty;
        run.push(converted);
        run.push(empty);

        assert_eq!(run.artifacts, 2);
        assert_eq!(run.converted, 1);
        assert_eq!(run.skipped, 1);
        assert_eq!(run.documents_written, 2);
        assert_eq!(run.merge.added, 3);
        assert!(!run.has_errors());
    }
}
