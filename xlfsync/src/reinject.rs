//! Writing translations from a document back into an artifact copy.

use std::path::Path;

use crate::{error::Error, traits::Inject, types::Translations, xliff::Document};

/// Builds the id-to-text mapping for reinjection.
///
/// Units without a translation fall back to their source text, so a
/// partially translated document still produces a complete artifact.
pub fn translations_for(document: &Document) -> Translations {
    document
        .units
        .iter()
        .map(|unit| {
            let text = match unit.target.as_deref() {
                Some(target) if !target.is_empty() => target,
                _ => unit.source.as_str(),
            };
            (unit.id.clone(), text.to_string())
        })
        .collect()
}

/// Writes a localized copy of `artifact` to `output` using the translations
/// stored in `document`.
///
/// Fails with [`Error::MissingTranslation`] naming `output` when the
/// document lacks an id the artifact extracts.
pub fn reinject<A: Inject>(artifact: &A, document: &Document, output: &Path) -> Result<(), Error> {
    let translations = translations_for(document);
    artifact
        .inject(output, &translations)
        .map_err(|e| e.in_artifact(output))
}
