//! The language-neutral template derived from a merged document.

use crate::xliff::{Document, Retained};

/// Copies `document` without its target language, without any target
/// text or state, and without content retained from translation tools.
///
/// The result depends only on the source side, so every language document
/// of one artifact yields the same template.
pub fn neutral_template(document: &Document) -> Document {
    let mut template = document.clone();
    template.target_language = None;
    for unit in &mut template.units {
        unit.target = None;
        unit.state = None;
        unit.retained = Retained::default();
    }
    template
}
