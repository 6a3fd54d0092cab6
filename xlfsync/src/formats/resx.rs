//! Support for .NET `.resx` resource files.
//!
//! Each `<data name="...">` element under `<root>` is one resource. Only
//! plain string resources with visible text are translatable; binary and
//! typed resources, designer bookkeeping and blank values are filtered out
//! before they ever reach a translation memory document.

use std::io::Write;

use quick_xml::{Reader, events::Event};

use crate::{
    error::Error,
    formats::patch::{self, Patch, PatchKind, scan_attributes},
    source::SourceText,
    traits::{Extract, Inject, Parser, Units},
    types::{TranslationUnit, Translations},
};

/// Key prefix the WinForms designer uses for its own bookkeeping entries.
const DESIGNER_PREFIX: &str = ">>";
/// Key suffix of WinForms layout settings.
const LAYOUT_SUFFIX: &str = ".LayoutSettings";

/// A parsed `.resx` file.
#[derive(Debug, Clone)]
pub struct ResxFile {
    source: SourceText,
    entries: Vec<ResxEntry>,
}

/// One `<data>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResxEntry {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
    /// The `type` attribute; present on non-string resources.
    pub type_name: Option<String>,
    /// The `mimetype` attribute; present on serialized objects.
    pub mime_type: Option<String>,
    value_patch: Option<Patch>,
}

impl ResxEntry {
    /// Whether the entry belongs in a translation snapshot.
    ///
    /// Excluded are entries that declare a value type or mime type, designer
    /// keys (`>>...`, `*.LayoutSettings`) and empty or whitespace-only values.
    pub fn is_localizable(&self) -> bool {
        if self.type_name.is_some() || self.mime_type.is_some() {
            return false;
        }
        if self.name.starts_with(DESIGNER_PREFIX) || self.name.ends_with(LAYOUT_SUFFIX) {
            return false;
        }
        !self.value.trim().is_empty()
    }

    fn to_unit(&self) -> TranslationUnit {
        let unit = TranslationUnit::new(&self.name, &self.value);
        match &self.comment {
            Some(comment) => unit.with_note(comment),
            None => unit,
        }
    }
}

impl ResxFile {
    /// All `<data>` entries in document order, before filtering.
    pub fn entries(&self) -> &[ResxEntry] {
        &self.entries
    }

    fn localizable(&self) -> impl Iterator<Item = &ResxEntry> {
        self.entries.iter().filter(|e| e.is_localizable())
    }
}

/// Which child of `<data>` is currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Value,
    Comment,
}

#[derive(Debug, Default)]
struct OpenEntry {
    entry: Option<ResxEntry>,
    field: Option<(Field, usize, String)>,
}

impl Parser for ResxFile {
    fn from_text(source: SourceText) -> Result<Self, Error> {
        let text = source.as_str();
        let mut reader = Reader::from_str(text);

        let mut depth = 0usize;
        let mut open = OpenEntry::default();
        let mut entries = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let local = e.local_name();
                    let tag = &text[before..after];

                    match (depth, local.as_ref()) {
                        (1, b"data") => {
                            let entry = start_entry(tag)?;
                            if is_empty {
                                entries.push(entry);
                            } else {
                                open.entry = Some(entry);
                            }
                        }
                        (2, b"value") | (2, b"comment") if open.entry.is_some() => {
                            let field = if local.as_ref() == b"value" {
                                Field::Value
                            } else {
                                Field::Comment
                            };
                            if is_empty {
                                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                                set_field(&mut open, field, String::new(), || Patch {
                                    id: String::new(),
                                    range: before..after,
                                    original: String::new(),
                                    kind: PatchKind::EmptyElement { qname },
                                });
                            } else {
                                open.field = Some((field, after, String::new()));
                            }
                        }
                        _ => {}
                    }

                    if !is_empty {
                        depth += 1;
                    }
                }
                Event::Text(ref t) => {
                    if let Some((_, _, buffer)) = open.field.as_mut() {
                        buffer.push_str(&t.unescape()?);
                    }
                }
                Event::CData(ref c) => {
                    if let Some((_, _, buffer)) = open.field.as_mut() {
                        buffer.push_str(&String::from_utf8_lossy(c));
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    match depth {
                        2 => {
                            if let Some((field, start, value)) = open.field.take() {
                                let original = value.clone();
                                set_field(&mut open, field, value, || Patch {
                                    id: String::new(),
                                    range: start..before,
                                    original,
                                    kind: PatchKind::Text,
                                });
                            }
                        }
                        1 => {
                            if let Some(entry) = open.entry.take() {
                                entries.push(entry);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(ResxFile { source, entries })
    }
}

fn start_entry(tag: &str) -> Result<ResxEntry, Error> {
    let mut name = None;
    let mut type_name = None;
    let mut mime_type = None;
    for attr in scan_attributes(tag)? {
        match attr.name {
            "name" => name = Some(attr.unescaped_value()?),
            "type" => type_name = Some(attr.unescaped_value()?),
            "mimetype" => mime_type = Some(attr.unescaped_value()?),
            _ => {}
        }
    }
    let name = name.ok_or_else(|| Error::syntax("data element missing 'name'"))?;
    Ok(ResxEntry {
        name,
        value: String::new(),
        comment: None,
        type_name,
        mime_type,
        value_patch: None,
    })
}

fn set_field(open: &mut OpenEntry, field: Field, value: String, patch: impl FnOnce() -> Patch) {
    let Some(entry) = open.entry.as_mut() else {
        return;
    };
    match field {
        Field::Value => {
            let mut patch = patch();
            patch.id = entry.name.clone();
            entry.value = value;
            entry.value_patch = Some(patch);
        }
        Field::Comment => {
            entry.comment = (!value.is_empty()).then_some(value);
        }
    }
}

impl Extract for ResxFile {
    fn units(&self) -> Units<'_> {
        Box::new(self.localizable().map(ResxEntry::to_unit))
    }
}

impl Inject for ResxFile {
    fn inject_to_writer<W: Write>(
        &self,
        writer: W,
        translations: &Translations,
    ) -> Result<(), Error> {
        let patches: Vec<Patch> = self
            .localizable()
            .filter_map(|e| e.value_patch.clone())
            .collect();
        patch::apply(&self.source, &patches, translations, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        <?xml version="1.0" encoding="utf-8"?>
        <root>
          <resheader name="resmimetype">
            <value>text/microsoft-resx</value>
          </resheader>
          <data name="Hello" xml:space="preserve">
            <value>Hello, world</value>
            <comment>Shown on start</comment>
          </data>
          <data name="Icon" type="System.Drawing.Icon, System.Drawing" mimetype="application/x-microsoft.net.object.bytearray.base64">
            <value>AAABAAEAEBAAAAEAIABoBAAAFgAAACgAAAAQAAAAIAAAAAEAIAAAAAAAAAQAAAAAAAAAAAAAAAAAAAAAAAA=</value>
          </data>
          <data name="&gt;&gt;button1.Name" xml:space="preserve">
            <value>button1</value>
          </data>
          <data name="panel.LayoutSettings" type="System.Windows.Forms.TableLayoutSettings, System.Windows.Forms">
            <value>&lt;TableLayoutSettings /&gt;</value>
          </data>
          <data name="Blank" xml:space="preserve">
            <value>   </value>
          </data>
          <data name="Empty" xml:space="preserve">
            <value />
          </data>
          <data name="Escaped" xml:space="preserve">
            <value>Fish &amp; Chips</value>
          </data>
        </root>
    "#};

    #[test]
    fn test_parse_all_entries() {
        let resx = ResxFile::from_str(SAMPLE).unwrap();
        let names: Vec<&str> = resx.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Hello",
                "Icon",
                ">>button1.Name",
                "panel.LayoutSettings",
                "Blank",
                "Empty",
                "Escaped"
            ]
        );
        let hello = &resx.entries()[0];
        assert_eq!(hello.value, "Hello, world");
        assert_eq!(hello.comment.as_deref(), Some("Shown on start"));
        assert!(resx.entries()[1].type_name.is_some());
    }

    #[test]
    fn test_units_apply_filtering_rule() {
        let resx = ResxFile::from_str(SAMPLE).unwrap();
        let units: Vec<TranslationUnit> = resx.units().collect();
        assert_eq!(
            units,
            vec![
                TranslationUnit::new("Hello", "Hello, world").with_note("Shown on start"),
                TranslationUnit::new("Escaped", "Fish & Chips"),
            ]
        );
    }

    #[test]
    fn test_units_are_restartable() {
        let resx = ResxFile::from_str(SAMPLE).unwrap();
        assert_eq!(resx.units().count(), 2);
        assert_eq!(resx.units().count(), 2);
    }

    #[test]
    fn test_missing_name_attribute() {
        let xml = "<root><data><value>x</value></data></root>";
        let err = ResxFile::from_str(xml).unwrap_err();
        assert!(err.to_string().contains("missing 'name'"));
    }

    #[test]
    fn test_identity_round_trip_is_byte_exact() {
        let resx = ResxFile::from_str(SAMPLE).unwrap();
        let identity: Translations = resx.units().map(|u| (u.id, u.source)).collect();
        let mut out = Vec::new();
        resx.inject_to_writer(&mut out, &identity).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }

    #[test]
    fn test_inject_replaces_values_only() {
        let resx = ResxFile::from_str(SAMPLE).unwrap();
        let mut translations = Translations::new();
        translations.insert("Hello".to_string(), "Hallo, Welt".to_string());
        translations.insert("Escaped".to_string(), "Fisch & Pommes".to_string());
        let mut out = Vec::new();
        resx.inject_to_writer(&mut out, &translations).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("<value>Hallo, Welt</value>"));
        assert!(out.contains("<value>Fisch &amp; Pommes</value>"));
        assert!(out.contains("<comment>Shown on start</comment>"));
        assert!(out.contains("<value>button1</value>"));

        let reparsed = ResxFile::from_str(&out).unwrap();
        assert_eq!(reparsed.entries().len(), resx.entries().len());
    }

    #[test]
    fn test_inject_requires_every_localizable_id() {
        let resx = ResxFile::from_str(SAMPLE).unwrap();
        let mut translations = Translations::new();
        translations.insert("Hello".to_string(), "Hallo".to_string());
        let err = resx
            .inject_to_writer(Vec::new(), &translations)
            .unwrap_err();
        assert!(matches!(err, Error::MissingTranslation { ref id, .. } if id == "Escaped"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = ResxFile::from_str("<root><data name=\"a\"><value>x</data></root>").unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));
    }
}
