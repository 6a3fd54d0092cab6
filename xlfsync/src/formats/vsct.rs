//! Support for Visual Studio command table (`.vsct`) files.
//!
//! Buttons, menus and groups carry their user-visible text in a `<Strings>`
//! child. Every element inside `<Strings>` except `<CanonicalName>` becomes
//! a translation unit with id `"<owner id>|<element name>"`.

use std::io::Write;

use quick_xml::{Reader, events::Event};

use crate::{
    error::Error,
    formats::patch::{self, Patch, PatchKind, scan_attributes},
    source::SourceText,
    traits::{Extract, Inject, Parser, Units},
    types::{TranslationUnit, Translations},
};

const STRINGS: &[u8] = b"Strings";
/// Non-localized command name; `LocCanonicalName` is the localizable variant.
const CANONICAL_NAME: &[u8] = b"CanonicalName";

/// A parsed `.vsct` file.
#[derive(Debug, Clone)]
pub struct VsctFile {
    source: SourceText,
    strings: Vec<Patch>,
}

#[derive(Debug)]
struct Frame {
    local_name: Vec<u8>,
    id: Option<String>,
}

/// A `<Strings>` child whose content is still being read.
#[derive(Debug)]
struct OpenString {
    id: String,
    depth: usize,
    content_start: usize,
    value: String,
}

impl Parser for VsctFile {
    fn from_text(source: SourceText) -> Result<Self, Error> {
        let text = source.as_str();
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Frame> = Vec::new();
        let mut open: Option<OpenString> = None;
        let mut strings = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let local_name = e.local_name().as_ref().to_vec();
                    let tag = &text[before..after];

                    let in_strings = open.is_none()
                        && stack.last().is_some_and(|f| f.local_name == STRINGS)
                        && local_name != CANONICAL_NAME;
                    if in_strings {
                        let id = string_id(&stack, &local_name)?;
                        if is_empty {
                            strings.push(Patch {
                                id,
                                range: before..after,
                                original: String::new(),
                                kind: PatchKind::EmptyElement {
                                    qname: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                                },
                            });
                        } else {
                            open = Some(OpenString {
                                id,
                                depth: stack.len(),
                                content_start: after,
                                value: String::new(),
                            });
                        }
                    }

                    if !is_empty {
                        stack.push(Frame {
                            local_name,
                            id: attribute_id(tag)?,
                        });
                    }
                }
                Event::Text(ref t) => {
                    if let Some(s) = open.as_mut() {
                        s.value.push_str(&t.unescape()?);
                    }
                }
                Event::CData(ref c) => {
                    if let Some(s) = open.as_mut() {
                        s.value.push_str(&String::from_utf8_lossy(c));
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    if open.as_ref().is_some_and(|s| s.depth == stack.len()) {
                        if let Some(s) = open.take() {
                            strings.push(Patch {
                                id: s.id,
                                range: s.content_start..before,
                                original: s.value,
                                kind: PatchKind::Text,
                            });
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(VsctFile { source, strings })
    }
}

fn attribute_id(tag: &str) -> Result<Option<String>, Error> {
    scan_attributes(tag)?
        .into_iter()
        .find(|a| a.name == "id")
        .map(|a| a.unescaped_value())
        .transpose()
}

/// Builds `"<owner id>|<child name>"`; the owner is the parent of `<Strings>`.
fn string_id(stack: &[Frame], child: &[u8]) -> Result<String, Error> {
    let owner = stack
        .len()
        .checked_sub(2)
        .and_then(|i| stack[i].id.as_deref())
        .ok_or_else(|| Error::syntax("Strings element has no owner with an 'id' attribute"))?;
    Ok(format!("{owner}|{}", String::from_utf8_lossy(child)))
}

impl Extract for VsctFile {
    fn units(&self) -> Units<'_> {
        Box::new(
            self.strings
                .iter()
                .map(|p| TranslationUnit::new(&p.id, &p.original)),
        )
    }
}

impl Inject for VsctFile {
    fn inject_to_writer<W: Write>(
        &self,
        writer: W,
        translations: &Translations,
    ) -> Result<(), Error> {
        patch::apply(&self.source, &self.strings, translations, writer)
    }
}
