//! Support for XAML rule files (project system property pages).
//!
//! Only `DisplayName` and `Description` attributes are translatable. The id
//! of an attribute is `"<element>|<element Name>|<attribute>"`. Enum values
//! are qualified with their owning property, `"EnumValue|<owner>.<value>|<attribute>"`,
//! because different properties often declare members with the same name.

use std::io::Write;

use quick_xml::{Reader, events::Event};

use crate::{
    error::Error,
    formats::patch::{self, Patch, PatchKind, RawAttribute, scan_attributes},
    source::SourceText,
    traits::{Extract, Inject, Parser, Units},
    types::{TranslationUnit, Translations},
};

const TRANSLATABLE_ATTRIBUTES: [&str; 2] = ["DisplayName", "Description"];
const ENUM_VALUE: &str = "EnumValue";

/// A parsed `.xaml` file.
#[derive(Debug, Clone)]
pub struct XamlFile {
    source: SourceText,
    attributes: Vec<Patch>,
}

#[derive(Debug)]
struct Frame {
    local_name: String,
    name: Option<String>,
}

impl Parser for XamlFile {
    fn from_text(source: SourceText) -> Result<Self, Error> {
        let text = source.as_str();
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Frame> = Vec::new();
        let mut attributes = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let tag = &text[before..after];
                    let raw = scan_attributes(tag)?;
                    let frame = Frame {
                        local_name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        name: name_attribute(&raw)?,
                    };

                    for attr in raw
                        .iter()
                        .filter(|a| TRANSLATABLE_ATTRIBUTES.contains(&a.local_name()))
                    {
                        attributes.push(Patch {
                            id: attribute_id(&frame, stack.last(), attr.local_name())?,
                            range: before + attr.value.start..before + attr.value.end,
                            original: attr.unescaped_value()?,
                            kind: PatchKind::Attribute,
                        });
                    }

                    if matches!(event, Event::Start(_)) {
                        stack.push(frame);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(XamlFile { source, attributes })
    }
}

fn name_attribute(attributes: &[RawAttribute<'_>]) -> Result<Option<String>, Error> {
    attributes
        .iter()
        .find(|a| a.name == "Name")
        .map(RawAttribute::unescaped_value)
        .transpose()
}

fn required_name<'a>(frame: &'a Frame) -> Result<&'a str, Error> {
    frame.name.as_deref().ok_or_else(|| {
        Error::syntax(format!(
            "{} element has a translatable attribute but no 'Name'",
            frame.local_name
        ))
    })
}

/// Builds the id of a translatable attribute on `element`, whose parent is `parent`.
fn attribute_id(element: &Frame, parent: Option<&Frame>, attribute: &str) -> Result<String, Error> {
    let name = required_name(element)?;
    if element.local_name == ENUM_VALUE {
        let owner = parent
            .ok_or_else(|| Error::syntax("EnumValue element has no owning property"))
            .and_then(required_name)?;
        return Ok(format!("{ENUM_VALUE}|{owner}.{name}|{attribute}"));
    }
    Ok(format!("{}|{name}|{attribute}", element.local_name))
}

impl Extract for XamlFile {
    fn units(&self) -> Units<'_> {
        Box::new(
            self.attributes
                .iter()
                .map(|p| TranslationUnit::new(&p.id, &p.original)),
        )
    }
}

impl Inject for XamlFile {
    fn inject_to_writer<W: Write>(
        &self,
        writer: W,
        translations: &Translations,
    ) -> Result<(), Error> {
        patch::apply(&self.source, &self.attributes, translations, writer)
    }
}
