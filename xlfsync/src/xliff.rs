//! XLIFF 1.2 translation memory documents.
//!
//! One [`Document`] holds every translation of one artifact into one
//! language. The modelled layout is narrow: a single `<file>` with a single
//! `<group>` whose `<trans-unit>`s carry a `<source>`, an optional
//! `<target state="...">` and an optional attribute-less `<note>`.
//!
//! Anything else a translation tool put inside a `<trans-unit>` (extra
//! attributes, inline markup in the target, `<alt-trans>`, notes from other
//! authors) is kept in [`Retained`] and written back as it was read, so
//! rewriting a document never loses translator work.

use std::{
    collections::HashSet,
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attributes},
};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{error::Error, source::SourceText, traits::Parser, types::TargetState};

pub const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "urn:oasis:names:tc:xliff:document:1.2 xliff-core-1.2-transitional.xsd";
const DEFAULT_DATATYPE: &str = "xml";

/// `<trans-unit>` attributes the writer always emits itself.
const OWN_UNIT_ATTRIBUTES: [&[u8]; 3] = [b"id", b"translate", b"xml:space"];

/// A translation memory document for one artifact and, unless it is the
/// neutral template, one target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub source_language: String,
    pub target_language: Option<String>,
    /// Forward-slash relative path of the artifact.
    pub original: String,
    pub datatype: String,
    pub group_id: String,
    pub units: Vec<Unit>,
}

/// One `<trans-unit>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub id: String,
    pub source: String,
    /// Plain text of the target; inline markup is flattened away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TargetState>,
    /// The developer comment carried over from the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Retained::is_empty")]
    pub retained: Retained,
}

/// Content of a `<trans-unit>` that is not modelled by [`Unit`] but written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Retained {
    /// `<trans-unit>` attributes other than `id`, `translate` and `xml:space`,
    /// unescaped.
    pub attributes: Vec<(String, String)>,
    /// `<target>` attributes other than `state`, unescaped.
    pub target_attributes: Vec<(String, String)>,
    /// The target's inner XML when it holds markup or CDATA.
    pub target_markup: Option<Markup>,
    /// Raw XML of every other child element, in document order.
    pub children: Vec<String>,
}

/// Inner XML of a `<target>` together with the plain text it flattens to.
///
/// The markup is only written back while [`Unit::target`] still equals
/// `text`; an edited target is written as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Markup {
    pub text: String,
    pub xml: String,
}

impl Retained {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.target_attributes.is_empty()
            && self.target_markup.is_none()
            && self.children.is_empty()
    }
}

impl Document {
    /// Creates an empty document for the artifact at `original`.
    pub fn new(
        original: impl Into<String>,
        source_language: impl Into<String>,
        target_language: Option<String>,
    ) -> Self {
        let original = original.into();
        Document {
            source_language: source_language.into(),
            target_language,
            group_id: original.clone(),
            original,
            datatype: DEFAULT_DATATYPE.to_string(),
            units: Vec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Serializes the document as indented XLIFF 1.2.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 2);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut xliff = BytesStart::new("xliff");
        xliff.push_attribute(("xmlns", XLIFF_NAMESPACE));
        xliff.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        xliff.push_attribute(("version", "1.2"));
        xliff.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
        xml_writer.write_event(Event::Start(xliff))?;

        let mut file = BytesStart::new("file");
        file.push_attribute(("datatype", self.datatype.as_str()));
        file.push_attribute(("source-language", self.source_language.as_str()));
        if let Some(target_language) = &self.target_language {
            file.push_attribute(("target-language", target_language.as_str()));
        }
        file.push_attribute(("original", self.original.as_str()));
        xml_writer.write_event(Event::Start(file))?;
        xml_writer.write_event(Event::Start(BytesStart::new("body")))?;

        let mut group = BytesStart::new("group");
        group.push_attribute(("id", self.group_id.as_str()));
        xml_writer.write_event(Event::Start(group))?;

        for unit in &self.units {
            write_unit(&mut xml_writer, unit)?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("group")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("body")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("file")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("xliff")))?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Writes the document to `path` through a temporary file in the same
    /// directory, so readers never observe a partially written document.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            self.to_writer(&mut writer)?;
            writer.flush()?;
        }
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn write_unit<W: Write>(xml_writer: &mut Writer<W>, unit: &Unit) -> Result<(), Error> {
    let retained = &unit.retained;

    let mut trans_unit = BytesStart::new("trans-unit");
    trans_unit.push_attribute(("id", unit.id.as_str()));
    trans_unit.push_attribute(("translate", "yes"));
    trans_unit.push_attribute(("xml:space", "preserve"));
    for (name, value) in &retained.attributes {
        trans_unit.push_attribute((name.as_str(), value.as_str()));
    }
    xml_writer.write_event(Event::Start(trans_unit))?;

    write_text_element(xml_writer, BytesStart::new("source"), &unit.source)?;

    if unit.target.is_some() || unit.state.is_some() {
        let mut target = BytesStart::new("target");
        if let Some(state) = unit.state {
            target.push_attribute(("state", state.as_str()));
        }
        for (name, value) in &retained.target_attributes {
            target.push_attribute((name.as_str(), value.as_str()));
        }
        let text = unit.target.as_deref().unwrap_or_default();
        match &retained.target_markup {
            Some(markup) if markup.text == text => {
                let end = target.to_end().into_owned();
                xml_writer.write_event(Event::Start(target))?;
                xml_writer.write_event(Event::Text(BytesText::from_escaped(markup.xml.as_str())))?;
                xml_writer.write_event(Event::End(end))?;
            }
            _ => write_text_element(xml_writer, target, text)?,
        }
    }

    if let Some(note) = &unit.note {
        write_text_element(xml_writer, BytesStart::new("note"), note)?;
    }

    for child in &retained.children {
        xml_writer.write_indent()?;
        xml_writer.get_mut().write_all(child.as_bytes())?;
    }

    xml_writer.write_event(Event::End(BytesEnd::new("trans-unit")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml_writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), Error> {
    if text.is_empty() {
        xml_writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    let end = start.to_end().into_owned();
    xml_writer.write_event(Event::Start(start))?;
    xml_writer.write_event(Event::Text(BytesText::new(text)))?;
    xml_writer.write_event(Event::End(end))?;
    Ok(())
}

#[derive(Debug, Default)]
struct OpenUnit {
    id: String,
    source: Option<String>,
    target: Option<String>,
    state: Option<TargetState>,
    note: Option<String>,
    retained: Retained,
}

impl OpenUnit {
    /// Records one direct child of the `<trans-unit>`. `content` is the
    /// child's inner XML and `raw` the whole element.
    fn child(&mut self, element: &BytesStart<'_>, content: &str, raw: &str) -> Result<(), Error> {
        match element.local_name().as_ref() {
            b"source" if self.source.is_none() => {
                self.source = Some(flatten(content)?.0);
            }
            b"target" if self.target.is_none() => {
                for attr in element.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?.into_owned();
                    if attr.key.local_name().as_ref() == b"state" {
                        self.state = Some(value.parse()?);
                    } else {
                        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        self.retained.target_attributes.push((name, value));
                    }
                }
                let (text, has_markup) = flatten(content)?;
                if has_markup {
                    self.retained.target_markup = Some(Markup {
                        text: text.clone(),
                        xml: content.to_string(),
                    });
                }
                self.target = Some(text);
            }
            b"note" if self.note.is_none() && element.attributes().next().is_none() => {
                self.note = Some(flatten(content)?.0);
            }
            _ => self.retained.children.push(raw.to_string()),
        }
        Ok(())
    }

    fn finish(self) -> Result<Unit, Error> {
        let source = self.source.ok_or_else(|| {
            Error::syntax(format!("trans-unit `{}` has no <source>", self.id))
        })?;
        Ok(Unit {
            id: self.id,
            source,
            target: self.target,
            state: self.state,
            note: self.note,
            retained: self.retained,
        })
    }
}

/// Reads the children of a `<trans-unit>` whose start tag was just read,
/// up to and including its end tag.
fn read_unit(reader: &mut Reader<&[u8]>, text: &str, mut unit: OpenUnit) -> Result<Unit, Error> {
    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                let inner = reader.read_to_end(e.name())?;
                let after = reader.buffer_position() as usize;
                let content = &text[inner.start as usize..inner.end as usize];
                unit.child(&e, content, &text[before..after])?;
            }
            Event::Empty(e) => {
                let after = reader.buffer_position() as usize;
                unit.child(&e, "", &text[before..after])?;
            }
            Event::End(_) => return unit.finish(),
            Event::Eof => {
                return Err(Error::syntax(format!("trans-unit `{}` is not closed", unit.id)));
            }
            _ => {}
        }
    }
}

/// Plain text of an element's inner XML, and whether anything other than
/// character data was found.
fn flatten(content: &str) -> Result<(String, bool), Error> {
    let mut reader = Reader::from_str(content);
    let mut text = String::new();
    let mut has_markup = false;
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => {
                has_markup = true;
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::Eof => break,
            _ => has_markup = true,
        }
    }
    Ok((text, has_markup))
}

#[derive(Debug, Default)]
struct FileAttributes {
    source_language: Option<String>,
    target_language: Option<String>,
    original: Option<String>,
    datatype: Option<String>,
}

impl Parser for Document {
    fn from_text(source: SourceText) -> Result<Self, Error> {
        let text = source.as_str();
        let mut reader = Reader::from_str(text);

        let mut seen_root = false;
        let mut file: Option<FileAttributes> = None;
        let mut group_id: Option<String> = None;
        let mut units = Vec::new();
        let mut ids = HashSet::new();

        loop {
            let event = reader.read_event()?;
            let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                if matches!(event, Event::Eof) {
                    break;
                }
                continue;
            };
            let is_empty = matches!(event, Event::Empty(_));

            if !seen_root {
                if e.local_name().as_ref() != b"xliff" {
                    return Err(Error::syntax("root element is not <xliff>"));
                }
                seen_root = true;
                continue;
            }

            match e.local_name().as_ref() {
                b"file" if file.is_none() => {
                    file = Some(file_attributes(e.attributes())?);
                }
                b"group" if group_id.is_none() => {
                    group_id = attribute(e.attributes(), b"id")?;
                }
                b"trans-unit" => {
                    let mut unit = OpenUnit::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"id" => unit.id = value,
                            name if OWN_UNIT_ATTRIBUTES.contains(&name) => {}
                            name => unit
                                .retained
                                .attributes
                                .push((String::from_utf8_lossy(name).into_owned(), value)),
                        }
                    }
                    if unit.id.is_empty() {
                        return Err(Error::syntax("trans-unit missing 'id'"));
                    }
                    if !ids.insert(unit.id.clone()) {
                        return Err(Error::syntax(format!(
                            "duplicate trans-unit id `{}`",
                            unit.id
                        )));
                    }
                    let unit = if is_empty {
                        unit.finish()?
                    } else {
                        read_unit(&mut reader, text, unit)?
                    };
                    units.push(unit);
                }
                _ => {}
            }
        }

        let file = file.ok_or_else(|| Error::syntax("document has no <file> element"))?;
        let original = file
            .original
            .ok_or_else(|| Error::syntax("file element missing 'original'"))?;
        Ok(Document {
            source_language: file
                .source_language
                .ok_or_else(|| Error::syntax("file element missing 'source-language'"))?,
            target_language: file.target_language,
            group_id: group_id.unwrap_or_else(|| original.clone()),
            original,
            datatype: file.datatype.unwrap_or_else(|| DEFAULT_DATATYPE.to_string()),
            units,
        })
    }
}

fn attribute(attributes: Attributes<'_>, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in attributes {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn file_attributes(attributes: Attributes<'_>) -> Result<FileAttributes, Error> {
    let mut file = FileAttributes::default();
    for attr in attributes {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.local_name().as_ref() {
            b"source-language" => file.source_language = Some(value),
            b"target-language" => file.target_language = Some(value),
            b"original" => file.original = Some(value),
            b"datatype" => file.datatype = Some(value),
            _ => {}
        }
    }
    Ok(file)
}
