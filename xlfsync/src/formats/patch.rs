//! Byte-range splicing used by the injectable markup formats.
//!
//! Adapters record where every translatable string lives in the decoded
//! text. Reinjection copies the text verbatim and only rewrites those
//! ranges, so whitespace, comments and attribute order elsewhere survive
//! unchanged.

use std::{io::Write, ops::Range};

use quick_xml::escape::{escape, partial_escape, unescape};

use crate::{error::Error, source::SourceText, types::Translations};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatchKind {
    /// Element content between a start tag and its end tag.
    Text,
    /// Attribute value between its quotes.
    Attribute,
    /// A self-closing element that has to be expanded to hold text.
    EmptyElement { qname: String },
}

/// One translatable position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Patch {
    pub id: String,
    pub range: Range<usize>,
    /// Unescaped text currently at `range`.
    pub original: String,
    pub kind: PatchKind,
}

impl Patch {
    fn render(&self, raw: &str, translated: &str) -> String {
        match &self.kind {
            PatchKind::Text => partial_escape(translated).into_owned(),
            PatchKind::Attribute => escape(translated).into_owned(),
            PatchKind::EmptyElement { qname } => {
                let open = raw.trim_end_matches('>').trim_end_matches('/').trim_end();
                format!("{open}>{}</{qname}>", partial_escape(translated))
            }
        }
    }
}

/// Writes `source` to `writer` with every patch replaced by its translation.
///
/// All ids are checked before the first byte is written. A translation equal
/// to the original text keeps the original bytes, escapes included.
pub(crate) fn apply<W: Write>(
    source: &SourceText,
    patches: &[Patch],
    translations: &Translations,
    mut writer: W,
) -> Result<(), Error> {
    if let Some(missing) = patches.iter().find(|p| !translations.contains_key(&p.id)) {
        return Err(Error::missing_translation("", &missing.id));
    }

    let text = source.as_str();
    let mut ordered: Vec<&Patch> = patches.iter().collect();
    ordered.sort_by_key(|p| p.range.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for patch in ordered {
        out.push_str(&text[cursor..patch.range.start]);
        let raw = &text[patch.range.clone()];
        let translated = &translations[&patch.id];
        if *translated == patch.original {
            out.push_str(raw);
        } else {
            out.push_str(&patch.render(raw, translated));
        }
        cursor = patch.range.end;
    }
    out.push_str(&text[cursor..]);

    source.write_encoded(&mut writer, &out)?;
    writer.flush()?;
    Ok(())
}

/// An attribute found by [`scan_attributes`], with its value range relative
/// to the start of the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttribute<'a> {
    pub name: &'a str,
    pub value: Range<usize>,
    raw_value: &'a str,
}

impl RawAttribute<'_> {
    /// Attribute name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(self.name)
    }

    pub fn unescaped_value(&self) -> Result<String, Error> {
        unescape(self.raw_value)
            .map(|v| v.into_owned())
            .map_err(|e| Error::syntax(format!("attribute `{}`: {e}", self.name)))
    }
}

/// Lists the attributes of a raw start or empty tag such as `<a x="1" y='2'/>`.
///
/// quick-xml validates the tag; this only recovers the byte positions that
/// its attribute iterator does not expose.
pub(crate) fn scan_attributes(tag: &str) -> Result<Vec<RawAttribute<'_>>, Error> {
    let bytes = tag.as_bytes();
    let is_ws = |b: u8| b.is_ascii_whitespace();
    let at_tag_end = |i: usize| i >= bytes.len() || bytes[i] == b'/' || bytes[i] == b'>';

    let mut i = 1;
    while !at_tag_end(i) && !is_ws(bytes[i]) {
        i += 1;
    }

    let mut attributes = Vec::new();
    loop {
        while i < bytes.len() && is_ws(bytes[i]) {
            i += 1;
        }
        if at_tag_end(i) {
            break;
        }

        let name_start = i;
        while !at_tag_end(i) && !is_ws(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        let name = &tag[name_start..i];

        while i < bytes.len() && is_ws(bytes[i]) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            return Err(Error::syntax(format!("attribute `{name}` has no value")));
        }
        i += 1;
        while i < bytes.len() && is_ws(bytes[i]) {
            i += 1;
        }

        let quote = match bytes.get(i) {
            Some(b'"') => '"',
            Some(b'\'') => '\'',
            _ => return Err(Error::syntax(format!("attribute `{name}` is not quoted"))),
        };
        i += 1;
        let value_start = i;
        let value_len = tag[i..]
            .find(quote)
            .ok_or_else(|| Error::syntax(format!("attribute `{name}` is not terminated")))?;
        i += value_len;

        attributes.push(RawAttribute {
            name,
            value: value_start..i,
            raw_value: &tag[value_start..i],
        });
        i += 1;
    }

    Ok(attributes)
}
