//! Decoded artifact text that remembers how it was encoded on disk.

use std::io::Write;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::Error;

/// Text of one artifact with its byte-order mark stripped.
///
/// Reinjection writes localized copies in the encoding and with the mark the
/// original was read with, so they differ from it only at translatable
/// positions and keep agreeing with their own XML declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    bom: Option<&'static Encoding>,
}

impl SourceText {
    /// Decodes raw bytes, honouring a leading BOM and defaulting to UTF-8.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let (encoding, bom_len) = match Encoding::for_bom(bytes) {
            Some((encoding, len)) => (encoding, len),
            None => (UTF_8, 0),
        };
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(Error::syntax(format!(
                "content is not valid {}",
                encoding.name()
            )));
        }
        Ok(SourceText {
            text: text.into_owned(),
            bom: (bom_len > 0).then_some(encoding),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn has_bom(&self) -> bool {
        self.bom.is_some()
    }

    /// Writes `text` in the encoding this text was read with, byte-order
    /// mark included.
    ///
    /// `encoding_rs` has no UTF-16 encoder, so UTF-16 code units are
    /// serialized directly.
    pub fn write_encoded<W: Write>(&self, writer: &mut W, text: &str) -> Result<(), Error> {
        match self.bom {
            Some(encoding) if encoding == UTF_16LE => {
                let mut bytes = vec![0xFF, 0xFE];
                bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                writer.write_all(&bytes)?;
            }
            Some(encoding) if encoding == UTF_16BE => {
                let mut bytes = vec![0xFE, 0xFF];
                bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                writer.write_all(&bytes)?;
            }
            Some(_) => {
                writer.write_all(b"\xEF\xBB\xBF")?;
                writer.write_all(text.as_bytes())?;
            }
            None => writer.write_all(text.as_bytes())?,
        }
        Ok(())
    }
}

impl From<&str> for SourceText {
    fn from(value: &str) -> Self {
        SourceText {
            text: value.to_string(),
            bom: None,
        }
    }
}

impl From<String> for SourceText {
    fn from(value: String) -> Self {
        SourceText {
            text: value,
            bom: None,
        }
    }
}
