//! Character encodings for text fields (fixed `char` arrays and var-data).

use std::borrow::Cow;

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterEncoding {
    Ascii,
    Utf8,
    Latin1,
}

impl CharacterEncoding {
    /// Resolves a schema's `characterEncoding` attribute, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "ASCII" | "US-ASCII" => Some(CharacterEncoding::Ascii),
            "UTF-8" | "UTF8" => Some(CharacterEncoding::Utf8),
            "ISO-8859-1" | "ISO_8859_1" | "LATIN1" | "LATIN-1" => Some(CharacterEncoding::Latin1),
            _ => None,
        }
    }

    /// The canonical name reported by generated `*_CHARACTER_ENCODING` constants.
    pub const fn name(self) -> &'static str {
        match self {
            CharacterEncoding::Ascii => "US-ASCII",
            CharacterEncoding::Utf8 => "UTF-8",
            CharacterEncoding::Latin1 => "ISO-8859-1",
        }
    }
}

/// Decodes bytes read from a buffer. Invalid sequences become U+FFFD rather
/// than failing, since decoding is used on the read path and for display.
pub fn decode(bytes: &[u8], encoding: CharacterEncoding) -> String {
    match encoding {
        CharacterEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        CharacterEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        CharacterEncoding::Ascii => bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    }
}

/// Encodes a string for writing. UTF-8 borrows the string's own bytes.
pub fn encode(value: &str, encoding: CharacterEncoding) -> Result<Cow<'_, [u8]>, CodecError> {
    match encoding {
        CharacterEncoding::Utf8 => Ok(Cow::Borrowed(value.as_bytes())),
        CharacterEncoding::Ascii if value.is_ascii() => Ok(Cow::Borrowed(value.as_bytes())),
        CharacterEncoding::Ascii | CharacterEncoding::Latin1 => {
            let limit = if encoding == CharacterEncoding::Ascii { 0x7f } else { 0xff };
            value
                .chars()
                .map(|c| {
                    if (c as u32) <= limit {
                        Ok(c as u32 as u8)
                    } else {
                        Err(CodecError::Unrepresentable { encoding: encoding.name(), character: c })
                    }
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(Cow::Owned)
        }
    }
}

/// Length of the prefix of `bytes` that precedes the first NUL.
pub fn nul_terminated_len(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}
