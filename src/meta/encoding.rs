//! Length-limited bit-packed string compression.
//!
//! Namespaces and type names are dominated by lowercase ASCII, so the codec
//! packs them below one byte per character when it can. The payload layout is
//! a little-endian bit stream:
//!
//! ```text
//! bits 0-2   encoding tag (MetaEncoding)
//! bit  3     strip flag: 1 when a full padding character was appended
//! bits 4..   packed characters, LSB-first, 5 or 6 bits each
//! ```
//!
//! For [`MetaEncoding::Utf8`] the first byte carries only the tag and the
//! raw UTF-8 bytes follow unpacked.
//!
//! The encoder always selects the smallest representation that preserves the
//! source string exactly.

use crate::error::{PolycodeError, Result};

/// Hard cap on identifier length, bounding decode-side allocation.
pub const MAX_META_STRING_LEN: usize = 32767;

/// Alphabet selector stored in the low 3 bits of the payload's first byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaEncoding {
    /// 5 bits/char: `a-z`, `.`, `_`, `$`, `|`.
    LowerSpecial = 0,
    /// 6 bits/char: `a-z`, `A-Z`, `0-9`, `.`, `_`.
    LowerUpperDigitSpecial = 1,
    /// 5 bits/char; the source's first letter was uppercase and is stored
    /// lowered.
    FirstToLowerSpecial = 2,
    /// 5 bits/char; every uppercase letter is stored as `|` + lowered char.
    AllToLowerSpecial = 3,
    /// Plain UTF-8 fallback.
    Utf8 = 4,
}

impl MetaEncoding {
    /// Decodes the tag bits of a payload header.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::LowerSpecial),
            1 => Some(Self::LowerUpperDigitSpecial),
            2 => Some(Self::FirstToLowerSpecial),
            3 => Some(Self::AllToLowerSpecial),
            4 => Some(Self::Utf8),
            _ => None,
        }
    }

    fn bits_per_char(self) -> usize {
        match self {
            Self::LowerUpperDigitSpecial => 6,
            _ => 5,
        }
    }
}

// --- ALPHABETS ---

fn lower_value(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a'),
        '.' => Some(26),
        '_' => Some(27),
        '$' => Some(28),
        '|' => Some(29),
        _ => None,
    }
}

fn lower_char(v: u8) -> Option<char> {
    match v {
        0..=25 => Some((b'a' + v) as char),
        26 => Some('.'),
        27 => Some('_'),
        28 => Some('$'),
        29 => Some('|'),
        _ => None,
    }
}

fn luds_value(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a'),
        'A'..='Z' => Some(c as u8 - b'A' + 26),
        '0'..='9' => Some(c as u8 - b'0' + 52),
        '.' => Some(62),
        '_' => Some(63),
        _ => None,
    }
}

fn luds_char(v: u8) -> Option<char> {
    match v {
        0..=25 => Some((b'a' + v) as char),
        26..=51 => Some((b'A' + v - 26) as char),
        52..=61 => Some((b'0' + v - 52) as char),
        62 => Some('.'),
        63 => Some('_'),
        _ => None,
    }
}

// --- BIT STREAM ---

struct BitWriter {
    bytes: Vec<u8>,
    bit: usize,
}

impl BitWriter {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            bit: 0,
        }
    }

    fn put(&mut self, value: u8, width: usize) {
        for i in 0..width {
            let byte_idx = self.bit / 8;
            if byte_idx == self.bytes.len() {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1 {
                self.bytes[byte_idx] |= 1 << (self.bit % 8);
            }
            self.bit += 1;
        }
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn take(&mut self, width: usize) -> u8 {
        let mut value = 0u8;
        for i in 0..width {
            let byte_idx = self.bit / 8;
            if (self.bytes[byte_idx] >> (self.bit % 8)) & 1 == 1 {
                value |= 1 << i;
            }
            self.bit += 1;
        }
        value
    }
}

// --- ENCODER ---

/// Selects the smallest encoding that preserves `s` exactly.
fn choose_encoding(s: &str) -> MetaEncoding {
    if s.is_empty() {
        return MetaEncoding::LowerSpecial;
    }
    let mut all_lower = true;
    let mut all_luds = true;
    let mut lowerable = true; // every char is lower-alphabet or ASCII uppercase
    let mut has_pipe = false;
    let mut upper_count = 0usize;
    let mut first_is_upper = false;
    for (i, c) in s.chars().enumerate() {
        if c == '|' {
            has_pipe = true;
        }
        if c.is_ascii_uppercase() {
            upper_count += 1;
            if i == 0 {
                first_is_upper = true;
            }
            all_lower = false;
        } else if lower_value(c).is_none() {
            all_lower = false;
            lowerable = false;
        }
        if luds_value(c).is_none() {
            all_luds = false;
        }
        if c.is_ascii_uppercase() && lower_value(c.to_ascii_lowercase()).is_none() {
            lowerable = false;
        }
    }
    if all_lower {
        return MetaEncoding::LowerSpecial;
    }
    if lowerable && upper_count == 1 && first_is_upper {
        return MetaEncoding::FirstToLowerSpecial;
    }
    let n = s.chars().count();
    if lowerable && !has_pipe {
        let escaped_bits = 5 * (n + upper_count);
        if !all_luds || escaped_bits < 6 * n {
            return MetaEncoding::AllToLowerSpecial;
        }
    }
    if all_luds {
        return MetaEncoding::LowerUpperDigitSpecial;
    }
    MetaEncoding::Utf8
}

/// Encodes an identifier, selecting the smallest representation.
///
/// # Errors
/// [`PolycodeError::Malformed`] when the string exceeds
/// [`MAX_META_STRING_LEN`].
pub fn encode(s: &str) -> Result<Vec<u8>> {
    encode_with(s, choose_encoding(s))
}

/// Encodes an identifier with an explicit encoding choice.
///
/// # Errors
/// [`PolycodeError::Malformed`] when the string exceeds
/// [`MAX_META_STRING_LEN`] or contains a character outside the chosen
/// alphabet.
pub fn encode_with(s: &str, encoding: MetaEncoding) -> Result<Vec<u8>> {
    if s.chars().count() > MAX_META_STRING_LEN {
        return Err(PolycodeError::Malformed(format!(
            "Meta-string of {} chars exceeds limit {MAX_META_STRING_LEN}",
            s.chars().count()
        )));
    }
    if encoding == MetaEncoding::Utf8 {
        let mut out = Vec::with_capacity(1 + s.len());
        out.push(MetaEncoding::Utf8 as u8);
        out.extend_from_slice(s.as_bytes());
        return Ok(out);
    }

    // Materialize the transformed character stream first: the strip flag
    // depends on the final character count.
    let mut values: Vec<u8> = Vec::with_capacity(s.len() + 1);
    match encoding {
        MetaEncoding::LowerSpecial => {
            for c in s.chars() {
                values.push(char_value_or_err(c, lower_value)?);
            }
        }
        MetaEncoding::FirstToLowerSpecial => {
            for (i, c) in s.chars().enumerate() {
                let c = if i == 0 { c.to_ascii_lowercase() } else { c };
                values.push(char_value_or_err(c, lower_value)?);
            }
        }
        MetaEncoding::AllToLowerSpecial => {
            for c in s.chars() {
                if c.is_ascii_uppercase() {
                    values.push(29); // '|' escape
                    values.push(char_value_or_err(c.to_ascii_lowercase(), lower_value)?);
                } else {
                    values.push(char_value_or_err(c, lower_value)?);
                }
            }
        }
        MetaEncoding::LowerUpperDigitSpecial => {
            for c in s.chars() {
                values.push(char_value_or_err(c, luds_value)?);
            }
        }
        MetaEncoding::Utf8 => unreachable!(),
    }

    let bpc = encoding.bits_per_char();
    let content_bits = 4 + bpc * values.len();
    let total_bytes = content_bits.div_ceil(8);
    let strip = (total_bytes * 8 - content_bits) >= bpc;

    let mut writer = BitWriter::new(total_bytes);
    writer.put(encoding as u8, 3);
    writer.put(u8::from(strip), 1);
    for v in values {
        writer.put(v, bpc);
    }
    Ok(writer.bytes)
}

fn char_value_or_err(c: char, table: fn(char) -> Option<u8>) -> Result<u8> {
    table(c).ok_or_else(|| {
        PolycodeError::Malformed(format!("Character {c:?} outside the meta-string alphabet"))
    })
}

// --- DECODER ---

/// Decodes a meta-string payload back to the source identifier.
///
/// # Errors
/// [`PolycodeError::Malformed`] for an empty payload, an unknown encoding
/// tag, an out-of-alphabet character value, invalid UTF-8, or a dangling
/// escape.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let header = *bytes
        .first()
        .ok_or_else(|| PolycodeError::Malformed("Empty meta-string payload".into()))?;
    let encoding = MetaEncoding::from_tag(header & 0x07)
        .ok_or_else(|| PolycodeError::Malformed(format!("Unknown meta-string encoding tag {}", header & 0x07)))?;

    if encoding == MetaEncoding::Utf8 {
        return String::from_utf8(bytes[1..].to_vec())
            .map_err(|_| PolycodeError::Malformed("Invalid UTF-8 in meta-string".into()));
    }

    let strip = (header >> 3) & 1 == 1;
    let bpc = encoding.bits_per_char();
    let avail = bytes.len() * 8 - 4;
    let mut count = avail / bpc;
    if strip {
        count = count.saturating_sub(1);
    }

    let mut reader = BitReader { bytes, bit: 4 };
    let mut chars: Vec<char> = Vec::with_capacity(count);
    for _ in 0..count {
        let v = reader.take(bpc);
        let c = match encoding {
            MetaEncoding::LowerUpperDigitSpecial => luds_char(v),
            _ => lower_char(v),
        }
        .ok_or_else(|| {
            PolycodeError::Malformed(format!("Value {v} outside the meta-string alphabet"))
        })?;
        chars.push(c);
    }

    match encoding {
        MetaEncoding::LowerSpecial | MetaEncoding::LowerUpperDigitSpecial => {
            Ok(chars.into_iter().collect())
        }
        MetaEncoding::FirstToLowerSpecial => {
            if let Some(first) = chars.first_mut() {
                *first = first.to_ascii_uppercase();
            }
            Ok(chars.into_iter().collect())
        }
        MetaEncoding::AllToLowerSpecial => {
            let mut out = String::with_capacity(chars.len());
            let mut iter = chars.into_iter();
            while let Some(c) = iter.next() {
                if c == '|' {
                    let escaped = iter.next().ok_or_else(|| {
                        PolycodeError::Malformed("Dangling escape in meta-string".into())
                    })?;
                    out.push(escaped.to_ascii_uppercase());
                } else {
                    out.push(c);
                }
            }
            Ok(out)
        }
        MetaEncoding::Utf8 => unreachable!(),
    }
}
