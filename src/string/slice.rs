//! Validated UTF-8 string slices
//!
//! `StrSlice` pairs a `ByteSpan` with the invariant that the viewed bytes
//! are valid UTF-8, established exactly once at construction. All search,
//! split, and iteration logic lives here; the owning `FastString` delegates
//! to it. Offsets throughout are byte offsets; range slicing refuses to cut
//! through a multi-byte codepoint rather than silently corrupting it.

use crate::error::{Result, StrZipError};
use crate::span::{ByteSpan, ByteSpanMut};
use crate::string::owned::FastString;
use crate::string::parse;
use crate::utf8::{count_continuation_bytes, validate_utf8};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::str;

/// The ASCII whitespace set recognized by the default strip variants
pub const ASCII_WHITESPACE: &[u8] = &[
    b' ', b'\t', b'\n', b'\r', 0x0C, 0x0B, 0x1C, 0x1D, 0x1E,
];

/// Width in bytes of the UTF-8 sequence started by `lead`; 0 for
/// continuation bytes
#[inline]
pub(crate) fn utf8_char_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0x80..=0xBF => 0,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

#[inline]
fn is_char_boundary(bytes: &[u8], offset: usize) -> bool {
    offset == bytes.len() || bytes[offset] & 0xC0 != 0x80
}

/// Decode the codepoint starting at `bytes[0]`; the bytes must be valid
/// UTF-8 with a complete sequence at the front
#[inline]
pub(crate) fn decode_char(bytes: &[u8]) -> (char, usize) {
    let b0 = bytes[0] as u32;
    let cont = |i: usize| (bytes[i] & 0x3F) as u32;
    let (cp, width) = match bytes[0] {
        0x00..=0x7F => (b0, 1),
        0xC0..=0xDF => (((b0 & 0x1F) << 6) | cont(1), 2),
        0xE0..=0xEF => (((b0 & 0x0F) << 12) | (cont(1) << 6) | cont(2), 3),
        _ => {
            (
                ((b0 & 0x07) << 18) | (cont(1) << 12) | (cont(2) << 6) | cont(3),
                4,
            )
        }
    };
    debug_assert!(char::from_u32(cp).is_some());
    (unsafe { char::from_u32_unchecked(cp) }, width)
}

/// Zero-copy string slice with a UTF-8 validity proof
///
/// # Examples
///
/// ```rust
/// use strzip::StrSlice;
///
/// let s = StrSlice::from_str("hello world");
/// assert_eq!(s.byte_len(), 11);
/// assert_eq!(s.find(StrSlice::from_str("world")), Some(6));
/// ```
#[derive(Clone, Copy)]
pub struct StrSlice<'a> {
    span: ByteSpan<'a>,
}

impl<'a> StrSlice<'a> {
    /// Create a slice from a string literal or `&str` (always valid)
    #[inline]
    pub fn from_str(s: &'a str) -> Self {
        Self {
            span: ByteSpan::new(s.as_bytes()),
        }
    }

    /// Create a slice from bytes, validating them as UTF-8
    pub fn from_utf8(bytes: &'a [u8]) -> Result<Self> {
        if !validate_utf8(bytes) {
            return Err(StrZipError::invalid_utf8(format!(
                "{}-byte buffer is not well-formed UTF-8",
                bytes.len()
            )));
        }
        Ok(Self {
            span: ByteSpan::new(bytes),
        })
    }

    /// Create a slice from bytes without validating
    ///
    /// # Safety
    ///
    /// The caller must ensure `bytes` is valid UTF-8.
    #[inline]
    pub unsafe fn from_utf8_unchecked(bytes: &'a [u8]) -> Self {
        debug_assert!(validate_utf8(bytes));
        Self {
            span: ByteSpan::new(bytes),
        }
    }

    /// Create a slice from a raw pointer and length
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for `'a`, the memory
    /// must not be mutated during `'a`, and the bytes must be valid UTF-8.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Self {
        Self {
            span: unsafe { ByteSpan::from_raw_parts(ptr, len) },
        }
    }

    /// The underlying bytes
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.span.as_bytes()
    }

    /// The underlying span
    #[inline]
    pub fn as_span(&self) -> ByteSpan<'a> {
        self.span
    }

    /// View as `&str`; free because validity was established at construction
    #[inline]
    pub fn as_str(&self) -> &'a str {
        unsafe { str::from_utf8_unchecked(self.span.as_bytes()) }
    }

    /// Length in bytes
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.span.len()
    }

    /// Length in codepoints: byte length minus continuation bytes
    #[inline]
    pub fn char_len(&self) -> usize {
        self.span.len() - count_continuation_bytes(self.span.as_bytes())
    }

    /// True if the slice covers zero bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// One-byte sub-slice at a python-style byte index
    ///
    /// Fails on bytes belonging to a multi-byte codepoint, since a one-byte
    /// view of those would not be valid UTF-8.
    // TODO: index by codepoint and return the full multi-byte sub-slice
    pub fn byte_at(&self, index: isize) -> Result<StrSlice<'a>> {
        let len = self.byte_len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
                .ok_or_else(|| StrZipError::out_of_bounds(index.unsigned_abs(), len))?
        } else {
            index as usize
        };
        let byte = self.span.get(resolved as isize)?;
        if byte >= 0x80 {
            return Err(StrZipError::boundary(format!(
                "byte {resolved}: single-byte index into a multi-byte codepoint"
            )));
        }
        self.slice(resolved..resolved + 1)
    }

    /// Half-open byte-range sub-slice; both endpoints must fall on
    /// codepoint boundaries
    pub fn slice(&self, range: Range<usize>) -> Result<StrSlice<'a>> {
        let bytes = self.span.as_bytes();
        let sub = self.span.subspan(range.clone())?;
        for offset in [range.start, range.end] {
            if !is_char_boundary(bytes, offset) {
                return Err(StrZipError::boundary(format!(
                    "byte {offset}: slice index must fall on codepoint boundary"
                )));
            }
        }
        Ok(StrSlice { span: sub })
    }

    //--------------------------------------------------------------------------
    // Search
    //--------------------------------------------------------------------------

    /// Byte offset of the first occurrence of `needle`
    ///
    /// An empty needle matches at offset 0.
    pub fn find(&self, needle: StrSlice<'_>) -> Option<usize> {
        let haystack = self.as_bytes();
        let needle = needle.as_bytes();
        if needle.is_empty() {
            return Some(0);
        }
        if needle.len() > haystack.len() {
            return None;
        }
        if needle.len() == 1 {
            return haystack.iter().position(|&b| b == needle[0]);
        }
        (0..=haystack.len() - needle.len()).find(|&i| &haystack[i..i + needle.len()] == needle)
    }

    /// Byte offset of the last occurrence of `needle`
    ///
    /// An empty needle matches at `byte_len()`.
    pub fn rfind(&self, needle: StrSlice<'_>) -> Option<usize> {
        let haystack = self.as_bytes();
        let needle = needle.as_bytes();
        if needle.is_empty() {
            return Some(haystack.len());
        }
        if needle.len() > haystack.len() {
            return None;
        }
        if needle.len() == 1 {
            return haystack.iter().rposition(|&b| b == needle[0]);
        }
        (0..=haystack.len() - needle.len())
            .rev()
            .find(|&i| &haystack[i..i + needle.len()] == needle)
    }

    /// True if `needle` occurs in this slice
    #[inline]
    pub fn contains(&self, needle: StrSlice<'_>) -> bool {
        self.find(needle).is_some()
    }

    /// Number of non-overlapping occurrences of `needle`
    ///
    /// An empty needle is counted between every byte: `byte_len() + 1`.
    pub fn count(&self, needle: StrSlice<'_>) -> usize {
        if needle.is_empty() {
            return self.byte_len() + 1;
        }
        let mut count = 0;
        let mut rest = *self;
        while let Some(pos) = rest.find(needle) {
            count += 1;
            // Occurrence ends on a boundary whenever the needle is valid
            // UTF-8, so this re-slice cannot fail.
            rest = StrSlice {
                span: ByteSpan::new(&rest.as_bytes()[pos + needle.byte_len()..]),
            };
        }
        count
    }

    /// True if the slice begins with `prefix`
    #[inline]
    pub fn starts_with(&self, prefix: StrSlice<'_>) -> bool {
        self.as_bytes().starts_with(prefix.as_bytes())
    }

    /// True if the slice ends with `suffix`
    #[inline]
    pub fn ends_with(&self, suffix: StrSlice<'_>) -> bool {
        self.as_bytes().ends_with(suffix.as_bytes())
    }

    /// `starts_with` restricted to the byte window `[start, end)`;
    /// `end = None` means to the end of the slice
    pub fn starts_with_in(&self, prefix: StrSlice<'_>, start: usize, end: Option<usize>) -> bool {
        match self.window(start, end) {
            Some(window) => window.starts_with(prefix),
            None => false,
        }
    }

    /// `ends_with` restricted to the byte window `[start, end)`
    pub fn ends_with_in(&self, suffix: StrSlice<'_>, start: usize, end: Option<usize>) -> bool {
        match self.window(start, end) {
            Some(window) => window.ends_with(suffix),
            None => false,
        }
    }

    fn window(&self, start: usize, end: Option<usize>) -> Option<StrSlice<'a>> {
        let end = end.unwrap_or(self.byte_len()).min(self.byte_len());
        if start > end {
            return None;
        }
        self.slice(start..end).ok()
    }

    //--------------------------------------------------------------------------
    // Strip
    //--------------------------------------------------------------------------

    /// Strip the default whitespace set from both ends
    pub fn strip(&self) -> StrSlice<'a> {
        self.lstrip().rstrip()
    }

    /// Strip the default whitespace set from the front
    pub fn lstrip(&self) -> StrSlice<'a> {
        let bytes = self.as_bytes();
        let mut start = 0;
        while start < bytes.len() && ASCII_WHITESPACE.contains(&bytes[start]) {
            start += 1;
        }
        StrSlice {
            span: ByteSpan::new(&bytes[start..]),
        }
    }

    /// Strip the default whitespace set from the back
    pub fn rstrip(&self) -> StrSlice<'a> {
        let bytes = self.as_bytes();
        let mut end = bytes.len();
        while end > 0 && ASCII_WHITESPACE.contains(&bytes[end - 1]) {
            end -= 1;
        }
        StrSlice {
            span: ByteSpan::new(&bytes[..end]),
        }
    }

    /// Strip any codepoint present in `chars` from both ends
    pub fn strip_matches(&self, chars: StrSlice<'_>) -> StrSlice<'a> {
        self.lstrip_matches(chars).rstrip_matches(chars)
    }

    /// Strip any codepoint present in `chars` from the front, one codepoint
    /// at a time
    pub fn lstrip_matches(&self, chars: StrSlice<'_>) -> StrSlice<'a> {
        let mut rest = *self;
        loop {
            match rest.chars().peek() {
                Some(ch) if chars.chars().any(|c| c == ch) => {
                    let width = ch.len_utf8();
                    rest = StrSlice {
                        span: ByteSpan::new(&rest.as_bytes()[width..]),
                    };
                }
                _ => return rest,
            }
        }
    }

    /// Strip any codepoint present in `chars` from the back, one codepoint
    /// at a time
    pub fn rstrip_matches(&self, chars: StrSlice<'_>) -> StrSlice<'a> {
        let mut rest = *self;
        loop {
            match rest.chars().peek_back() {
                Some(ch) if chars.chars().any(|c| c == ch) => {
                    let width = ch.len_utf8();
                    rest = StrSlice {
                        span: ByteSpan::new(&rest.as_bytes()[..rest.byte_len() - width]),
                    };
                }
                _ => return rest,
            }
        }
    }

    //--------------------------------------------------------------------------
    // Split
    //--------------------------------------------------------------------------

    /// Split on every occurrence of `sep`, keeping empty fields
    ///
    /// `sep.join(s.split(sep))` reproduces `s`. An empty separator is a
    /// boundary violation.
    pub fn split(&self, sep: StrSlice<'_>) -> Result<Vec<StrSlice<'a>>> {
        if sep.is_empty() {
            return Err(StrZipError::boundary("empty separator in split"));
        }
        let bytes = self.as_bytes();
        let mut parts = Vec::new();
        let mut start = 0;
        let mut rest = *self;
        while let Some(pos) = rest.find(sep) {
            parts.push(StrSlice {
                span: ByteSpan::new(&bytes[start..start + pos]),
            });
            start += pos + sep.byte_len();
            rest = StrSlice {
                span: ByteSpan::new(&bytes[start..]),
            };
        }
        parts.push(rest);
        Ok(parts)
    }

    /// Split into lines on the universal-newline set
    ///
    /// Single-byte terminators `\n \v \f \r \x1c \x1d \x1e`, the pair
    /// `\r\n` as one boundary, and the multi-byte separators NEL (U+0085),
    /// LS (U+2028), PS (U+2029). `keepends` retains the terminator bytes in
    /// each yielded line.
    pub fn splitlines(&self, keepends: bool) -> Vec<StrSlice<'a>> {
        let bytes = self.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            let sep_len = match bytes[pos] {
                0x0A | 0x0B | 0x0C | 0x1C | 0x1D | 0x1E => 1,
                // \r\n is one boundary even though \r alone also terminates
                0x0D => {
                    if pos + 1 < bytes.len() && bytes[pos + 1] == 0x0A {
                        2
                    } else {
                        1
                    }
                }
                0xC2 if pos + 1 < bytes.len() && bytes[pos + 1] == 0x85 => 2,
                0xE2 if pos + 2 < bytes.len()
                    && bytes[pos + 1] == 0x80
                    && (bytes[pos + 2] == 0xA8 || bytes[pos + 2] == 0xA9) =>
                {
                    3
                }
                _ => {
                    pos += 1;
                    continue;
                }
            };
            let line_end = if keepends { pos + sep_len } else { pos };
            lines.push(StrSlice {
                span: ByteSpan::new(&bytes[start..line_end]),
            });
            pos += sep_len;
            start = pos;
        }
        if start < bytes.len() {
            lines.push(StrSlice {
                span: ByteSpan::new(&bytes[start..]),
            });
        }
        lines
    }

    //--------------------------------------------------------------------------
    // Codepoint iteration
    //--------------------------------------------------------------------------

    /// Iterate decoded codepoints
    #[inline]
    pub fn chars(&self) -> Chars<'a> {
        Chars {
            rest: self.as_bytes(),
        }
    }

    /// Iterate codepoint-width sub-slices (zero-copy)
    #[inline]
    pub fn char_slices(&self) -> CharSlices<'a> {
        CharSlices {
            rest: self.as_bytes(),
        }
    }

    //--------------------------------------------------------------------------
    // Classification
    //--------------------------------------------------------------------------

    /// True if non-empty and every codepoint is whitespace
    ///
    /// Whitespace is the ASCII strip set plus NEL, LS, and PS, matching the
    /// separators `splitlines` recognizes.
    pub fn is_space(&self) -> bool {
        !self.is_empty()
            && self.chars().all(|ch| match ch {
                '\u{85}' | '\u{2028}' | '\u{2029}' => true,
                ch if (ch as u32) < 0x80 => ASCII_WHITESPACE.contains(&(ch as u8)),
                _ => false,
            })
    }

    /// True if at least one cased character is present and no cased
    /// character is lowercase (ASCII casing)
    pub fn is_upper(&self) -> bool {
        let mut has_cased = false;
        for ch in self.chars() {
            if ch.is_ascii_lowercase() {
                return false;
            }
            if ch.is_ascii_uppercase() {
                has_cased = true;
            }
        }
        has_cased
    }

    /// True if at least one cased character is present and no cased
    /// character is uppercase (ASCII casing)
    pub fn is_lower(&self) -> bool {
        let mut has_cased = false;
        for ch in self.chars() {
            if ch.is_ascii_uppercase() {
                return false;
            }
            if ch.is_ascii_lowercase() {
                has_cased = true;
            }
        }
        has_cased
    }

    /// True if non-empty and every byte is an ASCII digit
    pub fn is_ascii_digit(&self) -> bool {
        !self.is_empty() && self.as_bytes().iter().all(|b| b.is_ascii_digit())
    }

    /// True if non-empty and every byte is printable ASCII (`0x20..=0x7E`)
    pub fn is_ascii_printable(&self) -> bool {
        !self.is_empty() && self.as_bytes().iter().all(|&b| (0x20..=0x7E).contains(&b))
    }

    //--------------------------------------------------------------------------
    // Representation
    //--------------------------------------------------------------------------

    /// Quoted, escaped rendering
    ///
    /// Single quotes unless the content contains a single quote and no
    /// double quote; `\t \n \r \\` get short escapes, other C0 bytes and
    /// DEL become `\xNN`, printable and multi-byte content passes through.
    pub fn repr(&self) -> Result<FastString> {
        self.repr_impl(false)
    }

    /// Like [`repr`](Self::repr), additionally escaping every non-ASCII
    /// codepoint as `\xNN`, `\uNNNN`, or `\UNNNNNNNN`
    pub fn ascii_repr(&self) -> Result<FastString> {
        self.repr_impl(true)
    }

    fn repr_impl(&self, escape_non_ascii: bool) -> Result<FastString> {
        let has_single = self.chars().any(|c| c == '\'');
        let has_double = self.chars().any(|c| c == '"');
        let quote = if has_single && !has_double { '"' } else { '\'' };

        let mut out = FastString::with_capacity(self.byte_len() + 2)?;
        let mut buf = [0u8; 4];
        out.push_str(quote.encode_utf8(&mut buf))?;
        for ch in self.chars() {
            match ch {
                '\t' => out.push_str("\\t")?,
                '\n' => out.push_str("\\n")?,
                '\r' => out.push_str("\\r")?,
                '\\' => out.push_str("\\\\")?,
                ch if ch == quote => {
                    out.push_str(if quote == '\'' { "\\'" } else { "\\\"" })?
                }
                ch if (ch as u32) < 0x20 || ch as u32 == 0x7F => {
                    out.push_str(&format!("\\x{:02x}", ch as u32))?
                }
                ch if escape_non_ascii && (ch as u32) > 0x7F => {
                    let cp = ch as u32;
                    if cp <= 0xFF {
                        out.push_str(&format!("\\x{cp:02x}"))?;
                    } else if cp <= 0xFFFF {
                        out.push_str(&format!("\\u{cp:04x}"))?;
                    } else {
                        out.push_str(&format!("\\U{cp:08x}"))?;
                    }
                }
                ch => out.push_str(ch.encode_utf8(&mut buf))?,
            }
        }
        out.push_str(quote.encode_utf8(&mut buf))?;
        Ok(out)
    }

    /// ASCII-lowercased copy (bit-5 toggle on `A..Z` only)
    ///
    /// Full Unicode case folding is out of scope for this type.
    pub fn to_lowercase(&self) -> Result<FastString> {
        let mut out = FastString::from_slice(*self)?;
        out.as_mut_bytes().apply(|b| b.to_ascii_lowercase());
        Ok(out)
    }

    /// ASCII-uppercased copy (bit-5 toggle on `a..z` only)
    pub fn to_uppercase(&self) -> Result<FastString> {
        let mut out = FastString::from_slice(*self)?;
        out.as_mut_bytes().apply(|b| b.to_ascii_uppercase());
        Ok(out)
    }

    //--------------------------------------------------------------------------
    // Parsing
    //--------------------------------------------------------------------------

    /// Parse as an integer in the given base (0 auto-detects `0b/0o/0x`)
    #[inline]
    pub fn atol(&self, base: u32) -> Result<i64> {
        parse::atol(*self, base)
    }

    /// Parse as a floating-point number
    #[inline]
    pub fn atof(&self) -> Result<f64> {
        parse::atof(*self)
    }
}

impl fmt::Debug for StrSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrSlice({:?})", self.as_str())
    }
}

impl fmt::Display for StrSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for StrSlice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span
    }
}

impl Eq for StrSlice<'_> {}

impl PartialEq<str> for StrSlice<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for StrSlice<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for StrSlice<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StrSlice<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for StrSlice<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl<'a> From<&'a str> for StrSlice<'a> {
    fn from(s: &'a str) -> Self {
        Self::from_str(s)
    }
}

/// Iterator over decoded codepoints; double-ended with O(1) peek
pub struct Chars<'a> {
    rest: &'a [u8],
}

impl<'a> Chars<'a> {
    /// Next codepoint without consuming it
    #[inline]
    pub fn peek(&self) -> Option<char> {
        if self.rest.is_empty() {
            None
        } else {
            Some(decode_char(self.rest).0)
        }
    }

    /// Last codepoint without consuming it
    #[inline]
    pub fn peek_back(&self) -> Option<char> {
        Some(decode_char(&self.rest[last_lead(self.rest)?..]).0)
    }
}

/// Offset of the lead byte of the final codepoint, if any
#[inline]
fn last_lead(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    let mut i = bytes.len() - 1;
    while bytes[i] & 0xC0 == 0x80 {
        i -= 1;
    }
    Some(i)
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if self.rest.is_empty() {
            return None;
        }
        let (ch, width) = decode_char(self.rest);
        self.rest = &self.rest[width..];
        Some(ch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rest.len() - count_continuation_bytes(self.rest);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Chars<'_> {
    fn next_back(&mut self) -> Option<char> {
        let lead = last_lead(self.rest)?;
        let (ch, _) = decode_char(&self.rest[lead..]);
        self.rest = &self.rest[..lead];
        Some(ch)
    }
}

impl ExactSizeIterator for Chars<'_> {}

/// Iterator over codepoint-width sub-slices; double-ended with O(1) peek
pub struct CharSlices<'a> {
    rest: &'a [u8],
}

impl<'a> CharSlices<'a> {
    /// Next codepoint slice without consuming it
    #[inline]
    pub fn peek(&self) -> Option<StrSlice<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let width = utf8_char_width(self.rest[0]);
        Some(unsafe { StrSlice::from_utf8_unchecked(&self.rest[..width]) })
    }

    /// Last codepoint slice without consuming it
    #[inline]
    pub fn peek_back(&self) -> Option<StrSlice<'a>> {
        let lead = last_lead(self.rest)?;
        Some(unsafe { StrSlice::from_utf8_unchecked(&self.rest[lead..]) })
    }
}

impl<'a> Iterator for CharSlices<'a> {
    type Item = StrSlice<'a>;

    fn next(&mut self) -> Option<StrSlice<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let width = utf8_char_width(self.rest[0]);
        let (head, tail) = self.rest.split_at(width);
        self.rest = tail;
        Some(unsafe { StrSlice::from_utf8_unchecked(head) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rest.len() - count_continuation_bytes(self.rest);
        (remaining, Some(remaining))
    }
}

impl<'a> DoubleEndedIterator for CharSlices<'a> {
    fn next_back(&mut self) -> Option<StrSlice<'a>> {
        let lead = last_lead(self.rest)?;
        let (head, tail) = self.rest.split_at(lead);
        self.rest = head;
        Some(unsafe { StrSlice::from_utf8_unchecked(tail) })
    }
}

impl ExactSizeIterator for CharSlices<'_> {}

/// Mutable string view restricted to invariant-preserving byte writes
///
/// Only ASCII-for-ASCII single-byte replacement is allowed, so the viewed
/// bytes stay valid UTF-8 without re-validation.
pub struct StrSliceMut<'a> {
    span: ByteSpanMut<'a>,
}

impl<'a> StrSliceMut<'a> {
    /// Wrap mutable bytes that are already valid UTF-8
    ///
    /// # Safety
    ///
    /// The caller must ensure `bytes` is valid UTF-8.
    #[inline]
    pub unsafe fn from_utf8_unchecked_mut(bytes: &'a mut [u8]) -> Self {
        Self {
            span: ByteSpanMut::new(bytes),
        }
    }

    /// Length in bytes
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.span.len()
    }

    /// Reborrow as an immutable slice
    #[inline]
    pub fn as_slice(&self) -> StrSlice<'_> {
        unsafe { StrSlice::from_utf8_unchecked(self.span.as_span().as_bytes()) }
    }

    /// Replace the byte at a python-style index
    ///
    /// Both the existing byte and the replacement must be ASCII; anything
    /// else would cut into a multi-byte codepoint.
    pub fn set_byte(&mut self, index: isize, value: u8) -> Result<()> {
        if value >= 0x80 {
            return Err(StrZipError::boundary(format!(
                "replacement byte {value:#04x} is not ASCII"
            )));
        }
        let existing = self.span.get(index)?;
        if existing >= 0x80 {
            return Err(StrZipError::boundary(format!(
                "byte at index {index} belongs to a multi-byte codepoint"
            )));
        }
        self.span.set(index, value)
    }

    /// Uppercase every ASCII letter in place
    pub fn make_ascii_uppercase(&mut self) {
        self.span.apply(|b| b.to_ascii_uppercase());
    }

    /// Lowercase every ASCII letter in place
    pub fn make_ascii_lowercase(&mut self) {
        self.span.apply(|b| b.to_ascii_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> StrSlice<'_> {
        StrSlice::from_str(text)
    }

    #[test]
    fn test_construction_and_lengths() {
        let slice = s("hello");
        assert_eq!(slice.byte_len(), 5);
        assert_eq!(slice.char_len(), 5);
        assert_eq!(slice.as_str(), "hello");

        // 7 Kannada codepoints in 21 bytes
        let kannada = s("\u{0ca8}\u{0cae}\u{0cb8}\u{0ccd}\u{0c95}\u{0cbe}\u{0cb0}");
        assert_eq!(kannada.byte_len(), 21);
        assert_eq!(kannada.char_len(), 7);

        // Thumbs-up with skin-tone modifier: two codepoints, eight bytes
        let thumbs = s("\u{1f44d}\u{1f3fb}");
        assert_eq!(thumbs.byte_len(), 8);
        assert_eq!(thumbs.char_len(), 2);
    }

    #[test]
    fn test_from_utf8() {
        assert!(StrSlice::from_utf8(b"valid ascii").is_ok());
        assert!(StrSlice::from_utf8("\u{4e16}\u{754c}".as_bytes()).is_ok());
        let err = StrSlice::from_utf8(&[0xFF, 0xFE]).unwrap_err();
        assert_eq!(err.category(), "utf8");
    }

    #[test]
    fn test_slice_boundaries() {
        // "Hi👋!" = H i [4-byte wave] !
        let text = s("Hi\u{1f44b}!");
        assert_eq!(text.byte_len(), 7);
        for good in [0, 1, 2, 6, 7] {
            assert!(text.slice(0..good).is_ok(), "0..{good}");
        }
        assert_eq!(text.slice(0..0).unwrap(), "");
        assert_eq!(text.slice(0..1).unwrap(), "H");
        assert_eq!(text.slice(0..2).unwrap(), "Hi");
        assert_eq!(text.slice(0..6).unwrap(), "Hi\u{1f44b}");
        assert_eq!(text.slice(0..7).unwrap(), "Hi\u{1f44b}!");
        for bad in [3, 4, 5] {
            let err = text.slice(0..bad).unwrap_err();
            let msg = format!("{err}");
            assert!(
                msg.contains("must fall on codepoint boundary") && msg.contains(&bad.to_string()),
                "0..{bad}: {msg}"
            );
        }
    }

    #[test]
    fn test_byte_at() {
        let text = s("Hi\u{1f44b}!");
        assert_eq!(text.byte_at(0).unwrap(), "H");
        assert_eq!(text.byte_at(1).unwrap(), "i");
        assert_eq!(text.byte_at(-1).unwrap(), "!");
        assert!(text.byte_at(2).is_err()); // inside the wave emoji
        assert!(text.byte_at(10).is_err());
    }

    #[test]
    fn test_find_rfind() {
        let text = s("hello world, hello again");
        assert_eq!(text.find(s("hello")), Some(0));
        assert_eq!(text.rfind(s("hello")), Some(13));
        assert_eq!(text.find(s("o")), Some(4));
        assert_eq!(text.rfind(s("o")), Some(17));
        assert_eq!(text.find(s("missing")), None);
        assert_eq!(text.rfind(s("missing")), None);

        // Empty needle conventions
        assert_eq!(text.find(s("")), Some(0));
        assert_eq!(text.rfind(s("")), Some(text.byte_len()));
    }

    #[test]
    fn test_count_contains() {
        let text = s("abababa");
        assert_eq!(text.count(s("ab")), 3);
        assert_eq!(text.count(s("aba")), 2); // non-overlapping
        assert_eq!(text.count(s("")), 8);
        assert!(text.contains(s("bab")));
        assert!(!text.contains(s("cc")));
    }

    #[test]
    fn test_starts_ends_with() {
        let text = s("hello world");
        assert!(text.starts_with(s("hello")));
        assert!(text.ends_with(s("world")));
        assert!(text.starts_with_in(s("world"), 6, None));
        assert!(text.ends_with_in(s("hello"), 0, Some(5)));
        assert!(!text.starts_with_in(s("hello"), 1, None));
        // Window end clamps to the slice length
        assert!(text.starts_with_in(s("world"), 6, Some(100)));
    }

    #[test]
    fn test_strip() {
        assert_eq!(s("  hello  ").strip(), "hello");
        assert_eq!(s("\t\r\nhello\x0b\x0c").strip(), "hello");
        assert_eq!(s("\x1c\x1d\x1ehello").lstrip(), "hello");
        assert_eq!(s("hello  ").lstrip(), "hello  ");
        assert_eq!(s("  hello").rstrip(), "  hello");
        assert_eq!(s("").strip(), "");
        assert_eq!(s("   ").strip(), "");

        // Idempotence
        let stripped = s("  x  ").strip();
        assert_eq!(stripped.strip(), stripped);
    }

    #[test]
    fn test_strip_matches() {
        assert_eq!(s("xxhelloyy").strip_matches(s("xy")), "hello");
        assert_eq!(s("xxhelloyy").lstrip_matches(s("xy")), "helloyy");
        assert_eq!(s("xxhelloyy").rstrip_matches(s("xy")), "xxhello");
        // Multi-byte codepoints strip whole, never byte-wise
        assert_eq!(s("\u{e9}\u{e9}ok\u{e9}").strip_matches(s("\u{e9}")), "ok");
        assert_eq!(s("\u{e8}x").strip_matches(s("\u{e9}")), "\u{e8}x");
    }

    #[test]
    fn test_split() {
        let text = s("a,b,,c");
        let parts = text.split(s(",")).unwrap();
        assert_eq!(parts, [s("a"), s("b"), s(""), s("c")]);

        assert_eq!(s("").split(s(",")).unwrap(), [s("")]);
        assert_eq!(s("abc").split(s(",")).unwrap(), [s("abc")]);

        let err = text.split(s("")).unwrap_err();
        assert_eq!(err.category(), "boundary");
    }

    #[test]
    fn test_splitlines() {
        let text = s("one\ntwo\r\nthree\rfour");
        let lines = text.splitlines(false);
        assert_eq!(lines, [s("one"), s("two"), s("three"), s("four")]);

        let kept = text.splitlines(true);
        assert_eq!(kept, [s("one\n"), s("two\r\n"), s("three\r"), s("four")]);

        // Unicode separators: NEL, LS, PS
        let uni = s("a\u{85}b\u{2028}c\u{2029}d");
        assert_eq!(uni.splitlines(false), [s("a"), s("b"), s("c"), s("d")]);

        // Exotic ASCII separators and trailing terminator
        let exotic = s("a\x0bb\x0cc\x1cd\x1de\x1ef\n");
        assert_eq!(
            exotic.splitlines(false),
            [s("a"), s("b"), s("c"), s("d"), s("e"), s("f")]
        );
        assert!(s("").splitlines(false).is_empty());
    }

    #[test]
    fn test_chars_iteration() {
        let text = s("a\u{e9}\u{4e16}\u{1f980}");
        let forward: Vec<char> = text.chars().collect();
        assert_eq!(forward, ['a', '\u{e9}', '\u{4e16}', '\u{1f980}']);
        let backward: Vec<char> = text.chars().rev().collect();
        assert_eq!(backward, ['\u{1f980}', '\u{4e16}', '\u{e9}', 'a']);
        assert_eq!(text.chars().len(), 4);

        let mut iter = text.chars();
        assert_eq!(iter.peek(), Some('a'));
        assert_eq!(iter.peek(), Some('a')); // peek does not consume
        assert_eq!(iter.peek_back(), Some('\u{1f980}'));
        iter.next();
        assert_eq!(iter.peek(), Some('\u{e9}'));
    }

    #[test]
    fn test_char_slices_iteration() {
        let text = s("a\u{e9}\u{1f980}");
        let widths: Vec<usize> = text.char_slices().map(|cs| cs.byte_len()).collect();
        assert_eq!(widths, [1, 2, 4]);
        let parts: Vec<StrSlice> = text.char_slices().collect();
        assert_eq!(parts[0], "a");
        assert_eq!(parts[1], "\u{e9}");
        assert_eq!(parts[2], "\u{1f980}");

        let mut iter = text.char_slices();
        assert_eq!(iter.peek().unwrap(), "a");
        assert_eq!(iter.peek_back().unwrap(), "\u{1f980}");
        assert_eq!(iter.next_back().unwrap(), "\u{1f980}");
        assert_eq!(iter.next_back().unwrap(), "\u{e9}");
        assert_eq!(iter.next_back().unwrap(), "a");
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_classification() {
        assert!(s(" \t\r\n").is_space());
        assert!(s("\u{85}\u{2028}\u{2029}").is_space());
        assert!(!s(" x ").is_space());
        assert!(!s("").is_space());

        assert!(s("HELLO").is_upper());
        assert!(s("HELLO 123!").is_upper());
        assert!(!s("Hello").is_upper());
        assert!(!s("123").is_upper()); // no cased character present
        assert!(s("hello").is_lower());
        assert!(!s("123!").is_lower());

        assert!(s("0123").is_ascii_digit());
        assert!(!s("12a").is_ascii_digit());
        assert!(!s("").is_ascii_digit());

        assert!(s("plain text!").is_ascii_printable());
        assert!(!s("tab\there").is_ascii_printable());
        assert!(!s("caf\u{e9}").is_ascii_printable());
    }

    #[test]
    fn test_repr() {
        assert_eq!(s("hello").repr().unwrap(), "'hello'");
        assert_eq!(s("it's").repr().unwrap(), "\"it's\"");
        assert_eq!(s("say \"hi\"").repr().unwrap(), "'say \"hi\"'");
        // Both quote kinds present: single quotes win, inner singles escaped
        assert_eq!(s("'\"").repr().unwrap(), "'\\'\"'");
        assert_eq!(s("a\tb\nc").repr().unwrap(), "'a\\tb\\nc'");
        assert_eq!(s("\x01\x7f").repr().unwrap(), "'\\x01\\x7f'");
        assert_eq!(s("caf\u{e9}").repr().unwrap(), "'caf\u{e9}'");
        assert_eq!(s("back\\slash").repr().unwrap(), "'back\\\\slash'");
    }

    #[test]
    fn test_ascii_repr() {
        assert_eq!(s("caf\u{e9}").ascii_repr().unwrap(), "'caf\\xe9'");
        assert_eq!(s("\u{4e16}").ascii_repr().unwrap(), "'\\u4e16'");
        assert_eq!(s("\u{1f980}").ascii_repr().unwrap(), "'\\U0001f980'");
        assert_eq!(s("plain").ascii_repr().unwrap(), "'plain'");
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(s("Hello World").to_uppercase().unwrap(), "HELLO WORLD");
        assert_eq!(s("Hello World").to_lowercase().unwrap(), "hello world");
        // Non-ASCII letters pass through untouched
        assert_eq!(s("caf\u{e9}").to_uppercase().unwrap(), "CAF\u{e9}");
    }

    #[test]
    fn test_mut_slice() {
        let mut buf = b"hello".to_vec();
        let mut view = unsafe { StrSliceMut::from_utf8_unchecked_mut(&mut buf) };
        view.set_byte(0, b'j').unwrap();
        view.set_byte(-1, b'!').unwrap();
        assert_eq!(view.as_slice(), "jell!");
        assert!(view.set_byte(0, 0xC3).is_err());

        let mut multi = "a\u{e9}".as_bytes().to_vec();
        let mut view = unsafe { StrSliceMut::from_utf8_unchecked_mut(&mut multi) };
        assert!(view.set_byte(1, b'x').is_err());

        let mut buf = b"MiXeD".to_vec();
        let mut view = unsafe { StrSliceMut::from_utf8_unchecked_mut(&mut buf) };
        view.make_ascii_uppercase();
        assert_eq!(view.as_slice(), "MIXED");
    }

    #[test]
    fn test_ordering_and_hash() {
        use std::collections::hash_map::DefaultHasher;

        assert!(s("abc") < s("abd"));
        assert!(s("abc") == s("abc"));

        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        s("same").hash(&mut h1);
        s("same").hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }
}
