//! Non-owning byte spans
//!
//! `ByteSpan` and `ByteSpanMut` are bounds-described views into contiguous
//! memory owned elsewhere; the substrate the string types are built on.
//! Construction never allocates and destruction is trivial. Indexing
//! accepts python-style negative offsets; bulk mutation on `ByteSpanMut`
//! is written chunk-wise so the optimizer vectorizes it.

use crate::error::{check_range, Result, StrZipError};
use std::fmt;
use std::ops::Range;

/// Resolve a possibly-negative index against a length
#[inline]
fn resolve_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        let back = index.unsigned_abs();
        if back > len {
            return Err(StrZipError::boundary(format!(
                "negative index {index} out of range for length {len}"
            )));
        }
        len - back
    } else {
        index as usize
    };
    if resolved >= len {
        return Err(StrZipError::out_of_bounds(resolved, len));
    }
    Ok(resolved)
}

/// Immutable view over contiguous bytes
///
/// Equivalent to `&[u8]` with the negative-index and checked-subspan surface
/// the string types need. Never owns the memory it points into.
#[derive(Clone, Copy)]
pub struct ByteSpan<'a> {
    data: &'a [u8],
}

impl<'a> ByteSpan<'a> {
    /// Create a span over a byte slice
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Create a span from a raw pointer and length
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for the lifetime `'a`,
    /// and the memory must not be mutated during that lifetime.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Self {
        Self {
            data: unsafe { std::slice::from_raw_parts(ptr, len) },
        }
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the span covers zero bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying byte slice
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pointer to the first byte
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Byte at a python-style index (negative counts from the end)
    #[inline]
    pub fn get(&self, index: isize) -> Result<u8> {
        let resolved = resolve_index(index, self.data.len())?;
        Ok(self.data[resolved])
    }

    /// Byte at an index without bounds checking
    ///
    /// # Safety
    ///
    /// The caller must ensure `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> u8 {
        debug_assert!(index < self.data.len());
        unsafe { *self.data.get_unchecked(index) }
    }

    /// Half-open sub-view, bounds checked
    pub fn subspan(&self, range: Range<usize>) -> Result<ByteSpan<'a>> {
        check_range(range.start, range.end, self.data.len())?;
        Ok(ByteSpan::new(&self.data[range]))
    }

    /// Sub-view with an explicit step; only unit step is supported
    pub fn subspan_stepped(&self, range: Range<usize>, step: usize) -> Result<ByteSpan<'a>> {
        if step != 1 {
            return Err(StrZipError::not_supported(format!(
                "span step {step} (only step 1 is supported)"
            )));
        }
        self.subspan(range)
    }

    /// Iterate bytes front-to-back; the iterator is double-ended
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'a, u8> {
        self.data.iter()
    }
}

impl PartialEq for ByteSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        // Same pointer and length means same bytes; skip the scan.
        if std::ptr::eq(self.data.as_ptr(), other.data.as_ptr())
            && self.data.len() == other.data.len()
        {
            return true;
        }
        self.data == other.data
    }
}

impl Eq for ByteSpan<'_> {}

impl PartialEq<[u8]> for ByteSpan<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.data == other
    }
}

impl PartialEq<&[u8]> for ByteSpan<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.data == *other
    }
}

impl<'a> From<&'a [u8]> for ByteSpan<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ByteSpan<'a> {
    fn from(data: &'a [u8; N]) -> Self {
        Self::new(data)
    }
}

impl fmt::Debug for ByteSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSpan({:02x?})", self.data)
    }
}

/// Mutable view over contiguous bytes with bulk mutation helpers
pub struct ByteSpanMut<'a> {
    data: &'a mut [u8],
}

impl<'a> ByteSpanMut<'a> {
    /// Create a mutable span over a byte slice
    #[inline]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    /// Create a mutable span from a raw pointer and length
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes for the
    /// lifetime `'a`, and no other reference to the memory may exist during
    /// that lifetime.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Self {
        Self {
            data: unsafe { std::slice::from_raw_parts_mut(ptr, len) },
        }
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the span covers zero bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reborrow as an immutable span
    #[inline]
    pub fn as_span(&self) -> ByteSpan<'_> {
        ByteSpan::new(self.data)
    }

    /// Byte at a python-style index
    #[inline]
    pub fn get(&self, index: isize) -> Result<u8> {
        let resolved = resolve_index(index, self.data.len())?;
        Ok(self.data[resolved])
    }

    /// Write a byte at a python-style index
    #[inline]
    pub fn set(&mut self, index: isize, value: u8) -> Result<()> {
        let resolved = resolve_index(index, self.data.len())?;
        self.data[resolved] = value;
        Ok(())
    }

    /// Set every byte to `value`
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Copy bytes from a source span of exactly the same length
    pub fn copy_from(&mut self, src: ByteSpan<'_>) -> Result<()> {
        if src.len() != self.data.len() {
            return Err(StrZipError::boundary(format!(
                "copy_from length mismatch: source {} bytes, destination {}",
                src.len(),
                self.data.len()
            )));
        }
        self.data.copy_from_slice(src.as_bytes());
        Ok(())
    }

    /// Replace every byte with `f(byte)`, in place
    ///
    /// Processed in fixed-size chunks so the element loop has a known trip
    /// count and vectorizes.
    pub fn apply<F: Fn(u8) -> u8>(&mut self, f: F) {
        let mut chunks = self.data.chunks_exact_mut(16);
        for chunk in &mut chunks {
            for byte in chunk.iter_mut() {
                *byte = f(*byte);
            }
        }
        for byte in chunks.into_remainder() {
            *byte = f(*byte);
        }
    }
}

impl fmt::Debug for ByteSpanMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSpanMut({:02x?})", self.data)
    }
}
