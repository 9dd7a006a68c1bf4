//! Owning growable UTF-8 string
//!
//! `FastString` manages its buffer by hand so the NUL-termination contract
//! can be kept cheaply: every allocated buffer holds one byte past the
//! reported capacity and `buf[len]` is always 0. That makes C-string
//! handoff a pointer read instead of a copy. Growth is geometric via
//! `realloc`, matching the amortized-append behavior of the vector types
//! this design is derived from.

use crate::error::{Result, StrZipError};
use crate::span::ByteSpanMut;
use crate::string::parse;
use crate::string::slice::{StrSlice, StrSliceMut};
use crate::utf8::validate_utf8;
use std::alloc::{self, Layout};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::ManuallyDrop;
use std::ops::{AddAssign, Range};
use std::ptr::{self, NonNull};
use std::str::FromStr;

/// Growable NUL-terminated UTF-8 string
///
/// Logical length excludes the terminator; so does `capacity()`. The
/// terminator byte lives in the one-past-capacity slot every allocation
/// reserves.
///
/// # Examples
///
/// ```rust
/// use strzip::FastString;
///
/// let mut s = FastString::from_str("hello").unwrap();
/// s.push_str(" world").unwrap();
/// assert_eq!(s, "hello world");
/// assert_eq!(s.char_len(), 11);
/// ```
pub struct FastString {
    ptr: NonNull<u8>,
    len: usize,
    cap: usize,
}

// The buffer is exclusively owned and reached only through &self/&mut self.
unsafe impl Send for FastString {}
unsafe impl Sync for FastString {}

#[inline]
fn buffer_layout(cap: usize) -> Result<Layout> {
    // One extra slot for the terminator.
    Layout::array::<u8>(cap + 1).map_err(|_| StrZipError::out_of_memory(cap))
}

impl FastString {
    /// Create an empty string without allocating
    #[inline]
    pub fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
        }
    }

    /// Create an empty string with room for `cap` bytes plus the terminator
    pub fn with_capacity(cap: usize) -> Result<Self> {
        if cap == 0 {
            return Ok(Self::new());
        }
        let layout = buffer_layout(cap)?;
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| StrZipError::out_of_memory(cap + 1))?;
        unsafe { ptr.as_ptr().write(0) };
        Ok(Self { ptr, len: 0, cap })
    }

    /// Create a string by copying `s`
    pub fn from_str(s: &str) -> Result<Self> {
        let mut out = Self::with_capacity(s.len())?;
        out.push_str(s)?;
        Ok(out)
    }

    /// Create a string by copying a validated slice
    pub fn from_slice(s: StrSlice<'_>) -> Result<Self> {
        let mut out = Self::with_capacity(s.byte_len())?;
        out.push_slice(s)?;
        Ok(out)
    }

    /// Create a string from bytes, validating them as UTF-8
    pub fn from_utf8(bytes: &[u8]) -> Result<Self> {
        if !validate_utf8(bytes) {
            return Err(StrZipError::invalid_utf8(format!(
                "{}-byte buffer is not well-formed UTF-8",
                bytes.len()
            )));
        }
        let mut out = Self::with_capacity(bytes.len())?;
        out.push_bytes(bytes)?;
        Ok(out)
    }

    /// Create a string from bytes whose final byte is the terminator
    ///
    /// The logical length is `bytes.len() - 1`. Fails a debug assertion if
    /// the last byte is not 0.
    ///
    /// # Safety
    ///
    /// The caller must ensure `bytes` is non-empty, ends with a 0 byte, and
    /// that everything before the terminator is valid UTF-8.
    pub unsafe fn from_nul_terminated(bytes: &[u8]) -> Result<Self> {
        debug_assert!(!bytes.is_empty() && bytes[bytes.len() - 1] == 0);
        debug_assert!(validate_utf8(&bytes[..bytes.len() - 1]));
        let len = bytes.len() - 1;
        // with_capacity(len) allocates len + 1 bytes, exactly bytes.len().
        let mut out = Self::with_capacity(len)?;
        if len > 0 {
            unsafe {
                ptr::copy_nonoverlapping(bytes.as_ptr(), out.ptr.as_ptr(), len);
                out.ptr.as_ptr().add(len).write(0);
            }
            out.len = len;
        }
        Ok(out)
    }

    /// Reassemble a string from parts produced by [`into_raw_parts`]
    ///
    /// [`into_raw_parts`]: Self::into_raw_parts
    ///
    /// # Safety
    ///
    /// The parts must come from `into_raw_parts` on a `FastString` (or
    /// `ptr` must point to a live allocation of `cap + 1` bytes holding
    /// `len` bytes of valid UTF-8 followed by a 0 byte). A null `ptr` with
    /// zero `len` and `cap` yields the empty string.
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize, cap: usize) -> Self {
        match NonNull::new(ptr) {
            Some(ptr) => Self { ptr, len, cap },
            None => Self::new(),
        }
    }

    /// Move the buffer out, leaving nothing to drop
    ///
    /// Returns `(ptr, len, cap)`; a never-allocated string yields a null
    /// pointer. The caller becomes responsible for the allocation, normally
    /// by round-tripping through [`from_raw_parts`](Self::from_raw_parts).
    pub fn into_raw_parts(self) -> (*mut u8, usize, usize) {
        let this = ManuallyDrop::new(self);
        let ptr = if this.cap == 0 {
            ptr::null_mut()
        } else {
            this.ptr.as_ptr()
        };
        (ptr, this.len, this.cap)
    }

    /// Length in bytes, excluding the terminator
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.len
    }

    /// Length in codepoints
    #[inline]
    pub fn char_len(&self) -> usize {
        self.as_slice().char_len()
    }

    /// Usable capacity in bytes, excluding the terminator slot
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// True if the string holds zero bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The content bytes, terminator excluded
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// View as `&str`
    #[inline]
    pub fn as_str(&self) -> &str {
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Borrow as a zero-copy slice; all search and split operations live
    /// there
    #[inline]
    pub fn as_slice(&self) -> StrSlice<'_> {
        unsafe { StrSlice::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Borrow mutably for ASCII-restricted in-place edits
    #[inline]
    pub fn as_mut_slice(&mut self) -> StrSliceMut<'_> {
        let bytes = unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) };
        unsafe { StrSliceMut::from_utf8_unchecked_mut(bytes) }
    }

    /// Borrow the content bytes as a mutable span
    #[inline]
    pub(crate) fn as_mut_bytes(&mut self) -> ByteSpanMut<'_> {
        let bytes = unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) };
        ByteSpanMut::new(bytes)
    }

    /// Pointer to a NUL-terminated buffer for C interop
    ///
    /// Takes `&mut self` because the empty string may need its first
    /// allocation to have a terminator to point at. The pointer is
    /// invalidated by any subsequent growth.
    pub fn as_cstr_ptr(&mut self) -> Result<*const u8> {
        if self.cap == 0 {
            self.grow_to(1)?;
            unsafe { self.ptr.as_ptr().write(0) };
        }
        Ok(self.ptr.as_ptr() as *const u8)
    }

    /// Ensure room for `additional` more bytes, growing geometrically
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| StrZipError::out_of_memory(usize::MAX))?;
        if required <= self.cap {
            return Ok(());
        }
        let new_cap = required.max(self.cap.saturating_mul(2));
        self.grow_to(new_cap)
    }

    fn grow_to(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap > self.cap);
        let new_layout = buffer_layout(new_cap)?;
        let raw = if self.cap == 0 {
            unsafe { alloc::alloc(new_layout) }
        } else {
            let old_layout = buffer_layout(self.cap)?;
            // realloc carries the content and terminator across.
            unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size()) }
        };
        self.ptr = NonNull::new(raw).ok_or_else(|| StrZipError::out_of_memory(new_cap + 1))?;
        self.cap = new_cap;
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.reserve(bytes.len())?;
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().add(self.len), bytes.len());
            self.len += bytes.len();
            self.ptr.as_ptr().add(self.len).write(0);
        }
        Ok(())
    }

    /// Append a `&str`
    #[inline]
    pub fn push_str(&mut self, s: &str) -> Result<()> {
        self.push_bytes(s.as_bytes())
    }

    /// Append a validated slice
    #[inline]
    pub fn push_slice(&mut self, s: StrSlice<'_>) -> Result<()> {
        self.push_bytes(s.as_bytes())
    }

    /// Explicit deep copy; `Clone` delegates here
    pub fn copy(&self) -> Result<Self> {
        let mut out = Self::with_capacity(self.len)?;
        out.push_bytes(self.as_bytes())?;
        Ok(out)
    }

    /// Copy with every occurrence of `old` replaced by `new`
    ///
    /// Counts first so the result is allocated exactly once. An empty `old`
    /// yields an unchanged copy.
    pub fn replace(&self, old: StrSlice<'_>, new: StrSlice<'_>) -> Result<Self> {
        if old.is_empty() {
            return self.copy();
        }
        let this = self.as_slice();
        let count = this.count(old);
        if count == 0 {
            return self.copy();
        }
        let out_len = self.len - count * old.byte_len() + count * new.byte_len();
        let mut out = Self::with_capacity(out_len)?;
        let mut rest = this;
        while let Some(pos) = rest.find(old) {
            // Match offsets land on codepoint boundaries because the needle
            // itself is valid UTF-8.
            out.push_slice(rest.slice(0..pos)?)?;
            out.push_slice(new)?;
            rest = rest.slice(pos + old.byte_len()..rest.byte_len())?;
        }
        out.push_slice(rest)?;
        Ok(out)
    }

    /// Concatenate `parts` with `self` as the separator, sized up front
    pub fn join(&self, parts: &[StrSlice<'_>]) -> Result<Self> {
        if parts.is_empty() {
            return Ok(Self::new());
        }
        let content: usize = parts.iter().map(|p| p.byte_len()).sum();
        let total = content + self.len * (parts.len() - 1);
        let mut out = Self::with_capacity(total)?;
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push_bytes(self.as_bytes())?;
            }
            out.push_slice(*part)?;
        }
        Ok(out)
    }

    /// ASCII-lowercased copy
    #[inline]
    pub fn lower(&self) -> Result<Self> {
        self.as_slice().to_lowercase()
    }

    /// ASCII-uppercased copy
    #[inline]
    pub fn upper(&self) -> Result<Self> {
        self.as_slice().to_uppercase()
    }

    //--------------------------------------------------------------------------
    // Slice delegation
    //--------------------------------------------------------------------------

    /// See [`StrSlice::slice`]
    #[inline]
    pub fn slice(&self, range: Range<usize>) -> Result<StrSlice<'_>> {
        self.as_slice().slice(range)
    }

    /// See [`StrSlice::byte_at`]
    #[inline]
    pub fn byte_at(&self, index: isize) -> Result<StrSlice<'_>> {
        self.as_slice().byte_at(index)
    }

    /// See [`StrSlice::find`]
    #[inline]
    pub fn find(&self, needle: StrSlice<'_>) -> Option<usize> {
        self.as_slice().find(needle)
    }

    /// See [`StrSlice::contains`]
    #[inline]
    pub fn contains(&self, needle: StrSlice<'_>) -> bool {
        self.as_slice().contains(needle)
    }

    /// See [`StrSlice::count`]
    #[inline]
    pub fn count(&self, needle: StrSlice<'_>) -> usize {
        self.as_slice().count(needle)
    }

    /// See [`StrSlice::strip`]
    #[inline]
    pub fn strip(&self) -> StrSlice<'_> {
        self.as_slice().strip()
    }

    /// See [`StrSlice::split`]
    #[inline]
    pub fn split(&self, sep: StrSlice<'_>) -> Result<Vec<StrSlice<'_>>> {
        self.as_slice().split(sep)
    }

    /// See [`StrSlice::splitlines`]
    #[inline]
    pub fn splitlines(&self, keepends: bool) -> Vec<StrSlice<'_>> {
        self.as_slice().splitlines(keepends)
    }

    /// See [`StrSlice::repr`]
    #[inline]
    pub fn repr(&self) -> Result<Self> {
        self.as_slice().repr()
    }

    /// Parse as an integer in the given base (0 auto-detects `0b/0o/0x`)
    #[inline]
    pub fn atol(&self, base: u32) -> Result<i64> {
        parse::atol(self.as_slice(), base)
    }

    /// Parse as a floating-point number
    #[inline]
    pub fn atof(&self) -> Result<f64> {
        parse::atof(self.as_slice())
    }
}

impl Default for FastString {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FastString {
    fn drop(&mut self) {
        if self.cap > 0 {
            // Matches the layout every allocation and growth used.
            if let Ok(layout) = buffer_layout(self.cap) {
                unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
            }
        }
    }
}

impl Clone for FastString {
    fn clone(&self) -> Self {
        match self.copy() {
            Ok(out) => out,
            Err(_) => {
                let layout =
                    Layout::from_size_align(self.len + 1, 1).unwrap_or(Layout::new::<u8>());
                alloc::handle_alloc_error(layout)
            }
        }
    }
}

impl FromStr for FastString {
    type Err = StrZipError;

    fn from_str(s: &str) -> Result<Self> {
        FastString::from_str(s)
    }
}

impl AddAssign<&str> for FastString {
    fn add_assign(&mut self, rhs: &str) {
        if self.push_str(rhs).is_err() {
            let layout = Layout::from_size_align(self.len + rhs.len() + 1, 1)
                .unwrap_or(Layout::new::<u8>());
            alloc::handle_alloc_error(layout);
        }
    }
}

impl AddAssign<StrSlice<'_>> for FastString {
    fn add_assign(&mut self, rhs: StrSlice<'_>) {
        *self += rhs.as_str();
    }
}

impl fmt::Display for FastString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FastString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FastString({:?})", self.as_str())
    }
}

impl PartialEq for FastString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FastString {}

impl PartialEq<str> for FastString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for FastString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<StrSlice<'_>> for FastString {
    fn eq(&self, other: &StrSlice<'_>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for FastString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FastString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for FastString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(text: &str) -> StrSlice<'_> {
        StrSlice::from_str(text)
    }

    #[test]
    fn test_empty_string_does_not_allocate() {
        let s = FastString::new();
        assert_eq!(s.byte_len(), 0);
        assert_eq!(s.capacity(), 0);
        assert!(s.is_empty());
        assert_eq!(s.as_bytes(), b"");
    }

    #[test]
    fn test_terminator_maintained() {
        let mut s = FastString::from_str("ab").unwrap();
        unsafe {
            assert_eq!(*s.ptr.as_ptr().add(2), 0);
        }
        s.push_str("cdef").unwrap();
        unsafe {
            assert_eq!(*s.ptr.as_ptr().add(6), 0);
        }
        assert_eq!(s, "abcdef");
    }

    #[test]
    fn test_growth_across_reallocations() {
        let mut s = FastString::new();
        for i in 0..100 {
            s.push_str(&format!("{i},")).unwrap();
        }
        assert!(s.byte_len() > 100);
        assert!(s.as_str().starts_with("0,1,2,"));
        assert!(s.as_str().ends_with("99,"));
        assert!(s.capacity() >= s.byte_len());
    }

    #[test]
    fn test_from_utf8() {
        assert_eq!(FastString::from_utf8(b"ok").unwrap(), "ok");
        assert!(FastString::from_utf8(&[0xC0, 0x80]).is_err());
    }

    #[test]
    fn test_from_nul_terminated() {
        let s = unsafe { FastString::from_nul_terminated(b"hello\0") }.unwrap();
        assert_eq!(s, "hello");
        assert_eq!(s.byte_len(), 5);
        let empty = unsafe { FastString::from_nul_terminated(b"\0") }.unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_raw_parts_round_trip() {
        let s = FastString::from_str("stolen").unwrap();
        let (ptr, len, cap) = s.into_raw_parts();
        assert!(!ptr.is_null());
        assert_eq!(len, 6);
        let rebuilt = unsafe { FastString::from_raw_parts(ptr, len, cap) };
        assert_eq!(rebuilt, "stolen");

        let (ptr, len, cap) = FastString::new().into_raw_parts();
        assert!(ptr.is_null());
        let empty = unsafe { FastString::from_raw_parts(ptr, len, cap) };
        assert!(empty.is_empty());
    }

    #[test]
    fn test_as_cstr_ptr() {
        let mut s = FastString::from_str("abc").unwrap();
        let ptr = s.as_cstr_ptr().unwrap();
        unsafe {
            assert_eq!(*ptr, b'a');
            assert_eq!(*ptr.add(3), 0);
        }
        // The empty string allocates a lone terminator on demand.
        let mut empty = FastString::new();
        let ptr = empty.as_cstr_ptr().unwrap();
        unsafe { assert_eq!(*ptr, 0) };
    }

    #[test]
    fn test_add_assign() {
        let mut s = FastString::from_str("a").unwrap();
        s += "b";
        s += slice("c");
        assert_eq!(s, "abc");
    }

    #[test]
    fn test_replace() {
        let s = FastString::from_str("one two one two").unwrap();
        assert_eq!(s.replace(slice("one"), slice("1")).unwrap(), "1 two 1 two");
        assert_eq!(
            s.replace(slice("two"), slice("double")).unwrap(),
            "one double one double"
        );
        // Empty pattern and no-match both yield an unchanged copy
        assert_eq!(s.replace(slice(""), slice("x")).unwrap(), s);
        assert_eq!(s.replace(slice("three"), slice("x")).unwrap(), s);
        // Shrinking replacement
        assert_eq!(
            FastString::from_str("aaa")
                .unwrap()
                .replace(slice("a"), slice(""))
                .unwrap(),
            ""
        );
    }

    #[test]
    fn test_join() {
        let sep = FastString::from_str(", ").unwrap();
        let joined = sep
            .join(&[slice("a"), slice("b"), slice("c")])
            .unwrap();
        assert_eq!(joined, "a, b, c");
        assert_eq!(sep.join(&[]).unwrap(), "");
        assert_eq!(sep.join(&[slice("solo")]).unwrap(), "solo");
    }

    #[test]
    fn test_split_join_inverse() {
        let text = FastString::from_str("a,b,,c,").unwrap();
        let sep = FastString::from_str(",").unwrap();
        let parts = text.split(sep.as_slice()).unwrap();
        assert_eq!(sep.join(&parts).unwrap(), text);
    }

    #[test]
    fn test_case_conversion() {
        let s = FastString::from_str("MiXeD 123 caf\u{e9}").unwrap();
        assert_eq!(s.upper().unwrap(), "MIXED 123 CAF\u{e9}");
        assert_eq!(s.lower().unwrap(), "mixed 123 caf\u{e9}");
    }

    #[test]
    fn test_clone_is_deep() {
        let original = FastString::from_str("deep").unwrap();
        let mut cloned = original.clone();
        cloned.push_str("er").unwrap();
        assert_eq!(original, "deep");
        assert_eq!(cloned, "deeper");
    }

    #[test]
    fn test_parse_trait() {
        let s: FastString = "parsed".parse().unwrap();
        assert_eq!(s, "parsed");
    }

    #[test]
    fn test_ordering() {
        let a = FastString::from_str("apple").unwrap();
        let b = FastString::from_str("banana").unwrap();
        assert!(a < b);
        assert_eq!(a, slice("apple"));
    }
}
