//! # strzip
//!
//! SIMD-accelerated UTF-8 strings and byte spans.
//!
//! The crate provides three layers:
//!
//! - [`utf8`]: streaming lookup-table UTF-8 validation with runtime tier
//!   selection (AVX2/SSSE3 on x86_64, NEON on aarch64, a portable lane
//!   fallback everywhere), plus an independent scalar validator.
//! - [`span`]: non-owning byte views with python-style negative indexing
//!   and checked sub-views.
//! - [`string`]: [`FastString`], an owning growable NUL-terminated UTF-8
//!   string, and [`StrSlice`], the zero-copy borrowed view carrying search,
//!   split, codepoint iteration, and numeric parsing.
//!
//! # Examples
//!
//! ```rust
//! use strzip::{validate_utf8, FastString, StrSlice};
//!
//! assert!(validate_utf8("caf\u{e9}".as_bytes()));
//!
//! let s = FastString::from_str("one,two,three").unwrap();
//! let parts = s.split(StrSlice::from_str(",")).unwrap();
//! assert_eq!(parts.len(), 3);
//! assert_eq!(parts[1], "two");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod span;
pub mod string;
pub mod system;
pub mod utf8;

pub use error::{Result, StrZipError};
pub use span::{ByteSpan, ByteSpanMut};
pub use string::{atof, atol, FastString, StrSlice, StrSliceMut};
pub use system::{get_cpu_features, CpuFeatures};
pub use utf8::{validate_utf8, Utf8Tier, Utf8Validator};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library: warms the CPU feature cache and logs the
/// version. Optional; every entry point works without it.
pub fn init() {
    let features = get_cpu_features();
    log::debug!(
        "strzip {} initialized (simd: {})",
        VERSION,
        features.has_simd()
    );
}

/// True if the running CPU offers a SIMD tier beyond the portable fallback
pub fn has_simd_support() -> bool {
    get_cpu_features().has_simd()
}
