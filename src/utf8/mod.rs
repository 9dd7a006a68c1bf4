//! SIMD-accelerated UTF-8 validation
//!
//! Streaming lookup-table validation (Keiser/Lemire) with runtime tier
//! selection: AVX2 and SSSE3 on x86_64, NEON on aarch64, and a portable
//! lane-block fallback everywhere. An independent scalar validator with a
//! decreasing-width ASCII fast path backs restricted contexts and the
//! cross-algorithm agreement tests.
//!
//! Validation accepts exactly the well-formed sequences of Unicode Table
//! 3-7: overlong encodings, surrogate code points, and sequences above
//! U+10FFFF are rejected.

mod portable;
mod scalar;
mod simd;
mod tables;

pub use scalar::{count_continuation_bytes, validate_scalar};

use crate::error::{Result, StrZipError};
use crate::system::get_cpu_features;
use std::sync::OnceLock;

/// SIMD implementation tier for UTF-8 validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Tier {
    /// AVX2, 32-byte blocks (x86_64)
    Avx2,
    /// SSSE3, 16-byte blocks (x86_64)
    Ssse3,
    /// ARM NEON, 16-byte blocks (aarch64)
    Neon,
    /// Portable lane blocks, always available
    Portable,
}

/// UTF-8 validator with a fixed SIMD tier
///
/// `new()` picks the best tier for the running CPU; `with_tier` pins a
/// specific one, which the agreement tests use to run every available tier
/// over the same corpus.
pub struct Utf8Validator {
    tier: Utf8Tier,
}

impl Utf8Validator {
    /// Create a validator with the optimal tier for this CPU
    pub fn new() -> Self {
        let features = get_cpu_features();
        let tier = if features.has_avx2 {
            Utf8Tier::Avx2
        } else if features.has_ssse3 {
            Utf8Tier::Ssse3
        } else if features.has_neon {
            Utf8Tier::Neon
        } else {
            Utf8Tier::Portable
        };
        log::debug!("utf8 validator tier: {:?}", tier);
        Self { tier }
    }

    /// Create a validator pinned to a tier, failing if the CPU lacks it
    pub fn with_tier(tier: Utf8Tier) -> Result<Self> {
        let features = get_cpu_features();
        let available = match tier {
            Utf8Tier::Avx2 => features.has_avx2,
            Utf8Tier::Ssse3 => features.has_ssse3,
            Utf8Tier::Neon => features.has_neon,
            Utf8Tier::Portable => true,
        };
        if !available {
            return Err(StrZipError::not_supported(format!(
                "{tier:?} tier on this CPU"
            )));
        }
        Ok(Self { tier })
    }

    /// Get the selected tier
    pub fn tier(&self) -> Utf8Tier {
        self.tier
    }

    /// Validate a byte buffer as UTF-8
    ///
    /// Empty input is valid. Does not allocate beyond one stack block for
    /// the zero-padded tail.
    pub fn validate(&self, bytes: &[u8]) -> bool {
        match self.tier {
            #[cfg(target_arch = "x86_64")]
            Utf8Tier::Avx2 => unsafe { simd::validate_avx2(bytes) },
            #[cfg(target_arch = "x86_64")]
            Utf8Tier::Ssse3 => unsafe { simd::validate_ssse3(bytes) },
            #[cfg(target_arch = "aarch64")]
            Utf8Tier::Neon => unsafe { simd::validate_neon(bytes) },
            #[cfg(not(target_arch = "x86_64"))]
            Utf8Tier::Avx2 | Utf8Tier::Ssse3 => portable::validate(bytes),
            #[cfg(not(target_arch = "aarch64"))]
            Utf8Tier::Neon => portable::validate(bytes),
            Utf8Tier::Portable => portable::validate(bytes),
        }
    }
}

impl Default for Utf8Validator {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_VALIDATOR: OnceLock<Utf8Validator> = OnceLock::new();

/// Get the process-wide validator instance
pub fn get_global_validator() -> &'static Utf8Validator {
    GLOBAL_VALIDATOR.get_or_init(Utf8Validator::new)
}

/// Check a byte buffer for UTF-8 well-formedness (convenience entry)
///
/// # Examples
///
/// ```
/// use strzip::utf8::validate_utf8;
///
/// assert!(validate_utf8(b"plain ascii"));
/// assert!(validate_utf8("\u{4e16}\u{754c}".as_bytes()));
/// assert!(!validate_utf8(&[0xFF, 0xFE]));
/// ```
pub fn validate_utf8(bytes: &[u8]) -> bool {
    get_global_validator().validate(bytes)
}
