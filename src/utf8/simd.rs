//! Intrinsic tiers of the streaming UTF-8 validator
//!
//! AVX2 (32-byte blocks) and SSSE3 (16-byte blocks) renditions of the
//! lookup-table algorithm in `portable.rs`, plus an ARM NEON rendition.
//! The nibble tables live in `tables.rs`; each tier differs only in how it
//! expresses the shuffle, the sliding previous-block window, and the
//! saturating subtract.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "x86_64")]
use super::tables::{
    BYTE_1_HIGH, BYTE_1_LOW, BYTE_2_HIGH, FOURTH_BYTE_SUB, THIRD_BYTE_SUB,
};

//==============================================================================
// AVX2: 32-byte blocks
//==============================================================================

#[cfg(target_arch = "x86_64")]
mod avx2 {
    use super::*;

    /// Broadcast a 16-entry table into both 128-bit lanes
    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn table(entries: &[u8; 16]) -> __m256i {
        unsafe {
            _mm256_broadcastsi128_si256(_mm_loadu_si128(entries.as_ptr() as *const __m128i))
        }
    }

    /// Splice `prev ++ input` so `vpalignr` can slide the window across the
    /// 128-bit lane boundary
    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn splice(input: __m256i, prev_input: __m256i) -> __m256i {
        unsafe { _mm256_permute2x128_si256(prev_input, input, 0x21) }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn prev1(input: __m256i, prev_input: __m256i) -> __m256i {
        unsafe { _mm256_alignr_epi8::<15>(input, splice(input, prev_input)) }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn prev2(input: __m256i, prev_input: __m256i) -> __m256i {
        unsafe { _mm256_alignr_epi8::<14>(input, splice(input, prev_input)) }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn prev3(input: __m256i, prev_input: __m256i) -> __m256i {
        unsafe { _mm256_alignr_epi8::<13>(input, splice(input, prev_input)) }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn check_special_cases(input: __m256i, prev1: __m256i) -> __m256i {
        unsafe {
            let low_mask = _mm256_set1_epi8(0x0F);
            let prev1_high = _mm256_and_si256(_mm256_srli_epi16::<4>(prev1), low_mask);
            let prev1_low = _mm256_and_si256(prev1, low_mask);
            let input_high = _mm256_and_si256(_mm256_srli_epi16::<4>(input), low_mask);

            let byte_1_high = _mm256_shuffle_epi8(table(&BYTE_1_HIGH), prev1_high);
            let byte_1_low = _mm256_shuffle_epi8(table(&BYTE_1_LOW), prev1_low);
            let byte_2_high = _mm256_shuffle_epi8(table(&BYTE_2_HIGH), input_high);
            _mm256_and_si256(_mm256_and_si256(byte_1_high, byte_1_low), byte_2_high)
        }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn check_multibyte_lengths(
        input: __m256i,
        prev_input: __m256i,
        sc: __m256i,
    ) -> __m256i {
        unsafe {
            let is_third_byte = _mm256_subs_epu8(
                prev2(input, prev_input),
                _mm256_set1_epi8(THIRD_BYTE_SUB as i8),
            );
            let is_fourth_byte = _mm256_subs_epu8(
                prev3(input, prev_input),
                _mm256_set1_epi8(FOURTH_BYTE_SUB as i8),
            );
            let must23 = _mm256_or_si256(is_third_byte, is_fourth_byte);
            let must23_80 = _mm256_and_si256(must23, _mm256_set1_epi8(0x80u8 as i8));
            _mm256_xor_si256(must23_80, sc)
        }
    }

    /// Validate a buffer in 32-byte blocks; the tail is zero-padded into one
    /// final block so truncated sequences at end of input are rejected
    #[target_feature(enable = "avx2")]
    pub(crate) unsafe fn validate(bytes: &[u8]) -> bool {
        unsafe {
            let mut error = _mm256_setzero_si256();
            let mut prev_input = _mm256_setzero_si256();
            let mut pos = 0;

            while pos + 32 <= bytes.len() {
                let input = _mm256_loadu_si256(bytes.as_ptr().add(pos) as *const __m256i);
                let sc = check_special_cases(input, prev1(input, prev_input));
                error = _mm256_or_si256(error, check_multibyte_lengths(input, prev_input, sc));
                prev_input = input;
                pos += 32;
            }

            let mut tail = [0u8; 32];
            tail[..bytes.len() - pos].copy_from_slice(&bytes[pos..]);
            let input = _mm256_loadu_si256(tail.as_ptr() as *const __m256i);
            let sc = check_special_cases(input, prev1(input, prev_input));
            error = _mm256_or_si256(error, check_multibyte_lengths(input, prev_input, sc));

            _mm256_testz_si256(error, error) == 1
        }
    }
}

//==============================================================================
// SSSE3: 16-byte blocks
//==============================================================================

#[cfg(target_arch = "x86_64")]
mod ssse3 {
    use super::*;

    #[inline]
    #[target_feature(enable = "ssse3")]
    unsafe fn table(entries: &[u8; 16]) -> __m128i {
        unsafe { _mm_loadu_si128(entries.as_ptr() as *const __m128i) }
    }

    #[inline]
    #[target_feature(enable = "ssse3")]
    unsafe fn prev1(input: __m128i, prev_input: __m128i) -> __m128i {
        unsafe { _mm_alignr_epi8::<15>(input, prev_input) }
    }

    #[inline]
    #[target_feature(enable = "ssse3")]
    unsafe fn prev2(input: __m128i, prev_input: __m128i) -> __m128i {
        unsafe { _mm_alignr_epi8::<14>(input, prev_input) }
    }

    #[inline]
    #[target_feature(enable = "ssse3")]
    unsafe fn prev3(input: __m128i, prev_input: __m128i) -> __m128i {
        unsafe { _mm_alignr_epi8::<13>(input, prev_input) }
    }

    #[inline]
    #[target_feature(enable = "ssse3")]
    unsafe fn check_special_cases(input: __m128i, prev1: __m128i) -> __m128i {
        unsafe {
            let low_mask = _mm_set1_epi8(0x0F);
            let prev1_high = _mm_and_si128(_mm_srli_epi16::<4>(prev1), low_mask);
            let prev1_low = _mm_and_si128(prev1, low_mask);
            let input_high = _mm_and_si128(_mm_srli_epi16::<4>(input), low_mask);

            let byte_1_high = _mm_shuffle_epi8(table(&BYTE_1_HIGH), prev1_high);
            let byte_1_low = _mm_shuffle_epi8(table(&BYTE_1_LOW), prev1_low);
            let byte_2_high = _mm_shuffle_epi8(table(&BYTE_2_HIGH), input_high);
            _mm_and_si128(_mm_and_si128(byte_1_high, byte_1_low), byte_2_high)
        }
    }

    #[inline]
    #[target_feature(enable = "ssse3")]
    unsafe fn check_multibyte_lengths(
        input: __m128i,
        prev_input: __m128i,
        sc: __m128i,
    ) -> __m128i {
        unsafe {
            let is_third_byte =
                _mm_subs_epu8(prev2(input, prev_input), _mm_set1_epi8(THIRD_BYTE_SUB as i8));
            let is_fourth_byte =
                _mm_subs_epu8(prev3(input, prev_input), _mm_set1_epi8(FOURTH_BYTE_SUB as i8));
            let must23 = _mm_or_si128(is_third_byte, is_fourth_byte);
            let must23_80 = _mm_and_si128(must23, _mm_set1_epi8(0x80u8 as i8));
            _mm_xor_si128(must23_80, sc)
        }
    }

    #[target_feature(enable = "ssse3")]
    pub(crate) unsafe fn validate(bytes: &[u8]) -> bool {
        unsafe {
            let mut error = _mm_setzero_si128();
            let mut prev_input = _mm_setzero_si128();
            let mut pos = 0;

            while pos + 16 <= bytes.len() {
                let input = _mm_loadu_si128(bytes.as_ptr().add(pos) as *const __m128i);
                let sc = check_special_cases(input, prev1(input, prev_input));
                error = _mm_or_si128(error, check_multibyte_lengths(input, prev_input, sc));
                prev_input = input;
                pos += 16;
            }

            let mut tail = [0u8; 16];
            tail[..bytes.len() - pos].copy_from_slice(&bytes[pos..]);
            let input = _mm_loadu_si128(tail.as_ptr() as *const __m128i);
            let sc = check_special_cases(input, prev1(input, prev_input));
            error = _mm_or_si128(error, check_multibyte_lengths(input, prev_input, sc));

            let zero = _mm_setzero_si128();
            _mm_movemask_epi8(_mm_cmpeq_epi8(error, zero)) == 0xFFFF
        }
    }
}

//==============================================================================
// ARM NEON: 16-byte blocks
//==============================================================================

#[cfg(target_arch = "aarch64")]
mod neon {
    use super::super::tables::{
        BYTE_1_HIGH, BYTE_1_LOW, BYTE_2_HIGH, FOURTH_BYTE_SUB, THIRD_BYTE_SUB,
    };
    use std::arch::aarch64::*;

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn prev1(input: uint8x16_t, prev_input: uint8x16_t) -> uint8x16_t {
        unsafe { vextq_u8::<15>(prev_input, input) }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn prev2(input: uint8x16_t, prev_input: uint8x16_t) -> uint8x16_t {
        unsafe { vextq_u8::<14>(prev_input, input) }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn prev3(input: uint8x16_t, prev_input: uint8x16_t) -> uint8x16_t {
        unsafe { vextq_u8::<13>(prev_input, input) }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn check_special_cases(input: uint8x16_t, prev1: uint8x16_t) -> uint8x16_t {
        unsafe {
            let low_mask = vdupq_n_u8(0x0F);
            let prev1_high = vshrq_n_u8::<4>(prev1);
            let prev1_low = vandq_u8(prev1, low_mask);
            let input_high = vshrq_n_u8::<4>(input);

            let byte_1_high = vqtbl1q_u8(vld1q_u8(BYTE_1_HIGH.as_ptr()), prev1_high);
            let byte_1_low = vqtbl1q_u8(vld1q_u8(BYTE_1_LOW.as_ptr()), prev1_low);
            let byte_2_high = vqtbl1q_u8(vld1q_u8(BYTE_2_HIGH.as_ptr()), input_high);
            vandq_u8(vandq_u8(byte_1_high, byte_1_low), byte_2_high)
        }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn check_multibyte_lengths(
        input: uint8x16_t,
        prev_input: uint8x16_t,
        sc: uint8x16_t,
    ) -> uint8x16_t {
        unsafe {
            let is_third_byte = vqsubq_u8(prev2(input, prev_input), vdupq_n_u8(THIRD_BYTE_SUB));
            let is_fourth_byte = vqsubq_u8(prev3(input, prev_input), vdupq_n_u8(FOURTH_BYTE_SUB));
            let must23 = vorrq_u8(is_third_byte, is_fourth_byte);
            let must23_80 = vandq_u8(must23, vdupq_n_u8(0x80));
            veorq_u8(must23_80, sc)
        }
    }

    #[target_feature(enable = "neon")]
    pub(crate) unsafe fn validate(bytes: &[u8]) -> bool {
        unsafe {
            let mut error = vdupq_n_u8(0);
            let mut prev_input = vdupq_n_u8(0);
            let mut pos = 0;

            while pos + 16 <= bytes.len() {
                let input = vld1q_u8(bytes.as_ptr().add(pos));
                let sc = check_special_cases(input, prev1(input, prev_input));
                error = vorrq_u8(error, check_multibyte_lengths(input, prev_input, sc));
                prev_input = input;
                pos += 16;
            }

            let mut tail = [0u8; 16];
            tail[..bytes.len() - pos].copy_from_slice(&bytes[pos..]);
            let input = vld1q_u8(tail.as_ptr());
            let sc = check_special_cases(input, prev1(input, prev_input));
            error = vorrq_u8(error, check_multibyte_lengths(input, prev_input, sc));

            vmaxvq_u8(error) == 0
        }
    }
}

/// Validate with the AVX2 tier
///
/// # Safety
/// The caller must ensure AVX2 is available on the running CPU.
#[cfg(target_arch = "x86_64")]
pub(crate) unsafe fn validate_avx2(bytes: &[u8]) -> bool {
    unsafe { avx2::validate(bytes) }
}

/// Validate with the SSSE3 tier
///
/// # Safety
/// The caller must ensure SSSE3 is available on the running CPU.
#[cfg(target_arch = "x86_64")]
pub(crate) unsafe fn validate_ssse3(bytes: &[u8]) -> bool {
    unsafe { ssse3::validate(bytes) }
}

/// Validate with the NEON tier
///
/// # Safety
/// The caller must ensure NEON is available on the running CPU.
#[cfg(target_arch = "aarch64")]
pub(crate) unsafe fn validate_neon(bytes: &[u8]) -> bool {
    unsafe { neon::validate(bytes) }
}
