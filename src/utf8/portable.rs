//! Portable streaming UTF-8 validation
//!
//! The same lookup-table algorithm as the intrinsic tiers, expressed over a
//! plain 16-lane byte block. Every operation is a per-lane loop over fixed
//! arrays, which the optimizer vectorizes on targets with any SIMD at all;
//! on targets with none it degrades to straight scalar code. This tier is
//! always available and anchors the cross-tier agreement tests.

use super::tables::{
    BYTE_1_HIGH, BYTE_1_LOW, BYTE_2_HIGH, FOURTH_BYTE_SUB, THIRD_BYTE_SUB,
};

const LANES: usize = 16;

/// A 16-lane byte block with the operations the validator needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block16([u8; LANES]);

impl Block16 {
    #[inline]
    pub(crate) fn zero() -> Self {
        Self([0; LANES])
    }

    /// Load 16 bytes; `bytes` must hold at least 16
    #[inline]
    pub(crate) fn load(bytes: &[u8]) -> Self {
        let mut lanes = [0u8; LANES];
        lanes.copy_from_slice(&bytes[..LANES]);
        Self(lanes)
    }

    /// Load up to 16 bytes, zero-padding the rest
    #[inline]
    pub(crate) fn load_partial(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() < LANES);
        let mut lanes = [0u8; LANES];
        lanes[..bytes.len()].copy_from_slice(bytes);
        Self(lanes)
    }

    /// High nibble of every lane
    #[inline]
    fn shr4(self) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i] >> 4;
        }
        Self(out)
    }

    /// Low nibble of every lane
    #[inline]
    fn low_nibble(self) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i] & 0x0F;
        }
        Self(out)
    }

    /// 16-entry table lookup per lane; lane values must be `< 16`
    #[inline]
    fn lookup16(self, table: &[u8; 16]) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = table[self.0[i] as usize];
        }
        Self(out)
    }

    #[inline]
    fn and(self, other: Self) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i] & other.0[i];
        }
        Self(out)
    }

    #[inline]
    fn or(self, other: Self) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i] | other.0[i];
        }
        Self(out)
    }

    #[inline]
    fn xor(self, other: Self) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i] ^ other.0[i];
        }
        Self(out)
    }

    #[inline]
    fn and_splat(self, value: u8) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i] & value;
        }
        Self(out)
    }

    #[inline]
    fn saturating_sub_splat(self, value: u8) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = self.0[i].saturating_sub(value);
        }
        Self(out)
    }

    /// Sliding window: lane `i` of the result is byte `i - N` of the
    /// concatenation `prev ++ self` (bytes shift in from the previous block)
    #[inline]
    fn prev<const N: usize>(self, prev: Self) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = if i < N {
                prev.0[LANES - N + i]
            } else {
                self.0[i - N]
            };
        }
        Self(out)
    }

    #[inline]
    fn any_nonzero(self) -> bool {
        self.0.iter().any(|&b| b != 0)
    }
}

/// Streaming checker state: accumulated error lanes and the previous block
pub(crate) struct PortableChecker {
    error: Block16,
    prev_input: Block16,
}

impl PortableChecker {
    pub(crate) fn new() -> Self {
        Self {
            error: Block16::zero(),
            prev_input: Block16::zero(),
        }
    }

    /// Structural classification of (previous byte, current byte) pairs
    #[inline]
    fn check_special_cases(input: Block16, prev1: Block16) -> Block16 {
        let byte_1_high = prev1.shr4().lookup16(&BYTE_1_HIGH);
        let byte_1_low = prev1.low_nibble().lookup16(&BYTE_1_LOW);
        let byte_2_high = input.shr4().lookup16(&BYTE_2_HIGH);
        byte_1_high.and(byte_1_low).and(byte_2_high)
    }

    /// Continuation-position check: lanes two back from a 3/4-byte lead or
    /// three back from a 4-byte lead must be continuations. XOR cancels the
    /// TWO_CONTS marker where a double continuation is in fact required.
    #[inline]
    fn check_multibyte_lengths(input: Block16, prev_input: Block16, sc: Block16) -> Block16 {
        let prev2 = input.prev::<2>(prev_input);
        let prev3 = input.prev::<3>(prev_input);
        let is_third_byte = prev2.saturating_sub_splat(THIRD_BYTE_SUB);
        let is_fourth_byte = prev3.saturating_sub_splat(FOURTH_BYTE_SUB);
        let must23_80 = is_third_byte.or(is_fourth_byte).and_splat(0x80);
        must23_80.xor(sc)
    }

    /// Feed one 16-byte block
    #[inline]
    pub(crate) fn check_block(&mut self, input: Block16) {
        let prev1 = input.prev::<1>(self.prev_input);
        let sc = Self::check_special_cases(input, prev1);
        self.error = self
            .error
            .or(Self::check_multibyte_lengths(input, self.prev_input, sc));
        self.prev_input = input;
    }

    pub(crate) fn has_error(&self) -> bool {
        self.error.any_nonzero()
    }
}

/// Validate a buffer with the portable streaming checker
///
/// Full 16-byte blocks are streamed through the checker; the tail is
/// zero-padded into one final block, which also rejects a multi-byte
/// sequence left incomplete at the end of input (its missing continuation
/// lanes read as NUL and classify as TOO_SHORT).
pub(crate) fn validate(bytes: &[u8]) -> bool {
    let mut checker = PortableChecker::new();
    let mut pos = 0;
    while pos + LANES <= bytes.len() {
        checker.check_block(Block16::load(&bytes[pos..]));
        pos += LANES;
    }
    checker.check_block(Block16::load_partial(&bytes[pos..]));
    !checker.has_error()
}
