//! Nibble classification tables for lookup-based UTF-8 validation
//!
//! The streaming validator classifies each byte pair (previous byte, current
//! byte) into an error bitmask by three parallel 16-entry table lookups: the
//! high nibble of the previous byte, the low nibble of the previous byte, and
//! the high nibble of the current byte. A lane is structurally invalid iff
//! the AND of the three lookups is nonzero. The bit assignments and table
//! contents follow the Keiser/Lemire construction and must stay bit-exact;
//! every error class below names the malformation it flags.

/// Leading byte is followed by fewer continuation bytes than it announces
pub const TOO_SHORT: u8 = 1 << 0;
/// ASCII byte is followed by a continuation byte
pub const TOO_LONG: u8 = 1 << 1;
/// Overlong 3-byte encoding (`E0` followed by `80..9F`)
pub const OVERLONG_3: u8 = 1 << 2;
/// 4-byte sequence above U+10FFFF (`F4 90..` and `F5..FF` leads)
pub const TOO_LARGE: u8 = 1 << 3;
/// UTF-16 surrogate half (`ED A0..BF`)
pub const SURROGATE: u8 = 1 << 4;
/// Overlong 2-byte encoding (`C0`/`C1` leads)
pub const OVERLONG_2: u8 = 1 << 5;
/// 4-byte sequence above U+10FFFF where the second byte's high nibble is 8+
pub const TOO_LARGE_1000: u8 = 1 << 6;
/// Overlong 4-byte encoding (`F0 80..8F`)
pub const OVERLONG_4: u8 = 1 << 6;
/// Continuation byte followed by another continuation byte; legal inside
/// 3/4-byte sequences and cancelled separately by the length check
pub const TWO_CONTS: u8 = 1 << 7;

/// Bits that depend only on the high nibble of the previous byte and must be
/// carried through every low-nibble entry
pub const CARRY: u8 = TOO_SHORT | TOO_LONG | TWO_CONTS;

/// Classification by the high nibble of the previous byte
pub const BYTE_1_HIGH: [u8; 16] = [
    // 0_______: ASCII lead
    TOO_LONG, TOO_LONG, TOO_LONG, TOO_LONG,
    TOO_LONG, TOO_LONG, TOO_LONG, TOO_LONG,
    // 10______: continuation
    TWO_CONTS, TWO_CONTS, TWO_CONTS, TWO_CONTS,
    // 1100____: 2-byte lead
    TOO_SHORT | OVERLONG_2,
    // 1101____: 2-byte lead
    TOO_SHORT,
    // 1110____: 3-byte lead
    TOO_SHORT | OVERLONG_3 | SURROGATE,
    // 1111____: 4-byte lead
    TOO_SHORT | TOO_LARGE | TOO_LARGE_1000 | OVERLONG_4,
];

/// Classification by the low nibble of the previous byte
pub const BYTE_1_LOW: [u8; 16] = [
    // ____0000
    CARRY | OVERLONG_3 | OVERLONG_2 | OVERLONG_4,
    // ____0001
    CARRY | OVERLONG_2,
    // ____001_
    CARRY,
    CARRY,
    // ____0100
    CARRY | TOO_LARGE,
    // ____0101
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    // ____011_
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    // ____1___
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    // ____1101
    CARRY | TOO_LARGE | TOO_LARGE_1000 | SURROGATE,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
];

/// Classification by the high nibble of the current byte
pub const BYTE_2_HIGH: [u8; 16] = [
    // 0_______: ASCII follows
    TOO_SHORT, TOO_SHORT, TOO_SHORT, TOO_SHORT,
    TOO_SHORT, TOO_SHORT, TOO_SHORT, TOO_SHORT,
    // 1000____
    TOO_LONG | OVERLONG_2 | TWO_CONTS | OVERLONG_3 | TOO_LARGE_1000 | OVERLONG_4,
    // 1001____
    TOO_LONG | OVERLONG_2 | TWO_CONTS | OVERLONG_3 | TOO_LARGE,
    // 101_____
    TOO_LONG | OVERLONG_2 | TWO_CONTS | SURROGATE | TOO_LARGE,
    TOO_LONG | OVERLONG_2 | TWO_CONTS | SURROGATE | TOO_LARGE,
    // 11______: another lead follows
    TOO_SHORT, TOO_SHORT, TOO_SHORT, TOO_SHORT,
];

/// Saturating-subtract threshold marking bytes `>= 0xE0` (3/4-byte leads two
/// positions back imply the current byte must be a continuation)
pub const THIRD_BYTE_SUB: u8 = 0b1110_0000 - 0x80;
/// Saturating-subtract threshold marking bytes `>= 0xF0`
pub const FOURTH_BYTE_SUB: u8 = 0b1111_0000 - 0x80;
