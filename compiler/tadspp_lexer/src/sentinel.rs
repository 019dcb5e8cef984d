//! Reserved in-band sentinel byte values.
//!
//! These are reproduced byte-for-byte from the original TADS 3 compiler's
//! `tctok.h` (`TOK_MACRO_FORMAL_FLAG` and friends) per the decision recorded
//! in `SPEC_FULL.md` §9: downstream fixtures and the debug-table format are
//! specified in terms of these exact values, so an unrelated internal
//! encoding would be observably different.

/// Marks a formal-parameter reference in a parsed macro body. Followed by a
/// one-byte, 1-based formal index.
pub const FORMAL_FLAG: u8 = 0x01;

/// Precedes a token that is already known to be fully macro-expanded, to
/// suppress re-expansion on rescans.
pub const FULLY_EXPANDED_FLAG: u8 = 0x02;

/// Marks the end of a macro's substituted text during rescans. Followed by
/// a 4-byte little-endian `MacroId`.
pub const MACRO_EXP_END: u8 = 0x03;

/// Local end-of-file marker for preprocessor-directive lines.
pub const END_PP_LINE: u8 = 0x04;

/// Marks a `#foreach` construct in a parsed macro body.
pub const FOREACH_FLAG: u8 = 0x05;

/// Marks a `#argcount` construct in a parsed macro body.
pub const ARGCOUNT_FLAG: u8 = 0x06;

/// Marks a `#ifempty` construct in a parsed macro body.
pub const IFEMPTY_FLAG: u8 = 0x07;

/// Marks a `#ifnempty` construct in a parsed macro body.
pub const IFNEMPTY_FLAG: u8 = 0x08;

/// `true` for any byte reserved for internal sentinel use. The line
/// assembler scrubs these out of raw source text (`SPEC_FULL.md` §4.2
/// step 3) so they are unambiguous wherever they appear afterwards.
pub fn is_sentinel_byte(b: u8) -> bool {
    (FORMAL_FLAG..=IFNEMPTY_FLAG).contains(&b)
}
