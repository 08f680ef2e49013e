//! Content-derived footnote identity.
//!
//! Footnote ids and margin sides are pure functions of the footnote's visible
//! text and its note markup, so they stay put across re-renders and re-layouts.
//! Two footnotes with identical text and note collide on purpose.

use smol_str::{SmolStr, format_smolstr};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the UTF-8 bytes of `input`.
pub fn fnv1a32(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Which margin a note panel lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// DOM-safe footnote identifier (`fn-<base36 hash>`).
pub type NoteId = SmolStr;

/// Build the hashing key for a footnote.
pub fn footnote_key(visible_text: &str, note_html: &str) -> String {
    format!("{visible_text}||{note_html}")
}

/// Stable identifier for a footnote key.
pub fn footnote_id(key: &str) -> NoteId {
    format_smolstr!("fn-{}", to_base36(fnv1a32(key)))
}

/// Stable side for a footnote key: odd hashes go right, even go left.
pub fn footnote_side(key: &str) -> Side {
    if fnv1a32(key) & 1 == 1 {
        Side::Right
    } else {
        Side::Left
    }
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(7);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    // Only ASCII digits were pushed.
    String::from_utf8(buf).unwrap_or_default()
}
