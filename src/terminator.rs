//! Line terminator classification and line splitting.
//!
//! Three terminators are recognized, in matching priority order: `\r\n`,
//! `\n` and `\r`. A `\r` directly followed by `\n` is always one terminator.

use memchr::memchr2;

/// One of the three recognized line terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    CrLf,
    Lf,
    Cr,
}

impl LineTerminator {
    /// All terminators, ordered so the two-byte form is tried first.
    pub const ALL: [LineTerminator; 3] = [LineTerminator::CrLf, LineTerminator::Lf, LineTerminator::Cr];

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineTerminator::CrLf => b"\r\n",
            LineTerminator::Lf => b"\n",
            LineTerminator::Cr => b"\r",
        }
    }

    pub fn byte_len(self) -> usize {
        self.as_bytes().len()
    }
}

/// Returns the terminator `buf` starts with, preferring `\r\n` over `\r`.
pub fn prefix_terminator(buf: &[u8]) -> Option<LineTerminator> {
    LineTerminator::ALL
        .into_iter()
        .find(|t| buf.starts_with(t.as_bytes()))
}

/// Returns the terminator `buf` ends with, preferring `\r\n` over `\n`.
pub fn suffix_terminator(buf: &[u8]) -> Option<LineTerminator> {
    LineTerminator::ALL
        .into_iter()
        .find(|t| buf.ends_with(t.as_bytes()))
}

/// Removes exactly one trailing terminator, if present.
pub fn strip_trailing_terminator(data: &[u8]) -> &[u8] {
    match suffix_terminator(data) {
        Some(t) => &data[..data.len() - t.byte_len()],
        None => data,
    }
}

/// Splits `data` on every terminator.
///
/// This is a plain split: `n` terminators always produce `n + 1` pieces, so
/// `b"a\n"` yields `["a", ""]` and an empty input yields one empty piece.
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut start = 0;

    while let Some(found) = memchr2(b'\r', b'\n', &data[start..]) {
        let at = start + found;
        let terminator = prefix_terminator(&data[at..]).unwrap_or(LineTerminator::Lf);
        lines.push(data[start..at].to_vec());
        start = at + terminator.byte_len();
    }

    lines.push(data[start..].to_vec());
    lines
}

/// Splits a byte range into logical lines.
///
/// A terminator at the very end closes the last line instead of opening an
/// empty one. An empty input has no lines at all.
pub fn logical_lines(data: &[u8]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return Vec::new();
    }
    split_lines(strip_trailing_terminator(data))
}
