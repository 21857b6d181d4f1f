//! Encoding guard: strict UTF-8 decoding and the blank-line scan.
//!
//! The scan walks the decoded text once, tracking quote state the same way
//! the tokenizer does, so a blank line inside a quoted multi-line caption is
//! treated as caption content rather than a blank line.

use std::iter::Peekable;
use std::str::Chars;

use sv_core::violation::{ValidationError, ViolationKind};

/// Decode `bytes` as UTF-8 without replacement. Borrowed: the decoded text is
/// the only buffer the rest of the pipeline reads from.
pub fn decode_strict(bytes: &[u8]) -> Result<&str, ValidationError> {
    std::str::from_utf8(bytes).map_err(|e| {
        let offset = e.valid_up_to();
        let line = line_breaks(&bytes[..offset]) + 1;
        ValidationError::at(line, ViolationKind::Encoding { offset, detail: e.to_string() })
    })
}

/// Terminators in `bytes`: `\n`, `\r\n` (counted once) and a lone `\r`.
fn line_breaks(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
        .count()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

#[inline]
fn step(state: Scan, c: char) -> Scan {
    match (state, c) {
        (Scan::FieldStart, '"') => Scan::Quoted,
        (Scan::FieldStart | Scan::Unquoted | Scan::QuoteInQuoted, ',') => Scan::FieldStart,
        (Scan::FieldStart | Scan::Unquoted, _) => Scan::Unquoted,
        (Scan::Quoted, '"') => Scan::QuoteInQuoted,
        (Scan::Quoted, _) => Scan::Quoted,
        (Scan::QuoteInQuoted, '"') => Scan::Quoted,
        // text after a closing quote is kept literally
        (Scan::QuoteInQuoted, _) => Scan::Unquoted,
    }
}

/// Lazy iterator over the 1-based numbers of blank physical lines.
///
/// A line is blank when it starts outside a quoted field and holds only
/// whitespace. Line 1 is never reported (an empty header is a header error),
/// and the terminator that ends the last line does not open a new one.
/// Line terminators: `\n`, `\r\n`, `\r`.
pub struct BlankLines<'a> {
    chars: Peekable<Chars<'a>>,
    state: Scan,
    line: usize,
    done: bool,
}

impl<'a> BlankLines<'a> {
    pub fn new(text: &'a str) -> Self {
        BlankLines { chars: text.chars().peekable(), state: Scan::FieldStart, line: 1, done: false }
    }
}

impl Iterator for BlankLines<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while !self.done {
            let line = self.line;
            let outside = self.state == Scan::FieldStart;
            let mut chars_seen = 0usize;
            let mut all_ws = true;
            let mut terminated = false;

            while let Some(c) = self.chars.next() {
                if c == '\n' || c == '\r' {
                    if c == '\r' && self.chars.peek() == Some(&'\n') {
                        self.chars.next();
                    }
                    if self.state != Scan::Quoted {
                        self.state = Scan::FieldStart;
                    }
                    terminated = true;
                    break;
                }
                chars_seen += 1;
                all_ws &= c.is_whitespace();
                self.state = step(self.state, c);
            }

            self.line += 1;
            if !terminated {
                self.done = true;
            }
            if line > 1 && outside && all_ws && (terminated || chars_seen > 0) {
                return Some(line);
            }
        }
        None
    }
}
