//! Quote-aware, comma-delimited tokenizer over already-decoded text.
//!
//! Produces a lazy, single-pass sequence of [`Record`]s. Each record knows
//! the physical line it starts on and, per field, whether the field was
//! quoted. Quoting rules follow RFC 4180 with the usual lenient reader
//! behaviour: a quote inside an unquoted field is literal text, and text
//! after a closing quote is appended to the field (which is then no longer
//! considered cleanly quoted). End of input inside a quoted field and
//! oversized fields are errors.

use std::borrow::Cow;

use thiserror::Error;

/// Largest field the reader accepts, in characters.
pub const FIELD_SIZE_LIMIT: usize = 131_072;

const DELIM: u8 = b',';
const QUOTE: u8 = b'"';

/// How a field appeared in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quoting {
    Unquoted,
    /// Enclosed in quotes, nothing after the closing quote.
    Quoted,
    /// Opened with a quote, but text followed the closing quote.
    QuotedWithTrailing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    pub text: Cow<'a, str>,
    pub quoting: Quoting,
}

impl Field<'_> {
    #[inline]
    pub fn is_cleanly_quoted(&self) -> bool {
        self.quoting == Quoting::Quoted
    }
}

/// One logical row. `line` is the 1-based physical line it starts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record<'a> {
    pub line: usize,
    pub fields: Vec<Field<'a>>,
}

impl Record<'_> {
    /// A record made of a single whitespace-only unquoted field, i.e. a blank line.
    pub fn is_blank(&self) -> bool {
        matches!(self.fields.as_slice(), [f] if f.quoting == Quoting::Unquoted && f.text.trim().is_empty())
    }

    pub fn texts(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.text.to_string()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("unexpected end of data: quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: usize },
    #[error("field larger than field limit ({limit})")]
    FieldTooLarge { line: usize, limit: usize },
}

impl TableError {
    pub fn line(&self) -> usize {
        match self {
            TableError::UnterminatedQuote { line } | TableError::FieldTooLarge { line, .. } => *line,
        }
    }
}

/// Streaming reader; see module docs.
pub struct Records<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    done: bool,
}

impl<'a> Records<'a> {
    pub fn new(src: &'a str) -> Self {
        Records { src, pos: 0, line: 1, done: false }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// Consume one terminator (`\n`, `\r\n` or `\r`) at `pos`, if present.
    fn eat_terminator(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.pos += 1;
            }
            Some(b'\r') => {
                self.pos += 1;
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            _ => return false,
        }
        self.line += 1;
        true
    }

    fn check_size(&self, text: &str, line: usize) -> Result<(), TableError> {
        if text.len() > FIELD_SIZE_LIMIT && text.chars().count() > FIELD_SIZE_LIMIT {
            return Err(TableError::FieldTooLarge { line, limit: FIELD_SIZE_LIMIT });
        }
        Ok(())
    }

    /// Unquoted run up to a delimiter, terminator or end of input.
    fn scan_unquoted(&mut self) -> &'a str {
        let src: &'a str = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            if b == DELIM || b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    /// Quoted field body; `pos` is just past the opening quote.
    fn scan_quoted(&mut self, opened_on: usize) -> Result<Cow<'a, str>, TableError> {
        let src: &'a str = self.src;
        let bytes = src.as_bytes();
        let mut seg_start = self.pos;
        let mut owned: Option<String> = None;
        loop {
            match bytes.get(self.pos).copied() {
                None => return Err(TableError::UnterminatedQuote { line: opened_on }),
                Some(QUOTE) if bytes.get(self.pos + 1) == Some(&QUOTE) => {
                    // escaped quote: keep one, skip the other
                    owned.get_or_insert_with(String::new).push_str(&src[seg_start..=self.pos]);
                    self.pos += 2;
                    seg_start = self.pos;
                }
                Some(QUOTE) => {
                    let tail = &src[seg_start..self.pos];
                    self.pos += 1;
                    return Ok(match owned {
                        Some(mut s) => {
                            s.push_str(tail);
                            Cow::Owned(s)
                        }
                        None => Cow::Borrowed(tail),
                    });
                }
                Some(b'\n') => {
                    self.pos += 1;
                    self.line += 1;
                }
                Some(b'\r') => {
                    self.pos += 1;
                    if self.peek() != Some(b'\n') {
                        self.line += 1;
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn read_field(&mut self) -> Result<Field<'a>, TableError> {
        let line = self.line;
        let field = if self.peek() == Some(QUOTE) {
            self.pos += 1;
            let body = self.scan_quoted(line)?;
            match self.peek() {
                None | Some(DELIM) | Some(b'\n') | Some(b'\r') => Field { text: body, quoting: Quoting::Quoted },
                Some(_) => {
                    let rest = self.scan_unquoted();
                    let mut s = body.into_owned();
                    s.push_str(rest);
                    Field { text: Cow::Owned(s), quoting: Quoting::QuotedWithTrailing }
                }
            }
        } else {
            Field { text: Cow::Borrowed(self.scan_unquoted()), quoting: Quoting::Unquoted }
        };
        self.check_size(&field.text, line)?;
        Ok(field)
    }

    fn read_record(&mut self) -> Result<Record<'a>, TableError> {
        let line = self.line;
        let mut fields = Vec::with_capacity(2);
        loop {
            fields.push(self.read_field()?);
            if self.peek() == Some(DELIM) {
                self.pos += 1;
                continue;
            }
            // terminator or end of input closes the record
            self.eat_terminator();
            return Ok(Record { line, fields });
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.src.len() {
            return None;
        }
        let rec = self.read_record();
        if rec.is_err() {
            self.done = true;
        }
        Some(rec)
    }
}
