use std::borrow::Cow;

use crate::{CodecError, Limits};

/// Kind of the next JSON token, without consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    ValueSeparator,
    NameSeparator,
    String,
    Number,
    True,
    False,
    Null,
}

/// Positioned JSON source.
///
/// Structural reads (`read_is_begin_*`, `read_is_end_*`) track nesting depth
/// against [`Limits::max_depth`]; every method skips leading whitespace.
#[derive(Debug)]
pub struct JsonReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    limits: Limits,
}

impl<'a> JsonReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_limits(bytes, Limits::default())
    }

    pub fn with_limits(bytes: &'a [u8], limits: Limits) -> Self {
        Self {
            bytes,
            pos: 0,
            depth: 0,
            limits,
        }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.bytes.get(self.pos) {
            self.pos += 1;
        }
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    fn expect_byte(&mut self, byte: u8, expected: &'static str) -> Result<(), CodecError> {
        match self.peek_byte() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            other => Err(CodecError::unexpected(expected, other, self.pos)),
        }
    }

    fn expect_literal(
        &mut self,
        literal: &'static [u8],
        expected: &'static str,
    ) -> Result<(), CodecError> {
        self.skip_whitespace();
        if self.bytes[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(CodecError::unexpected(
                expected,
                self.bytes.get(self.pos).copied(),
                self.pos,
            ))
        }
    }

    pub fn peek_token(&mut self) -> Result<Token, CodecError> {
        let token = match self.peek_byte() {
            Some(b'{') => Token::BeginObject,
            Some(b'}') => Token::EndObject,
            Some(b'[') => Token::BeginArray,
            Some(b']') => Token::EndArray,
            Some(b',') => Token::ValueSeparator,
            Some(b':') => Token::NameSeparator,
            Some(b'"') => Token::String,
            Some(b'-' | b'0'..=b'9') => Token::Number,
            Some(b't') => Token::True,
            Some(b'f') => Token::False,
            Some(b'n') => Token::Null,
            other => return Err(CodecError::unexpected("a JSON value", other, self.pos)),
        };
        Ok(token)
    }

    /// Consumes `null` if it is the next token.
    pub fn read_is_null(&mut self) -> Result<bool, CodecError> {
        if self.peek_byte() == Some(b'n') {
            self.expect_literal(b"null", "null")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn enter(&mut self) -> Result<(), CodecError> {
        if self.depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn read_is_begin_object_with_verify(&mut self) -> Result<(), CodecError> {
        self.expect_byte(b'{', "'{'")?;
        self.enter()
    }

    /// Returns `true` once the closing `}` is consumed; otherwise consumes the
    /// value separator that precedes every member after the first. Members
    /// count against [`Limits::max_sequence_len`] like array elements.
    pub fn read_is_end_object_with_skip_value_separator(
        &mut self,
        count: &mut usize,
    ) -> Result<bool, CodecError> {
        if self.peek_byte() == Some(b'}') {
            self.pos += 1;
            self.leave();
            return Ok(true);
        }
        if *count != 0 {
            self.expect_byte(b',', "',' or '}'")?;
        }
        *count += 1;
        if *count > self.limits.max_sequence_len {
            return Err(CodecError::SequenceTooLong {
                limit: self.limits.max_sequence_len,
            });
        }
        Ok(false)
    }

    pub fn read_is_begin_array_with_verify(&mut self) -> Result<(), CodecError> {
        self.expect_byte(b'[', "'['")?;
        self.enter()
    }

    pub fn read_is_end_array_with_skip_value_separator(
        &mut self,
        count: &mut usize,
    ) -> Result<bool, CodecError> {
        if self.peek_byte() == Some(b']') {
            self.pos += 1;
            self.leave();
            return Ok(true);
        }
        if *count != 0 {
            self.expect_byte(b',', "',' or ']'")?;
        }
        *count += 1;
        if *count > self.limits.max_sequence_len {
            return Err(CodecError::SequenceTooLong {
                limit: self.limits.max_sequence_len,
            });
        }
        Ok(false)
    }

    pub fn read_name_separator(&mut self) -> Result<(), CodecError> {
        self.expect_byte(b':', "':'")
    }

    /// Reads a property name and its `:`, returning the unescaped bytes.
    pub fn read_property_name_raw(&mut self) -> Result<Cow<'a, [u8]>, CodecError> {
        let name = self.read_string_raw()?;
        self.read_name_separator()?;
        Ok(name)
    }

    pub fn read_property_name(&mut self) -> Result<Cow<'a, str>, CodecError> {
        let offset = self.pos;
        let raw = self.read_property_name_raw()?;
        into_str(raw, offset)
    }

    pub fn read_string(&mut self) -> Result<Cow<'a, str>, CodecError> {
        let offset = self.pos;
        let raw = self.read_string_raw()?;
        into_str(raw, offset)
    }

    /// Reads a string literal, borrowing when it holds no escapes.
    pub fn read_string_raw(&mut self) -> Result<Cow<'a, [u8]>, CodecError> {
        self.expect_byte(b'"', "a string")?;
        let bytes = self.bytes;
        let start = self.pos;
        loop {
            match bytes.get(self.pos) {
                Some(b'"') => {
                    let slice = &bytes[start..self.pos];
                    self.pos += 1;
                    return Ok(Cow::Borrowed(slice));
                }
                Some(b'\\') => break,
                Some(_) => self.pos += 1,
                None => return Err(CodecError::UnexpectedEof { offset: self.pos }),
            }
        }

        let mut owned = bytes[start..self.pos].to_vec();
        loop {
            match bytes.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(Cow::Owned(owned));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.read_escape(&mut owned)?;
                }
                Some(&byte) => {
                    owned.push(byte);
                    self.pos += 1;
                }
                None => return Err(CodecError::UnexpectedEof { offset: self.pos }),
            }
        }
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let offset = self.pos;
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(CodecError::UnexpectedEof { offset })?;
        self.pos += 1;
        let simple = match byte {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let ch = self.read_unicode_escape()?;
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                return Ok(());
            }
            other => {
                return Err(CodecError::InvalidString {
                    offset,
                    reason: format!("unknown escape '\\{}'", char::from(other)),
                })
            }
        };
        out.push(simple);
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u16, CodecError> {
        let offset = self.pos;
        let digits = self
            .bytes
            .get(self.pos..self.pos + 4)
            .ok_or(CodecError::UnexpectedEof { offset })?;
        let text = std::str::from_utf8(digits).map_err(|_| CodecError::InvalidString {
            offset,
            reason: "invalid \\u escape".to_string(),
        })?;
        let value = u16::from_str_radix(text, 16).map_err(|_| CodecError::InvalidString {
            offset,
            reason: format!("invalid \\u escape '{text}'"),
        })?;
        self.pos += 4;
        Ok(value)
    }

    fn read_unicode_escape(&mut self) -> Result<char, CodecError> {
        let offset = self.pos;
        let high = self.read_hex4()?;
        let scalar = if (0xD800..0xDC00).contains(&high) {
            if self.bytes.get(self.pos..self.pos + 2) != Some(b"\\u") {
                return Err(CodecError::InvalidString {
                    offset,
                    reason: "unpaired surrogate".to_string(),
                });
            }
            self.pos += 2;
            let low = self.read_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(CodecError::InvalidString {
                    offset,
                    reason: "unpaired surrogate".to_string(),
                });
            }
            0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
        } else {
            u32::from(high)
        };
        char::from_u32(scalar).ok_or_else(|| CodecError::InvalidString {
            offset,
            reason: "invalid unicode scalar".to_string(),
        })
    }

    fn read_number_text(&mut self) -> Result<(&'a str, usize), CodecError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9') = self.bytes.get(self.pos) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(CodecError::unexpected(
                "a number",
                self.bytes.get(start).copied(),
                start,
            ));
        }
        // Only ASCII bytes were accepted above.
        let bytes = self.bytes;
        let text = std::str::from_utf8(&bytes[start..self.pos]).map_err(|_| {
            CodecError::InvalidNumber {
                offset: start,
                reason: "non-ASCII digits".to_string(),
            }
        })?;
        Ok((text, start))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        let (text, offset) = self.read_number_text()?;
        text.parse().map_err(|e| CodecError::InvalidNumber {
            offset,
            reason: format!("'{text}': {e}"),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        let (text, offset) = self.read_number_text()?;
        text.parse().map_err(|e| CodecError::InvalidNumber {
            offset,
            reason: format!("'{text}': {e}"),
        })
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        let (text, offset) = self.read_number_text()?;
        text.parse().map_err(|e| CodecError::InvalidNumber {
            offset,
            reason: format!("'{text}': {e}"),
        })
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.peek_byte() {
            Some(b't') => self.expect_literal(b"true", "true").map(|_| true),
            Some(b'f') => self.expect_literal(b"false", "false").map(|_| false),
            other => Err(CodecError::unexpected("a boolean", other, self.pos)),
        }
    }

    /// Skips one complete value, including any nested members.
    pub fn read_next_block(&mut self) -> Result<(), CodecError> {
        match self.peek_token()? {
            Token::BeginObject => {
                self.read_is_begin_object_with_verify()?;
                let mut count = 0;
                while !self.read_is_end_object_with_skip_value_separator(&mut count)? {
                    self.read_property_name_raw()?;
                    self.read_next_block()?;
                }
                Ok(())
            }
            Token::BeginArray => {
                self.read_is_begin_array_with_verify()?;
                let mut count = 0;
                while !self.read_is_end_array_with_skip_value_separator(&mut count)? {
                    self.read_next_block()?;
                }
                Ok(())
            }
            Token::String => self.read_string_raw().map(|_| ()),
            Token::Number => self.read_number_text().map(|_| ()),
            Token::True | Token::False => self.read_bool().map(|_| ()),
            Token::Null => self.expect_literal(b"null", "null"),
            Token::EndObject | Token::EndArray | Token::ValueSeparator | Token::NameSeparator => {
                Err(CodecError::unexpected(
                    "a JSON value",
                    self.bytes.get(self.pos).copied(),
                    self.pos,
                ))
            }
        }
    }

    /// Fails unless only whitespace remains.
    pub fn finish(mut self) -> Result<(), CodecError> {
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(CodecError::TrailingBytes { offset: self.pos });
        }
        Ok(())
    }
}

fn into_str(raw: Cow<'_, [u8]>, offset: usize) -> Result<Cow<'_, str>, CodecError> {
    let invalid = |e: std::str::Utf8Error| CodecError::InvalidString {
        offset,
        reason: e.to_string(),
    };
    match raw {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(invalid),
        Cow::Owned(bytes) => String::from_utf8(bytes)
            .map(Cow::Owned)
            .map_err(|e| invalid(e.utf8_error())),
    }
}
