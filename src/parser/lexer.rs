//! Line-aware token cursor for the static trace grammar.
//!
//! Tokens are whitespace-delimited words. The cursor also hands out the
//! remainder of the current line, which is how disassembly text is read,
//! and tracks line numbers for diagnostics.

use crate::utils::config::{CLOSE_DELIMITER, OPEN_DELIMITER};
use crate::utils::error::ParseError;

/// Classification of a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenBrace,
    CloseBrace,
    Word,
}

/// A whitespace-delimited token and the line it starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub line: usize,
}

impl<'a> Token<'a> {
    pub fn kind(&self) -> TokenKind {
        match self.text {
            OPEN_DELIMITER => TokenKind::OpenBrace,
            CLOSE_DELIMITER => TokenKind::CloseBrace,
            _ => TokenKind::Word,
        }
    }

    /// Interpret the token as a hexadecimal id (`0x` prefix optional)
    pub fn as_hex(&self) -> Result<u64, ParseError> {
        parse_hex(self.text).ok_or_else(|| ParseError::InvalidNumber {
            line: self.line,
            token: self.text.to_string(),
            radix: "hexadecimal",
        })
    }

    /// Interpret the token as a decimal count
    pub fn as_count(&self) -> Result<usize, ParseError> {
        self.text.parse::<usize>().map_err(|_| ParseError::InvalidNumber {
            line: self.line,
            token: self.text.to_string(),
            radix: "decimal",
        })
    }
}

/// Parse a hexadecimal id, accepting an optional `0x`/`0X` prefix
pub fn parse_hex(text: &str) -> Option<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Cursor over the static trace text
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    /// Current (1-based) line number
    pub fn line(&self) -> usize {
        self.line
    }

    /// True when only whitespace is left
    pub fn is_at_end(&self) -> bool {
        self.src[self.pos..].trim().is_empty()
    }

    fn skip_whitespace(&mut self) {
        let src = self.src;
        let rest = &src[self.pos..];
        let trimmed = rest.trim_start();
        let skipped = &rest[..rest.len() - trimmed.len()];
        self.line += skipped.matches('\n').count();
        self.pos += skipped.len();
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace();
        let src = self.src;
        let rest = &src[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = Token {
            text: &rest[..end],
            line: self.line,
        };
        self.pos += end;
        Some(token)
    }

    /// Next token, or `UnexpectedEof` naming what was being read
    pub fn expect_token(&mut self, context: &str) -> Result<Token<'a>, ParseError> {
        let line = self.line;
        self.next_token().ok_or_else(|| ParseError::UnexpectedEof {
            line,
            context: context.to_string(),
        })
    }

    /// Rest of the current line, consuming its line break
    pub fn rest_of_line(&mut self) -> &'a str {
        let src = self.src;
        let rest = &src[self.pos..];
        match rest.find('\n') {
            Some(end) => {
                self.pos += end + 1;
                self.line += 1;
                rest[..end].trim_end_matches('\r')
            }
            None => {
                self.pos = self.src.len();
                rest.trim_end_matches('\r')
            }
        }
    }

    /// The whole next line, or `None` at end of input
    pub fn next_line(&mut self) -> Option<&'a str> {
        if self.pos >= self.src.len() {
            return None;
        }
        Some(self.rest_of_line())
    }

    pub fn peek_line(&self) -> Option<&'a str> {
        self.clone().next_line()
    }
}
