//! Byte-at-a-time scanner for the S-expression grammar.
//!
//! The grammar is the minimal Lispish one: runs of ASCII whitespace
//! separate tokens, and a token is `(`, `)`, or an atom, where an atom is a
//! maximal run of bytes that are neither whitespace nor a parenthesis.
//! Atoms carry no interpretation here; the parser decides when to intern.

/// One token scanned from the input. Atom payloads borrow the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    LeftParen,
    RightParen,
    Atom(&'a [u8]),
    End,
}

/// Whitespace is ASCII space, tab, LF, and CR; never significant beyond
/// separating tokens.
#[inline]
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_atom_byte(byte: u8) -> bool {
    !is_whitespace(byte) && byte != b'(' && byte != b')'
}

/// Cursor over the input bytes.
pub(crate) struct Tokenizer<'a> {
    input: &'a [u8],
    cursor: usize,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Tokenizer<'a> {
        Tokenizer { input, cursor: 0 }
    }

    /// Scans the next token, skipping leading whitespace. Returns
    /// [`Token::End`] once the input is exhausted.
    pub(crate) fn next_token(&mut self) -> Token<'a> {
        while self.cursor < self.input.len() && is_whitespace(self.input[self.cursor]) {
            self.cursor += 1;
        }

        if self.cursor >= self.input.len() {
            return Token::End;
        }

        match self.input[self.cursor] {
            b'(' => {
                self.cursor += 1;
                Token::LeftParen
            }
            b')' => {
                self.cursor += 1;
                Token::RightParen
            }
            _ => {
                let start = self.cursor;
                while self.cursor < self.input.len() && is_atom_byte(self.input[self.cursor]) {
                    self.cursor += 1;
                }
                Token::Atom(&self.input[start..self.cursor])
            }
        }
    }
}
