//! Low-level C lexing helpers.
//!
//! Just enough of C to walk top-level constructs: comments, string and
//! character literals, bracket nesting and identifiers. Nothing here builds
//! a syntax tree.

use crate::error::ConvertError;

/// Maps byte offsets to 1-based line numbers.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
    base: usize,
}

impl LineIndex {
    /// Indexes `src`, whose first line is line `base`.
    pub(crate) fn new(src: &str, base: usize) -> Self {
        let mut starts = vec![0];
        starts.extend(
            src.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { starts, base }
    }

    /// Line number of the byte at `offset`.
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        let idx = match self.starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        idx + self.base
    }
}

/// If a comment starts at `pos`, returns the offset just past it.
///
/// Line comments end before their newline. An unterminated block comment
/// is an error.
pub(crate) fn skip_comment(bytes: &[u8], pos: usize) -> Result<Option<usize>, &'static str> {
    if bytes.get(pos) != Some(&b'/') {
        return Ok(None);
    }
    match bytes.get(pos + 1) {
        Some(b'/') => {
            let end = bytes[pos..]
                .iter()
                .position(|b| *b == b'\n')
                .map_or(bytes.len(), |off| pos + off);
            Ok(Some(end))
        }
        Some(b'*') => {
            let mut i = pos + 2;
            while i + 1 < bytes.len() {
                if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                    return Ok(Some(i + 2));
                }
                i += 1;
            }
            Err("unterminated block comment")
        }
        _ => Ok(None),
    }
}

/// Skips a string or character literal whose opening quote is at `pos`.
pub(crate) fn skip_literal(bytes: &[u8], pos: usize) -> Result<usize, &'static str> {
    let quote = bytes[pos];
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return Err("unterminated literal"),
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err("unterminated literal")
}

/// Skips whitespace and comments starting at `pos`.
pub(crate) fn skip_trivia(bytes: &[u8], mut pos: usize) -> Result<usize, &'static str> {
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match skip_comment(bytes, pos)? {
            Some(end) => pos = end,
            None => return Ok(pos),
        }
    }
}

/// Offset of the newline that ends the preprocessor line starting at `pos`,
/// honouring backslash continuations. Returns `bytes.len()` at end of input.
pub(crate) fn directive_end(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let continued = i > pos && bytes[i - 1] == b'\\'
                || i > pos + 1 && bytes[i - 1] == b'\r' && bytes[i - 2] == b'\\';
            if !continued {
                return i;
            }
        }
        i += 1;
    }
    bytes.len()
}

/// Finds the bracket that closes the one at `open`.
pub(crate) fn matching_close(text: &str, open: usize) -> Result<usize, &'static str> {
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut i = open;
    while i < bytes.len() {
        if let Some(end) = skip_comment(bytes, i)? {
            i = end;
            continue;
        }
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i)?;
                continue;
            }
            b'(' | b'[' | b'{' => stack.push(bytes[i]),
            b')' | b']' | b'}' => {
                let opener = stack.pop().ok_or("unbalanced closing bracket")?;
                if !brackets_match(opener, bytes[i]) {
                    return Err("mismatched brackets");
                }
                if stack.is_empty() {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err("unterminated bracket")
}

pub(crate) const fn brackets_match(open: u8, close: u8) -> bool {
    matches!((open, close), (b'(', b')') | (b'[', b']') | (b'{', b'}'))
}

/// Replaces every comment with a single space, leaving literals intact.
pub(crate) fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut copied_from = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i).unwrap_or(bytes.len());
            }
            b'/' => match skip_comment(bytes, i) {
                Ok(Some(end)) => {
                    out.push_str(&text[copied_from..i]);
                    out.push(' ');
                    i = end;
                    copied_from = end;
                }
                Ok(None) => i += 1,
                Err(_) => {
                    out.push_str(&text[copied_from..i]);
                    copied_from = bytes.len();
                    i = bytes.len();
                }
            },
            _ => i += 1,
        }
    }
    out.push_str(&text[copied_from.min(text.len())..]);
    out
}

/// Splits on `sep` where no bracket is open. Pieces are trimmed and empty
/// pieces dropped. Expects comment-free input.
pub(crate) fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b if b == sep && depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    pieces.push(&text[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Byte offset of the first `target` outside any bracket. Expects
/// comment-free input.
pub(crate) fn find_top_level(text: &str, target: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b if b == target && depth == 0 => return Some(i),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    None
}

pub(crate) const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

pub(crate) const fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Identifier tokens of comment-free code, skipping literals and numbers.
pub(crate) fn identifiers(code: &str) -> Vec<&str> {
    let bytes = code.as_bytes();
    let mut idents = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            i = skip_literal(bytes, i).unwrap_or(bytes.len());
        } else if is_ident_start(b) {
            let start = i;
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
            idents.push(&code[start..i]);
        } else if b.is_ascii_digit() {
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    idents
}

/// First identifier in `code`.
pub(crate) fn first_identifier(code: &str) -> Option<&str> {
    identifiers(code).into_iter().next()
}

/// Last identifier in `code`.
pub(crate) fn last_identifier(code: &str) -> Option<&str> {
    identifiers(code).into_iter().last()
}

/// Maps a lexer failure onto the fatal error, with the line it happened on.
pub(crate) fn malformed(message: &str, line: usize) -> ConvertError {
    ConvertError::malformed(message, Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nbb\nccc", 1);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(8), 3);
    }

    #[test]
    fn test_matching_close_ignores_literals_and_comments() {
        let text = r#"{ a("}"), /* } */ '}' }"#;
        assert_eq!(matching_close(text, 0), Ok(text.len() - 1));
    }

    #[test]
    fn test_matching_close_unterminated() {
        assert!(matching_close("{ (a, b) ", 0).is_err());
        assert!(matching_close("{ (a, b} ", 0).is_err());
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let stripped = strip_comments("a // one\nb /* two */ c \"// three\"");
        assert_eq!(stripped, "a  \nb   c \"// three\"");
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        let parts = split_top_level("KC_A, MT(MOD_LSFT, KC_B), {1, 2}, ", b',');
        assert_eq!(parts, vec!["KC_A", "MT(MOD_LSFT, KC_B)", "{1, 2}"]);
    }

    #[test]
    fn test_identifiers_skip_numbers_and_strings() {
        let idents = identifiers("LT(5, KC_D) + 0x1F \"KC_X\" _x2");
        assert_eq!(idents, vec!["LT", "KC_D", "_x2"]);
    }

    #[test]
    fn test_directive_end_with_continuation() {
        let src = b"#define A \\\n  1\nint x;";
        assert_eq!(directive_end(src, 0), 15);
    }
}
