// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for the fixture language.
//!
//! Tokens carry only a kind and a byte span; their text is sliced from the
//! source on demand. Whitespace and comments (`//` to end of line, `/* */`)
//! produce no tokens. Lexical problems never stop tokenization: an unknown
//! character becomes an [`TokenKind::Unknown`] token the parser turns into an
//! error node, and unterminated literals or comments are reported alongside
//! the token stream.

use codecop_core::patch::Span;

/// Reserved words. Identifiers may not use these.
pub const KEYWORDS: &[&str] = &[
    "bool", "class", "const", "double", "else", "false", "float", "if", "int", "interface",
    "internal", "long", "new", "null", "object", "private", "protected", "public", "readonly",
    "return", "static", "string", "struct", "this", "true", "void",
];

/// Keywords usable in type position.
pub const PREDEFINED_TYPES: &[&str] = &[
    "bool", "double", "float", "int", "long", "object", "string", "void",
];

/// Is `text` a reserved word?
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword.
    Word,
    /// Numeric literal.
    Number,
    /// String or character literal (quotes included).
    Str,
    /// Operator or punctuation.
    Punct,
    /// A character that starts no token.
    Unknown,
    /// End of input (empty span at source length).
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// A lexical problem found while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: &'static str,
    pub span: Span,
}

const TWO_CHAR_PUNCT: &[&str] = &[
    "=>", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=",
];

const ONE_CHAR_PUNCT: &str = "{}()[];,.:=<>+-*/%!?&|";

/// Split `source` into tokens. The final token is always [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];

        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if source[pos..].starts_with("//") {
            pos = source[pos..]
                .find('\n')
                .map(|i| pos + i)
                .unwrap_or(bytes.len());
            continue;
        }

        if source[pos..].starts_with("/*") {
            match source[pos + 2..].find("*/") {
                Some(i) => pos = pos + 2 + i + 2,
                None => {
                    errors.push(LexError {
                        message: "unterminated block comment",
                        span: Span::new(pos, bytes.len()),
                    });
                    pos = bytes.len();
                }
            }
            continue;
        }

        let start = pos;
        let kind = if b == b'_' || b.is_ascii_alphabetic() {
            while pos < bytes.len() && (bytes[pos] == b'_' || bytes[pos].is_ascii_alphanumeric()) {
                pos += 1;
            }
            TokenKind::Word
        } else if b.is_ascii_digit() {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'.') {
                pos += 1;
            }
            TokenKind::Number
        } else if b == b'"' || b == b'\'' {
            let (end, terminated) = scan_quoted(bytes, pos, b);
            pos = end;
            if !terminated {
                errors.push(LexError {
                    message: "unterminated literal",
                    span: Span::new(start, pos),
                });
            }
            TokenKind::Str
        } else if let Some(p) = TWO_CHAR_PUNCT
            .iter()
            .find(|p| source[pos..].starts_with(**p))
        {
            pos += p.len();
            TokenKind::Punct
        } else if ONE_CHAR_PUNCT.as_bytes().contains(&b) {
            pos += 1;
            TokenKind::Punct
        } else {
            // Step over a whole UTF-8 character.
            pos += source[pos..].chars().next().map_or(1, char::len_utf8);
            TokenKind::Unknown
        };

        tokens.push(Token {
            kind,
            span: Span::new(start, pos),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(bytes.len(), bytes.len()),
    });
    (tokens, errors)
}

/// Returns the offset just past the closing quote and whether the literal was
/// closed. An unclosed literal ends at the newline or end of input.
fn scan_quoted(bytes: &[u8], start: usize, quote: u8) -> (usize, bool) {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => return (pos, false),
            c if c == quote => return (pos + 1, true),
            _ => pos += 1,
        }
    }
    (bytes.len(), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        let (tokens, _) = tokenize(source);
        tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| &source[t.span.start..t.span.end])
            .collect()
    }

    #[test]
    fn words_numbers_and_punctuation() {
        assert_eq!(
            texts("int x = a+=1; f => g;"),
            vec!["int", "x", "=", "a", "+=", "1", ";", "f", "=>", "g", ";"]
        );
    }

    #[test]
    fn comments_produce_no_tokens() {
        assert_eq!(
            texts("a // line\n/* block\n */ b"),
            vec!["a", "b"]
        );
    }

    #[test]
    fn nested_generics_close_one_bracket_at_a_time() {
        assert_eq!(
            texts("List<List<int>> x"),
            vec!["List", "<", "List", "<", "int", ">", ">", "x"]
        );
    }

    #[test]
    fn string_literals_keep_escapes_inside() {
        assert_eq!(texts(r#"s = "a\"b";"#), vec!["s", "=", r#""a\"b""#, ";"]);
    }

    #[test]
    fn lexical_errors_are_reported_not_fatal() {
        let (tokens, errors) = tokenize("x = \"open\ny /* never closed");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "unterminated literal");
        assert_eq!(errors[1].message, "unterminated block comment");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn unknown_characters_become_tokens() {
        let (tokens, errors) = tokenize("a # b");
        assert!(errors.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
    }

    #[test]
    fn keyword_table() {
        assert!(is_keyword("class"));
        assert!(!is_keyword("var"));
        assert!(!is_keyword("Widget"));
    }
}
