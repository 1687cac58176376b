//! Tokenizer for PEG assembly text.

use crate::error::AsmError;
use pegvm_common::Charset;
use std::fmt;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An identifier (opcode mnemonic, capture kind). Always uppercase.
    Ident(String),
    /// A numeric literal (decimal or hex, optionally signed).
    Number(i64),
    /// A character literal such as `'a'`, as its code point.
    Char(u32),
    /// A charset literal such as `[61-7a,5f]`.
    Set(Charset),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => f.write_str(s),
            Token::Number(n) => write!(f, "{n}"),
            Token::Char(c) => match char::from_u32(*c) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "{c:#x}"),
            },
            Token::Set(set) => f.write_str(&crate::disassembler::format_set(set)),
        }
    }
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line, so a literal `;`
/// must be written as a number.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };

    line.split_whitespace()
        .map(|word| tokenize_word(word, line_num))
        .collect()
}

fn tokenize_word(word: &str, line: usize) -> Result<Token, AsmError> {
    if word.starts_with('\'') {
        return parse_char(word, line).map(Token::Char);
    }
    if word.starts_with('[') {
        return parse_set(word, line).map(Token::Set);
    }

    let unsigned = word.strip_prefix(['-', '+']).unwrap_or(word);
    if unsigned.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
        return parse_number(word, line).map(Token::Number);
    }

    Ok(Token::Ident(word.to_uppercase()))
}

fn parse_number(word: &str, line: usize) -> Result<i64, AsmError> {
    let invalid = || AsmError::InvalidNumber {
        line,
        token: word.to_string(),
    };

    let (negative, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word.strip_prefix('+').unwrap_or(word)),
    };

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).map_err(|_| invalid())?,
        None => digits.parse::<i64>().map_err(|_| invalid())?,
    };

    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_char(word: &str, line: usize) -> Result<u32, AsmError> {
    let inner = word
        .strip_prefix('\'')
        .and_then(|w| w.strip_suffix('\''))
        .ok_or_else(|| AsmError::InvalidChar {
            line,
            token: word.to_string(),
        })?;

    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => Err(AsmError::InvalidChar {
            line,
            token: word.to_string(),
        }),
    }
}

/// Parse `[61-7a,5f]`: comma-separated hex bytes and inclusive ranges.
fn parse_set(word: &str, line: usize) -> Result<Charset, AsmError> {
    let invalid = || AsmError::InvalidCharset {
        line,
        token: word.to_string(),
    };

    let inner = word
        .strip_prefix('[')
        .and_then(|w| w.strip_suffix(']'))
        .ok_or_else(invalid)?;

    let mut set = Charset::new();
    if inner.is_empty() {
        return Ok(set);
    }

    for item in inner.split(',') {
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match item.split_once('-') {
            Some((lo, hi)) => {
                let (lo, hi) = (byte(lo)?, byte(hi)?);
                if lo > hi {
                    return Err(invalid());
                }
                set.insert_range(lo, hi);
            }
            None => set.insert(byte(item)?),
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn empty_line() {
        assert_eq!(tokenize_line("", 1).unwrap(), vec![]);
    }

    #[test]
    fn whitespace_only() {
        assert_eq!(tokenize_line("   \t  ", 1).unwrap(), vec![]);
    }

    #[test]
    fn comment_only() {
        assert_eq!(tokenize_line("; this is a comment", 1).unwrap(), vec![]);
    }

    #[test]
    fn opcode_with_comment() {
        assert_eq!(
            tokenize_line("END ; done", 1).unwrap(),
            vec![ident("END")]
        );
    }

    #[test]
    fn lowercase_opcode_uppercased() {
        assert_eq!(
            tokenize_line("  partial_commit -2", 1).unwrap(),
            vec![ident("PARTIAL_COMMIT"), Token::Number(-2)]
        );
    }

    #[test]
    fn signed_and_hex_numbers() {
        assert_eq!(
            tokenize_line("CHOICE +4 0x0a", 1).unwrap(),
            vec![ident("CHOICE"), Token::Number(4), Token::Number(10)]
        );
        assert_eq!(
            tokenize_line("JUMP -0X10", 1).unwrap(),
            vec![ident("JUMP"), Token::Number(-16)]
        );
    }

    #[test]
    fn char_literal() {
        assert_eq!(
            tokenize_line("CHAR 0 'a'", 1).unwrap(),
            vec![ident("CHAR"), Token::Number(0), Token::Char('a' as u32)]
        );
    }

    #[test]
    fn wide_char_literal() {
        assert_eq!(
            tokenize_line("'é'", 1).unwrap(),
            vec![Token::Char(0xe9)]
        );
    }

    #[test]
    fn invalid_char_literal() {
        for word in ["'ab'", "''", "'a"] {
            let err = tokenize_line(word, 6).unwrap_err();
            assert_eq!(
                err,
                AsmError::InvalidChar {
                    line: 6,
                    token: word.to_string()
                }
            );
        }
    }

    #[test]
    fn charset_literal() {
        let tokens = tokenize_line("SPAN [30-39,5f]", 1).unwrap();
        let mut expected = Charset::new();
        expected.insert_range(b'0', b'9');
        expected.insert(b'_');
        assert_eq!(tokens, vec![ident("SPAN"), Token::Set(expected)]);
    }

    #[test]
    fn empty_charset_literal() {
        assert_eq!(
            tokenize_line("[]", 1).unwrap(),
            vec![Token::Set(Charset::new())]
        );
    }

    #[test]
    fn invalid_charset_literal() {
        for word in ["[zz]", "[7a-61]", "[61", "[61,]", "[100]"] {
            let err = tokenize_line(word, 2).unwrap_err();
            assert_eq!(
                err,
                AsmError::InvalidCharset {
                    line: 2,
                    token: word.to_string()
                }
            );
        }
    }

    #[test]
    fn invalid_hex_number() {
        let err = tokenize_line("JUMP 0xZZZZ", 3).unwrap_err();
        assert_eq!(
            err,
            AsmError::InvalidNumber {
                line: 3,
                token: "0xZZZZ".to_string()
            }
        );
    }

    #[test]
    fn invalid_decimal_number() {
        let err = tokenize_line("ANY 0 99999999999999999999999", 5).unwrap_err();
        assert_eq!(
            err,
            AsmError::InvalidNumber {
                line: 5,
                token: "99999999999999999999999".to_string()
            }
        );
    }

    #[test]
    fn token_display() {
        assert_eq!(Token::Number(-3).to_string(), "-3");
        assert_eq!(Token::Char('x' as u32).to_string(), "'x'");
        assert_eq!(Token::Set((b'a'..=b'c').collect()).to_string(), "[61-63]");
    }
}
