//! Error types for the PEG assembler.

use thiserror::Error;

/// Errors produced during assembly of text to a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// CAPTURE was given something other than OPEN or CLOSE.
    #[error("line {line}: unknown capture kind '{token}'")]
    UnknownCaptureKind { line: usize, token: String },

    /// An opcode did not have enough arguments.
    #[error("line {line}: {opcode} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A jump offset does not fit in 24 signed bits.
    #[error("line {line}: offset {value} does not fit in 24 bits")]
    OffsetOutOfRange { line: usize, value: i64 },

    /// A character literal is not exactly one character between quotes.
    #[error("line {line}: invalid character literal {token}")]
    InvalidChar { line: usize, token: String },

    /// A charset literal is not a bracketed list of hex bytes and ranges.
    #[error("line {line}: invalid charset literal '{token}'")]
    InvalidCharset { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = AsmError::UnknownOpcode {
            line: 3,
            token: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown opcode 'FOO'");
    }

    #[test]
    fn error_display_unknown_capture_kind() {
        let e = AsmError::UnknownCaptureKind {
            line: 5,
            token: "MIDDLE".to_string(),
        };
        assert_eq!(e.to_string(), "line 5: unknown capture kind 'MIDDLE'");
    }

    #[test]
    fn error_display_missing_argument() {
        let e = AsmError::MissingArgument {
            line: 7,
            opcode: "CHOICE",
            expected: 2,
        };
        assert_eq!(e.to_string(), "line 7: CHOICE expects 2 argument(s)");
    }

    #[test]
    fn error_display_invalid_number() {
        let e = AsmError::InvalidNumber {
            line: 2,
            token: "0xZZZZ".to_string(),
        };
        assert_eq!(e.to_string(), "line 2: invalid number '0xZZZZ'");
    }

    #[test]
    fn error_display_offset_out_of_range() {
        let e = AsmError::OffsetOutOfRange {
            line: 1,
            value: 8_388_608,
        };
        assert_eq!(
            e.to_string(),
            "line 1: offset 8388608 does not fit in 24 bits"
        );
    }

    #[test]
    fn error_display_invalid_char() {
        let e = AsmError::InvalidChar {
            line: 9,
            token: "'ab'".to_string(),
        };
        assert_eq!(e.to_string(), "line 9: invalid character literal 'ab'");
    }

    #[test]
    fn error_display_invalid_charset() {
        let e = AsmError::InvalidCharset {
            line: 4,
            token: "[zz]".to_string(),
        };
        assert_eq!(e.to_string(), "line 4: invalid charset literal '[zz]'");
    }

    #[test]
    fn error_display_unexpected_token() {
        let e = AsmError::UnexpectedToken {
            line: 4,
            token: "EXTRA".to_string(),
        };
        assert_eq!(e.to_string(), "line 4: unexpected token 'EXTRA'");
    }
}
