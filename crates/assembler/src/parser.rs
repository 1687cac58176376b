//! Parser for PEG assembly tokens → instructions.
//!
//! Dispatches on the opcode to its argument pattern. Every line yields at
//! most one instruction.

use crate::error::AsmError;
use crate::lexer::Token;
use pegvm_common::instruction::{MAX_OFFSET, MIN_OFFSET};
use pegvm_common::opcode::ALL_OPCODES;
use pegvm_common::{CaptureKind, Charset, Instruction, Opcode, Payload};

fn lookup_opcode(mnemonic: &str) -> Option<Opcode> {
    ALL_OPCODES
        .iter()
        .find(|op| op.mnemonic() == mnemonic)
        .copied()
}

fn lookup_capture_kind(name: &str) -> Option<CaptureKind> {
    [CaptureKind::Open, CaptureKind::Close]
        .into_iter()
        .find(|kind| kind.name() == name)
}

/// Parse the tokens of a single line into an instruction.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Instruction>, AsmError> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    let mnemonic = match first {
        Token::Ident(s) => s.as_str(),
        other => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: other.to_string(),
            })
        }
    };

    let opcode = lookup_opcode(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    let args = Args {
        tokens: &tokens[1..],
        line: line_num,
        opcode: opcode.mnemonic(),
    };

    let instr = match opcode {
        // No arguments
        Opcode::End | Opcode::Return | Opcode::Fail | Opcode::FailTwice => {
            args.expect_end(0)?;
            Instruction::new(opcode, 0, Payload::None)
        }

        // Offset only
        Opcode::Jump
        | Opcode::Call
        | Opcode::Commit
        | Opcode::PartialCommit
        | Opcode::BackCommit => {
            let offset = args.offset(0, 1)?;
            args.expect_end(1)?;
            Instruction::new(opcode, offset, Payload::None)
        }

        // Offset + look-back count
        Opcode::Choice => {
            let offset = args.offset(0, 2)?;
            let lookback = args.u32(1, 2)?;
            args.expect_end(2)?;
            Instruction::choice_with_lookback(offset, lookback)
        }

        // Fallback offset + code unit
        Opcode::Char => {
            let offset = args.offset(0, 2)?;
            let unit = args.unit(1, 2)?;
            args.expect_end(2)?;
            Instruction::char(unit, offset)
        }

        // Fallback offset + count
        Opcode::Any => {
            let offset = args.offset(0, 2)?;
            let count = args.u32(1, 2)?;
            args.expect_end(2)?;
            Instruction::any(count, offset)
        }

        // Fallback offset + set
        Opcode::Charset => {
            let offset = args.offset(0, 2)?;
            let set = args.set(1, 2)?;
            args.expect_end(2)?;
            Instruction::charset(set, offset)
        }

        Opcode::Span => {
            let set = args.set(0, 1)?;
            args.expect_end(1)?;
            Instruction::span(set)
        }

        Opcode::Capture => {
            let kind = args.capture_kind(0, 1)?;
            args.expect_end(1)?;
            Instruction::capture(kind)
        }

        Opcode::OpenCall => {
            let rule = args.u32(0, 1)?;
            args.expect_end(1)?;
            Instruction::open_call(rule)
        }
    };

    Ok(Some(instr))
}

/// Operand tokens of one line, with enough context to report errors.
struct Args<'t> {
    tokens: &'t [Token],
    line: usize,
    opcode: &'static str,
}

impl Args<'_> {
    fn get(&self, idx: usize, expected: usize) -> Result<&Token, AsmError> {
        self.tokens.get(idx).ok_or(AsmError::MissingArgument {
            line: self.line,
            opcode: self.opcode,
            expected,
        })
    }

    fn unexpected(&self, token: &Token) -> AsmError {
        AsmError::UnexpectedToken {
            line: self.line,
            token: token.to_string(),
        }
    }

    fn number(&self, idx: usize, expected: usize) -> Result<i64, AsmError> {
        match self.get(idx, expected)? {
            Token::Number(n) => Ok(*n),
            other => Err(self.unexpected(other)),
        }
    }

    /// A signed offset that fits the 24-bit field.
    fn offset(&self, idx: usize, expected: usize) -> Result<i32, AsmError> {
        let n = self.number(idx, expected)?;
        if n < MIN_OFFSET as i64 || n > MAX_OFFSET as i64 {
            return Err(AsmError::OffsetOutOfRange {
                line: self.line,
                value: n,
            });
        }
        Ok(n as i32)
    }

    fn u32(&self, idx: usize, expected: usize) -> Result<u32, AsmError> {
        let n = self.number(idx, expected)?;
        u32::try_from(n).map_err(|_| AsmError::InvalidNumber {
            line: self.line,
            token: n.to_string(),
        })
    }

    /// A code unit, written as a number or a character literal.
    fn unit(&self, idx: usize, expected: usize) -> Result<u32, AsmError> {
        match self.get(idx, expected)? {
            Token::Char(c) => Ok(*c),
            Token::Number(_) => self.u32(idx, expected),
            other => Err(self.unexpected(other)),
        }
    }

    fn set(&self, idx: usize, expected: usize) -> Result<Charset, AsmError> {
        match self.get(idx, expected)? {
            Token::Set(set) => Ok(*set),
            other => Err(self.unexpected(other)),
        }
    }

    fn capture_kind(&self, idx: usize, expected: usize) -> Result<CaptureKind, AsmError> {
        match self.get(idx, expected)? {
            Token::Ident(s) => lookup_capture_kind(s).ok_or_else(|| AsmError::UnknownCaptureKind {
                line: self.line,
                token: s.clone(),
            }),
            other => Err(self.unexpected(other)),
        }
    }

    /// Check that there are no tokens past the first `count`.
    fn expect_end(&self, count: usize) -> Result<(), AsmError> {
        match self.tokens.get(count) {
            Some(tok) => Err(self.unexpected(tok)),
            None => Ok(()),
        }
    }
}
