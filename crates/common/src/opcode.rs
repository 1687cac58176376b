//! Opcode definitions for the PEG instruction set.
//!
//! Byte values are stable: they are what the binary program format stores.

use crate::charset::CHARSET_BYTES;
use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// `OpenCall` is the only non-executable opcode. It exists between grammar
/// compilation and linking and must never reach the engine.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Succeed with the current position.
    End = 0,
    /// Match one code unit exactly. A non-zero offset is the fallback on mismatch.
    Char = 1,
    /// Unconditional relative jump.
    Jump = 2,
    /// Push a choice point whose alternative is `pc + offset`.
    Choice = 3,
    /// Push a return frame for `pc + 1` and jump to `pc + offset`.
    Call = 4,
    /// Pop a return frame and resume there.
    Return = 5,
    /// Discard the top choice point and jump.
    Commit = 6,
    /// Record a capture boundary.
    Capture = 7,
    /// Enter the failure state.
    Fail = 8,

    // Extended codes
    /// Consume `count` code units of any value.
    Any = 9,
    /// Match one code unit whose value is in the charset.
    Charset = 10,
    /// Refresh the top choice point with the current state and jump.
    PartialCommit = 11,
    /// Consume the longest run of code units in the charset.
    Span = 12,
    /// Discard the top frame, then fail.
    FailTwice = 13,
    /// Pop the top choice point, restore its state and jump.
    BackCommit = 14,

    // Non-executable
    /// Unresolved rule reference, replaced by `Call` at link time.
    OpenCall = 15,
}

/// All opcodes, in byte order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 16] = [
    Opcode::End,
    Opcode::Char,
    Opcode::Jump,
    Opcode::Choice,
    Opcode::Call,
    Opcode::Return,
    Opcode::Commit,
    Opcode::Capture,
    Opcode::Fail,
    Opcode::Any,
    Opcode::Charset,
    Opcode::PartialCommit,
    Opcode::Span,
    Opcode::FailTwice,
    Opcode::BackCommit,
    Opcode::OpenCall,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ALL_OPCODES
            .get(value as usize)
            .copied()
            .ok_or(DecodeError::UnknownOpcode(value))
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::End => "END",
            Opcode::Char => "CHAR",
            Opcode::Jump => "JUMP",
            Opcode::Choice => "CHOICE",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Commit => "COMMIT",
            Opcode::Capture => "CAPTURE",
            Opcode::Fail => "FAIL",
            Opcode::Any => "ANY",
            Opcode::Charset => "CHARSET",
            Opcode::PartialCommit => "PARTIAL_COMMIT",
            Opcode::Span => "SPAN",
            Opcode::FailTwice => "FAIL_TWICE",
            Opcode::BackCommit => "BACK_COMMIT",
            Opcode::OpenCall => "OPEN_CALL",
        }
    }

    /// Length in bytes of the payload that follows the 4-byte header.
    ///
    /// Always a multiple of four so encoded instructions stay word aligned.
    pub fn payload_len(&self) -> usize {
        match self {
            Opcode::Char | Opcode::Choice | Opcode::Capture | Opcode::Any | Opcode::OpenCall => 4,
            Opcode::Charset | Opcode::Span => CHARSET_BYTES,
            _ => 0,
        }
    }

    /// Whether the offset field carries meaning for this opcode.
    ///
    /// For `Char`, `Any` and `Charset` the offset is a fallback taken on
    /// mismatch, and only when it is non-zero.
    pub fn uses_offset(&self) -> bool {
        matches!(
            self,
            Opcode::Char
                | Opcode::Jump
                | Opcode::Choice
                | Opcode::Call
                | Opcode::Commit
                | Opcode::Any
                | Opcode::Charset
                | Opcode::PartialCommit
                | Opcode::BackCommit
        )
    }

    /// True for opcodes whose offset is only a mismatch fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Opcode::Char | Opcode::Any | Opcode::Charset)
    }

    /// True if control never continues at `pc + 1` after this opcode.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Opcode::End
                | Opcode::Jump
                | Opcode::Return
                | Opcode::Commit
                | Opcode::Fail
                | Opcode::PartialCommit
                | Opcode::FailTwice
                | Opcode::BackCommit
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
