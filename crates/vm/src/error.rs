//! Engine invariant violations.
//!
//! A grammar that simply does not match is not an error: it is the
//! `Ok(None)` outcome of a match. Everything here means the program (or the
//! call) is malformed and the match was abandoned. Every program-related
//! variant carries the instruction index (`at`) for debugging.

use crate::stack::FrameKind;
use pegvm_common::Opcode;
use thiserror::Error;

/// Fatal errors that abort a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// An OPEN_CALL survived linking and was reached.
    #[error("unlinked OPEN_CALL to rule {rule} at instruction {at}")]
    UnlinkedCall { at: usize, rule: u32 },

    /// The top frame is not the variant the opcode requires.
    #[error("{opcode} expected a {expected} frame but found a {found} frame at instruction {at}")]
    FrameMismatch {
        at: usize,
        opcode: Opcode,
        expected: FrameKind,
        found: FrameKind,
    },

    /// An opcode needed a frame but the stack was empty.
    #[error("{opcode} on empty stack at instruction {at}")]
    StackUnderflow { at: usize, opcode: Opcode },

    /// The configured stack ceiling was reached.
    #[error("stack limit of {limit} frames exceeded at instruction {at}")]
    StackOverflow { at: usize, limit: usize },

    /// A relative jump left the program.
    #[error("jump offset {offset} at instruction {at} leaves the program")]
    JumpOutOfBounds { at: usize, offset: i32 },

    /// Control fell or returned past the last instruction.
    #[error("unexpected end of program at instruction {at}")]
    UnexpectedEndOfProgram { at: usize },

    /// The payload does not have the shape the opcode requires.
    #[error("malformed {opcode} payload at instruction {at}")]
    MalformedInstruction { at: usize, opcode: Opcode },

    /// A CHOICE look-back reaches before the position the match started at.
    #[error(
        "look-back {lookback} at instruction {at} from position {position} reaches before match start {start}"
    )]
    LookbackUnderflow {
        at: usize,
        lookback: u32,
        position: usize,
        start: usize,
    },

    /// A CAPTURE CLOSE with no open capture.
    #[error("CAPTURE CLOSE without a matching OPEN at instruction {at}")]
    UnbalancedCapture { at: usize },

    /// The start/end bounds do not describe a range of the input.
    #[error("invalid match range {start}..{end} for input of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}
