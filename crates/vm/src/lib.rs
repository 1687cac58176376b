//! PEG virtual machine: executes linked matching programs.
//!
//! The machine is a backtracking matcher with:
//! - A program counter into an immutable instruction array
//! - A position cursor over a slice of code units
//! - One explicit [`ExecutionStack`] holding both call-return frames and
//!   choice points, so grammar recursion never touches the host stack
//!
//! # Usage
//!
//! ```
//! use pegvm_common::{Instruction, Program};
//! use pegvm_vm::match_at;
//!
//! // 'a' / 'b'
//! let program = Program::new(vec![
//!     Instruction::choice(3),
//!     Instruction::char(b'a' as u32, 0),
//!     Instruction::commit(2),
//!     Instruction::char(b'b' as u32, 0),
//!     Instruction::end(),
//! ]);
//!
//! assert_eq!(match_at(&program, b"b", 0).unwrap(), Some(1));
//! assert_eq!(match_at(&program, b"c", 0).unwrap(), None);
//! ```
//!
//! A match that fails is `Ok(None)`. `Err` is reserved for malformed
//! programs: an unlinked `OpenCall`, a stack frame of the wrong kind, a jump
//! out of the program, or a configured stack ceiling being hit.

pub mod capture;
pub mod error;
pub mod execute;
pub mod input;
pub mod machine;
pub mod stack;

pub use capture::CaptureSpan;
pub use error::MatchError;
pub use input::CodeUnit;
pub use machine::{Match, MatchConfig, Matcher};
pub use stack::{ExecutionStack, FrameKind, StackEntry, StackLimitReached, STACK_CHUNK};

use pegvm_common::Program;

/// Match `program` against `input`, anchored at `start`, to the end of input.
///
/// Returns the position of the first unmatched code unit, which equals
/// `start` for a zero-length match, or `None` if the grammar does not match.
/// There is no retry at later start positions.
///
/// # Errors
///
/// Returns [`MatchError`] if the program violates an engine invariant or
/// `start` is past the end of `input`.
pub fn match_at<U: CodeUnit>(
    program: &Program,
    input: &[U],
    start: usize,
) -> Result<Option<usize>, MatchError> {
    Ok(Matcher::new(program)
        .match_at(input, start)?
        .map(|m| m.end))
}
