//! Matcher configuration and per-match machine state.

use crate::capture::{CaptureEvent, CaptureSpan};
use crate::error::MatchError;
use crate::input::CodeUnit;
use crate::stack::{ExecutionStack, StackLimitReached};
use pegvm_common::{Instruction, Opcode, Program};

/// Program counter value meaning "the machine is failing".
pub(crate) const FAIL: usize = usize::MAX;

/// Tunables for a [`Matcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchConfig {
    /// Ceiling on execution stack frames. `None` lets the stack grow until
    /// memory runs out.
    pub max_stack_depth: Option<usize>,
}

impl MatchConfig {
    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = Some(depth);
        self
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Position the match started at.
    pub start: usize,
    /// Position of the first unmatched code unit.
    pub end: usize,
    /// Completed captures, ordered by where they opened.
    pub captures: Vec<CaptureSpan>,
}

impl Match {
    /// Number of code units consumed.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// A zero-length match is still a match.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Runs one linked program against inputs.
///
/// The program is only ever read, so a `Matcher` (and the program behind it)
/// can be shared freely. Each run borrows an [`ExecutionStack`] mutably for
/// its whole duration.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'p> {
    program: &'p Program,
    config: MatchConfig,
}

impl<'p> Matcher<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self::with_config(program, MatchConfig::default())
    }

    pub fn with_config(program: &'p Program, config: MatchConfig) -> Self {
        Self { program, config }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match `input[start..end]`, anchored at `start`.
    ///
    /// The stack is reset before use, so it can be reused across calls.
    /// Returns `Ok(None)` when the grammar does not match.
    pub fn run<U: CodeUnit>(
        &self,
        stack: &mut ExecutionStack,
        input: &[U],
        start: usize,
        end: usize,
    ) -> Result<Option<Match>, MatchError> {
        if start > end || end > input.len() {
            return Err(MatchError::InvalidRange {
                start,
                end,
                len: input.len(),
            });
        }

        stack.reset(self.config.max_stack_depth);
        let mut machine = Machine {
            program: self.program,
            stack,
            input,
            start,
            end,
            pc: 0,
            position: start,
            captures: Vec::new(),
            steps: 0,
        };
        machine.execute()
    }

    /// Match from `start` to the end of the input with a fresh stack.
    pub fn match_at<U: CodeUnit>(
        &self,
        input: &[U],
        start: usize,
    ) -> Result<Option<Match>, MatchError> {
        let mut stack = ExecutionStack::new();
        self.run(&mut stack, input, start, input.len())
    }
}

/// State of one match in progress.
pub(crate) struct Machine<'a, U> {
    pub(crate) program: &'a Program,
    pub(crate) stack: &'a mut ExecutionStack,
    pub(crate) input: &'a [U],
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// Instruction index, or [`FAIL`].
    pub(crate) pc: usize,
    pub(crate) position: usize,
    /// Capture log; its length is the current capture reference.
    pub(crate) captures: Vec<CaptureEvent>,
    pub(crate) steps: u64,
}

impl<'a, U: CodeUnit> Machine<'a, U> {
    /// Fetch the instruction at the current pc.
    pub(crate) fn fetch(&self) -> Result<&'a Instruction, MatchError> {
        self.program
            .get(self.pc)
            .ok_or(MatchError::UnexpectedEndOfProgram { at: self.pc })
    }

    /// Current capture reference.
    pub(crate) fn capture(&self) -> usize {
        self.captures.len()
    }

    /// Rewind the capture log to a saved reference.
    pub(crate) fn restore_capture(&mut self, capture: usize) {
        self.captures.truncate(capture);
    }

    /// Code unit at the cursor, or `None` at the end bound.
    #[inline]
    pub(crate) fn current(&self) -> Option<u32> {
        if self.position < self.end {
            Some(self.input[self.position].code())
        } else {
            None
        }
    }

    /// Absolute target of the instruction's offset, checked against the program.
    pub(crate) fn target(&self, at: usize, instr: &Instruction) -> Result<usize, MatchError> {
        instr
            .target(at)
            .filter(|&t| t < self.program.len())
            .ok_or(MatchError::JumpOutOfBounds {
                at,
                offset: instr.offset,
            })
    }

    /// Mismatch branch shared by CHAR, ANY and CHARSET: take the offset if
    /// it is non-zero, otherwise fail.
    pub(crate) fn fallback(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        self.pc = if instr.offset != 0 {
            self.target(at, instr)?
        } else {
            FAIL
        };
        Ok(())
    }

    pub(crate) fn malformed(at: usize, opcode: Opcode) -> MatchError {
        MatchError::MalformedInstruction { at, opcode }
    }

    pub(crate) fn overflow(at: usize) -> impl FnOnce(StackLimitReached) -> MatchError {
        move |e| MatchError::StackOverflow { at, limit: e.limit }
    }
}
