//! Main execution loop and opcode dispatch for the PEG VM.

use crate::capture::{self, CaptureEvent};
use crate::error::MatchError;
use crate::input::CodeUnit;
use crate::machine::{Machine, Match, FAIL};
use crate::stack::{FrameKind, StackEntry};
use pegvm_common::{Instruction, Opcode};
use tracing::{debug, trace};

impl<'a, U: CodeUnit> Machine<'a, U> {
    /// Run until END succeeds, failure exhausts the stack, or an invariant
    /// is violated.
    pub(crate) fn execute(&mut self) -> Result<Option<Match>, MatchError> {
        debug!(
            start = self.start,
            end = self.end,
            instructions = self.program.len(),
            "match started"
        );

        loop {
            if self.pc == FAIL {
                match self.stack.pop() {
                    None => {
                        debug!(steps = self.steps, peak = self.stack.peak(), "no match");
                        return Ok(None);
                    }
                    Some(StackEntry::Backtrack {
                        alternative,
                        position,
                        capture,
                    }) => {
                        trace!(pc = alternative, position, "backtrack");
                        self.pc = alternative;
                        self.position = position;
                        self.restore_capture(capture);
                    }
                    // Left behind by a call that failed part way through.
                    Some(StackEntry::Return { resume }) => {
                        trace!(resume, "discarding return frame");
                    }
                }
                continue;
            }

            let at = self.pc;
            let instr = self.fetch()?;
            self.steps += 1;

            match instr.opcode {
                Opcode::End => return self.exec_end().map(Some),
                Opcode::Char => self.exec_char(at, instr)?,
                Opcode::Any => self.exec_any(at, instr)?,
                Opcode::Charset => self.exec_charset(at, instr)?,
                Opcode::Span => self.exec_span(at, instr)?,
                Opcode::Jump => self.pc = self.target(at, instr)?,
                Opcode::Choice => self.exec_choice(at, instr)?,
                Opcode::Call => self.exec_call(at, instr)?,
                Opcode::Return => self.exec_return(at)?,
                Opcode::Commit => self.exec_commit(at, instr)?,
                Opcode::PartialCommit => self.exec_partial_commit(at, instr)?,
                Opcode::BackCommit => self.exec_back_commit(at, instr)?,
                Opcode::FailTwice => self.exec_fail_twice(at)?,
                Opcode::Fail => self.pc = FAIL,
                Opcode::Capture => self.exec_capture(at, instr)?,
                Opcode::OpenCall => {
                    return Err(MatchError::UnlinkedCall {
                        at,
                        rule: instr.rule().unwrap_or_default(),
                    })
                }
            }
        }
    }

    fn exec_end(&mut self) -> Result<Match, MatchError> {
        let captures = capture::resolve(&self.captures)?;
        debug!(
            end = self.position,
            captures = captures.len(),
            steps = self.steps,
            peak = self.stack.peak(),
            "match succeeded"
        );
        Ok(Match {
            start: self.start,
            end: self.position,
            captures,
        })
    }

    // ---- Input matching ----

    fn exec_char(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let unit = instr
            .unit()
            .ok_or_else(|| Self::malformed(at, instr.opcode))?;
        if self.current() == Some(unit) {
            self.position += 1;
            self.pc = at + 1;
            Ok(())
        } else {
            self.fallback(at, instr)
        }
    }

    fn exec_any(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let count = instr
            .count()
            .ok_or_else(|| Self::malformed(at, instr.opcode))? as usize;
        if count <= self.end - self.position {
            self.position += count;
            self.pc = at + 1;
            Ok(())
        } else {
            self.fallback(at, instr)
        }
    }

    fn exec_charset(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let set = instr
            .set()
            .ok_or_else(|| Self::malformed(at, instr.opcode))?;
        // End of input is never a member.
        if self.current().is_some_and(|unit| set.contains_unit(unit)) {
            self.position += 1;
            self.pc = at + 1;
            Ok(())
        } else {
            self.fallback(at, instr)
        }
    }

    fn exec_span(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let set = instr
            .set()
            .ok_or_else(|| Self::malformed(at, instr.opcode))?;
        while self.current().is_some_and(|unit| set.contains_unit(unit)) {
            self.position += 1;
        }
        self.pc = at + 1;
        Ok(())
    }

    // ---- Choice points and calls ----

    fn exec_choice(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let lookback = instr
            .count()
            .ok_or_else(|| Self::malformed(at, instr.opcode))?;
        let saved = self
            .position
            .checked_sub(lookback as usize)
            .filter(|&saved| saved >= self.start)
            .ok_or(MatchError::LookbackUnderflow {
                at,
                lookback,
                position: self.position,
                start: self.start,
            })?;
        let alternative = self.target(at, instr)?;
        let capture = self.capture();
        self.stack
            .push_backtrack(alternative, saved, capture)
            .map_err(Self::overflow(at))?;
        self.pc = at + 1;
        Ok(())
    }

    fn exec_call(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let callee = self.target(at, instr)?;
        self.stack
            .push_return(at + 1)
            .map_err(Self::overflow(at))?;
        self.pc = callee;
        Ok(())
    }

    fn exec_return(&mut self, at: usize) -> Result<(), MatchError> {
        match self.stack.pop() {
            Some(StackEntry::Return { resume }) => {
                self.pc = resume;
                Ok(())
            }
            Some(entry) => Err(mismatch(at, Opcode::Return, FrameKind::Return, entry)),
            None => Err(MatchError::StackUnderflow {
                at,
                opcode: Opcode::Return,
            }),
        }
    }

    fn exec_commit(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let target = self.target(at, instr)?;
        match self.stack.pop() {
            Some(StackEntry::Backtrack { .. }) => {
                self.pc = target;
                Ok(())
            }
            Some(entry) => Err(mismatch(at, Opcode::Commit, FrameKind::Backtrack, entry)),
            None => Err(MatchError::StackUnderflow {
                at,
                opcode: Opcode::Commit,
            }),
        }
    }

    /// Refresh the top choice point in place for the next loop iteration.
    fn exec_partial_commit(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let target = self.target(at, instr)?;
        let current_position = self.position;
        let current_capture = self.capture();
        match self.stack.top_mut() {
            Some(StackEntry::Backtrack {
                position, capture, ..
            }) => {
                *position = current_position;
                *capture = current_capture;
                self.pc = target;
                Ok(())
            }
            Some(entry) => Err(mismatch(
                at,
                Opcode::PartialCommit,
                FrameKind::Backtrack,
                *entry,
            )),
            None => Err(MatchError::StackUnderflow {
                at,
                opcode: Opcode::PartialCommit,
            }),
        }
    }

    /// Pop the lookahead's choice point, restoring its state, and jump.
    fn exec_back_commit(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let target = self.target(at, instr)?;
        match self.stack.pop() {
            Some(StackEntry::Backtrack {
                position, capture, ..
            }) => {
                self.position = position;
                self.restore_capture(capture);
                self.pc = target;
                Ok(())
            }
            Some(entry) => Err(mismatch(
                at,
                Opcode::BackCommit,
                FrameKind::Backtrack,
                entry,
            )),
            None => Err(MatchError::StackUnderflow {
                at,
                opcode: Opcode::BackCommit,
            }),
        }
    }

    /// Discard the top frame without restoring anything, then fail.
    fn exec_fail_twice(&mut self, at: usize) -> Result<(), MatchError> {
        self.stack.pop().ok_or(MatchError::StackUnderflow {
            at,
            opcode: Opcode::FailTwice,
        })?;
        self.pc = FAIL;
        Ok(())
    }

    // ---- Captures ----

    fn exec_capture(&mut self, at: usize, instr: &Instruction) -> Result<(), MatchError> {
        let kind = instr
            .capture_kind()
            .ok_or_else(|| Self::malformed(at, instr.opcode))?;
        self.captures.push(CaptureEvent {
            kind,
            position: self.position,
            at,
        });
        self.pc = at + 1;
        Ok(())
    }
}

fn mismatch(at: usize, opcode: Opcode, expected: FrameKind, found: StackEntry) -> MatchError {
    MatchError::FrameMismatch {
        at,
        opcode,
        expected,
        found: found.kind(),
    }
}
