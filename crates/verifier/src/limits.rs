//! Limits checking for PEG programs.
//!
//! Enforces the hard limits imposed by the 24-bit offset field.

use crate::error::VerifyError;
use pegvm_common::instruction::{MAX_OFFSET, MIN_OFFSET};
use pegvm_common::Instruction;

/// Maximum program size in instructions: the farthest a 24-bit signed
/// offset can reach.
pub const MAX_PROGRAM_SIZE: usize = 1 << 23;

/// Run the limits check.
pub fn check_limits(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    if instrs.len() > MAX_PROGRAM_SIZE {
        errors.push(VerifyError::ProgramTooLarge { size: instrs.len() });
    }

    for (i, instr) in instrs.iter().enumerate() {
        if !(MIN_OFFSET..=MAX_OFFSET).contains(&instr.offset) {
            errors.push(VerifyError::OffsetOutOfRange {
                at: i,
                offset: instr.offset,
            });
        }
    }

    errors
}
