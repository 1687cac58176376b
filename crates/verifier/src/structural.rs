//! Structural validation pass for PEG programs.
//!
//! Checks payload shapes, offset targets, linking, and that control can
//! neither run off the end of the program nor miss END entirely.

use crate::error::VerifyError;
use pegvm_common::{Instruction, Opcode, Payload};

/// Run the structural validation pass.
pub fn check_structural(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    let Some(last) = instrs.last() else {
        errors.push(VerifyError::EmptyProgram);
        return errors;
    };

    if !instrs.iter().any(|i| i.opcode == Opcode::End) {
        errors.push(VerifyError::MissingEnd);
    }

    // OPEN_CALL is reported as unlinked instead.
    if !last.opcode.is_terminator() && last.opcode != Opcode::OpenCall {
        errors.push(VerifyError::FallsThrough {
            at: instrs.len() - 1,
            opcode: last.opcode,
        });
    }

    for (at, instr) in instrs.iter().enumerate() {
        if let (Opcode::OpenCall, Payload::Rule(rule)) = (instr.opcode, instr.payload) {
            errors.push(VerifyError::UnlinkedCall { at, rule });
        }

        if !instr.payload_fits() {
            errors.push(VerifyError::PayloadMismatch {
                at,
                opcode: instr.opcode,
            });
        }

        check_offset(instrs.len(), at, instr, &mut errors);
    }

    errors
}

fn check_offset(len: usize, at: usize, instr: &Instruction, errors: &mut Vec<VerifyError>) {
    let opcode = instr.opcode;

    if !opcode.uses_offset() {
        if instr.offset != 0 {
            errors.push(VerifyError::NonZeroUnusedField { at });
        }
        return;
    }

    // A zero fallback means "fail", not "retry this instruction".
    if opcode.is_fallback() && instr.offset == 0 {
        return;
    }

    let target = at as i64 + instr.offset as i64;
    if target < 0 || target >= len as i64 {
        errors.push(VerifyError::TargetOutOfBounds { at, opcode, target });
    }
}
