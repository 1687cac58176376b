//! Verification errors for PEG programs.
//!
//! Every per-instruction error includes an instruction index (`at`).
//! The verifier collects ALL errors, not just the first.

use pegvm_common::Opcode;
use thiserror::Error;

/// Errors found during static verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Structural ---
    /// Program has no instructions.
    #[error("program is empty")]
    EmptyProgram,

    /// No END instruction anywhere, so no match can ever succeed.
    #[error("program contains no END")]
    MissingEnd,

    /// The last instruction can continue past the end of the program.
    #[error("{opcode} at instruction {at} falls through past the end of the program")]
    FallsThrough { at: usize, opcode: Opcode },

    /// An OPEN_CALL was never resolved to a CALL.
    #[error("unlinked call to rule {rule} at instruction {at}")]
    UnlinkedCall { at: usize, rule: u32 },

    /// Payload does not have the shape the opcode requires.
    #[error("payload does not match {opcode} at instruction {at}")]
    PayloadMismatch { at: usize, opcode: Opcode },

    /// An offset lands outside the program.
    #[error("{opcode} at instruction {at} targets {target}, outside the program")]
    TargetOutOfBounds { at: usize, opcode: Opcode, target: i64 },

    /// Offset field is nonzero on an opcode that ignores it.
    #[error("non-zero unused offset at instruction {at}")]
    NonZeroUnusedField { at: usize },

    // --- Limits ---
    /// Program exceeds the addressable instruction count.
    #[error("program too large: {size} instructions")]
    ProgramTooLarge { size: usize },

    /// Offset does not fit the 24-bit field.
    #[error("offset {offset} at instruction {at} does not fit in 24 bits")]
    OffsetOutOfRange { at: usize, offset: i32 },
}
