//! PEG verifier: static checks for linked programs.
//!
//! The verifier checks a `Program` BEFORE it is handed to the matcher.
//! It collects ALL errors (not just the first) and returns them. The
//! matcher itself never calls the verifier; a program that passes cannot
//! trip the matcher's jump, payload, or linking errors.
//!
//! # Usage
//!
//! ```
//! use pegvm_common::{Instruction, Program};
//! use pegvm_verifier::verify;
//!
//! let program = Program::new(vec![
//!     Instruction::char(b'a' as u32, 0),
//!     Instruction::end(),
//! ]);
//!
//! assert!(verify(&program).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Limits**: program size, 24-bit offsets
//! 2. **Structural**: END present, no fall-through, linking, payload
//!    shapes, offset targets

pub mod error;
pub mod limits;
pub mod structural;

pub use error::VerifyError;

use pegvm_common::Program;

/// Verify a program for correctness.
///
/// Returns `Ok(())` if the program passes all checks, or
/// `Err(Vec<VerifyError>)` with all errors found.
pub fn verify(program: &Program) -> Result<(), Vec<VerifyError>> {
    let instrs = &program.instructions;
    let mut all_errors = Vec::new();

    // Pass 1: Limits
    all_errors.extend(limits::check_limits(instrs));

    // Pass 2: Structural
    all_errors.extend(structural::check_structural(instrs));

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}
