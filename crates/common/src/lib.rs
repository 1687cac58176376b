//! PEG virtual machine common types and instruction encoding.
//!
//! This crate provides the data format consumed by the matching engine:
//!
//! - [`Opcode`]: the 15 executable opcodes plus the pre-link `OpenCall`
//! - [`Charset`]: a 256-bit byte-class membership set
//! - [`Instruction`]: opcode, relative offset and [`Payload`], with encode/decode
//! - [`Program`]: an ordered sequence of instructions
//! - [`DecodeError`] / [`EncodeError`]: binary format errors
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod charset;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use charset::Charset;
pub use error::{DecodeError, EncodeError};
pub use instruction::{CaptureKind, Instruction, Payload};
pub use opcode::Opcode;
pub use program::Program;
