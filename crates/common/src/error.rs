//! Encode and decode errors for PEG program streams.

use thiserror::Error;

/// Errors that occur while decoding a byte stream into instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opcode byte does not name any instruction.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// The stream ended inside an instruction.
    #[error("truncated instruction at byte {at}: needed {needed} bytes, {available} available")]
    Truncated {
        at: usize,
        needed: usize,
        available: usize,
    },

    /// CAPTURE payload is not a known capture kind.
    #[error("invalid capture kind {kind} at byte {at}")]
    InvalidCaptureKind { at: usize, kind: u32 },
}

/// Errors that occur while encoding instructions into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Offset does not fit the 24-bit signed offset field.
    #[error("offset {offset} at instruction {at} does not fit in 24 bits")]
    OffsetOutOfRange { at: usize, offset: i32 },

    /// Payload does not have the shape the opcode requires.
    #[error("payload does not match opcode {opcode} at instruction {at}")]
    PayloadMismatch { at: usize, opcode: &'static str },
}
