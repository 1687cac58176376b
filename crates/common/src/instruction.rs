//! Instruction encoding and decoding for the PEG instruction set.
//!
//! Every encoded instruction starts with a 4-byte header followed by a
//! fixed-length, opcode-specific payload:
//! ```text
//! Byte 0:     opcode (u8)
//! Bytes 1-3:  offset (24-bit two's complement, little-endian)
//! Bytes 4..:  payload, 0, 4 or 32 bytes depending on the opcode
//! ```
//! 4-byte payloads are little-endian `u32`s; charset payloads are the raw
//! 32-byte bitset.

use crate::charset::{Charset, CHARSET_BYTES};
use crate::error::{DecodeError, EncodeError};
use crate::opcode::Opcode;

/// Size of the opcode + offset header.
pub const HEADER_BYTES: usize = 4;

/// Largest offset the 24-bit field can hold.
pub const MAX_OFFSET: i32 = (1 << 23) - 1;

/// Smallest offset the 24-bit field can hold.
pub const MIN_OFFSET: i32 = -(1 << 23);

/// Which side of a capture a CAPTURE instruction marks.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Start a capture at the current position.
    Open = 0,
    /// Close the innermost open capture at the current position.
    Close = 1,
}

impl CaptureKind {
    /// Assembly keyword for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureKind::Open => "OPEN",
            CaptureKind::Close => "CLOSE",
        }
    }
}

impl TryFrom<u32> for CaptureKind {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CaptureKind::Open),
            1 => Ok(CaptureKind::Close),
            other => Err(other),
        }
    }
}

/// Opcode-dependent instruction data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    None,
    /// A code unit to match exactly (CHAR).
    Unit(u32),
    /// A repeat count (ANY) or look-back count (CHOICE).
    Count(u32),
    /// A byte-class membership set (CHARSET, SPAN).
    Set(Charset),
    /// A capture boundary (CAPTURE).
    Capture(CaptureKind),
    /// An unresolved rule index (OPEN_CALL). Never present once linked.
    Rule(u32),
}

/// A single PEG machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Relative to this instruction's own index. Meaning depends on opcode.
    pub offset: i32,
    /// Opcode-specific data.
    pub payload: Payload,
}

impl Instruction {
    /// Create an instruction from raw parts. No shape checking is done;
    /// see [`Instruction::payload_fits`].
    pub fn new(opcode: Opcode, offset: i32, payload: Payload) -> Self {
        Self {
            opcode,
            offset,
            payload,
        }
    }

    pub fn end() -> Self {
        Self::new(Opcode::End, 0, Payload::None)
    }

    /// Match `unit`; on mismatch go to `pc + fallback`, or fail if it is 0.
    pub fn char(unit: u32, fallback: i32) -> Self {
        Self::new(Opcode::Char, fallback, Payload::Unit(unit))
    }

    pub fn jump(offset: i32) -> Self {
        Self::new(Opcode::Jump, offset, Payload::None)
    }

    pub fn choice(offset: i32) -> Self {
        Self::choice_with_lookback(offset, 0)
    }

    /// A choice point whose saved position is `lookback` units behind the
    /// current one.
    pub fn choice_with_lookback(offset: i32, lookback: u32) -> Self {
        Self::new(Opcode::Choice, offset, Payload::Count(lookback))
    }

    pub fn call(offset: i32) -> Self {
        Self::new(Opcode::Call, offset, Payload::None)
    }

    pub fn ret() -> Self {
        Self::new(Opcode::Return, 0, Payload::None)
    }

    pub fn commit(offset: i32) -> Self {
        Self::new(Opcode::Commit, offset, Payload::None)
    }

    pub fn capture(kind: CaptureKind) -> Self {
        Self::new(Opcode::Capture, 0, Payload::Capture(kind))
    }

    pub fn fail() -> Self {
        Self::new(Opcode::Fail, 0, Payload::None)
    }

    /// Consume `count` units of any value, with the same fallback rule as CHAR.
    pub fn any(count: u32, fallback: i32) -> Self {
        Self::new(Opcode::Any, fallback, Payload::Count(count))
    }

    pub fn charset(set: Charset, fallback: i32) -> Self {
        Self::new(Opcode::Charset, fallback, Payload::Set(set))
    }

    pub fn partial_commit(offset: i32) -> Self {
        Self::new(Opcode::PartialCommit, offset, Payload::None)
    }

    pub fn span(set: Charset) -> Self {
        Self::new(Opcode::Span, 0, Payload::Set(set))
    }

    pub fn fail_twice() -> Self {
        Self::new(Opcode::FailTwice, 0, Payload::None)
    }

    pub fn back_commit(offset: i32) -> Self {
        Self::new(Opcode::BackCommit, offset, Payload::None)
    }

    pub fn open_call(rule: u32) -> Self {
        Self::new(Opcode::OpenCall, 0, Payload::Rule(rule))
    }

    /// Whether the payload has the shape this opcode requires.
    pub fn payload_fits(&self) -> bool {
        matches!(
            (self.opcode, &self.payload),
            (Opcode::Char, Payload::Unit(_))
                | (Opcode::Choice | Opcode::Any, Payload::Count(_))
                | (Opcode::Charset | Opcode::Span, Payload::Set(_))
                | (Opcode::Capture, Payload::Capture(_))
                | (Opcode::OpenCall, Payload::Rule(_))
                | (
                    Opcode::End
                        | Opcode::Jump
                        | Opcode::Call
                        | Opcode::Return
                        | Opcode::Commit
                        | Opcode::Fail
                        | Opcode::PartialCommit
                        | Opcode::FailTwice
                        | Opcode::BackCommit,
                    Payload::None
                )
        )
    }

    /// Absolute target of `offset` from instruction index `pc`, if it is
    /// not negative.
    pub fn target(&self, pc: usize) -> Option<usize> {
        pc.checked_add_signed(self.offset as isize)
    }

    /// Number of bytes this instruction occupies when encoded.
    pub fn encoded_len(&self) -> usize {
        HEADER_BYTES + self.opcode.payload_len()
    }

    /// Encode this instruction on its own.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        self.encode_into(0, &mut bytes)?;
        Ok(bytes)
    }

    /// Append the encoding to `out`. `at` is the instruction index used in
    /// error reports.
    pub(crate) fn encode_into(&self, at: usize, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        if !(MIN_OFFSET..=MAX_OFFSET).contains(&self.offset) {
            return Err(EncodeError::OffsetOutOfRange {
                at,
                offset: self.offset,
            });
        }
        if !self.payload_fits() {
            return Err(EncodeError::PayloadMismatch {
                at,
                opcode: self.opcode.mnemonic(),
            });
        }

        let offset = (self.offset as u32 & 0x00FF_FFFF).to_le_bytes();
        out.push(self.opcode as u8);
        out.extend_from_slice(&offset[..3]);

        match self.payload {
            Payload::None => {}
            Payload::Unit(v) | Payload::Count(v) | Payload::Rule(v) => {
                out.extend_from_slice(&v.to_le_bytes())
            }
            Payload::Capture(kind) => out.extend_from_slice(&(kind as u32).to_le_bytes()),
            Payload::Set(set) => out.extend_from_slice(set.as_bytes()),
        }
        Ok(())
    }

    /// Decode one instruction from the front of `bytes`.
    ///
    /// Returns the instruction and the number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        Self::decode_at(bytes, 0)
    }

    /// Decode the instruction starting at byte `at` of `stream`.
    pub(crate) fn decode_at(stream: &[u8], at: usize) -> Result<(Self, usize), DecodeError> {
        let bytes = &stream[at..];
        if bytes.len() < HEADER_BYTES {
            return Err(DecodeError::Truncated {
                at,
                needed: HEADER_BYTES,
                available: bytes.len(),
            });
        }

        let opcode = Opcode::try_from(bytes[0])?;
        let len = HEADER_BYTES + opcode.payload_len();
        if bytes.len() < len {
            return Err(DecodeError::Truncated {
                at,
                needed: len,
                available: bytes.len(),
            });
        }

        // Sign-extend the 24-bit field.
        let raw = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], 0]);
        let offset = ((raw << 8) as i32) >> 8;

        let data = &bytes[HEADER_BYTES..len];
        let word = || u32::from_le_bytes([data[0], data[1], data[2], data[3]]);

        let payload = match opcode {
            Opcode::Char => Payload::Unit(word()),
            Opcode::Choice | Opcode::Any => Payload::Count(word()),
            Opcode::OpenCall => Payload::Rule(word()),
            Opcode::Capture => {
                let kind = CaptureKind::try_from(word())
                    .map_err(|kind| DecodeError::InvalidCaptureKind { at, kind })?;
                Payload::Capture(kind)
            }
            Opcode::Charset | Opcode::Span => {
                let mut bits = [0u8; CHARSET_BYTES];
                bits.copy_from_slice(data);
                Payload::Set(Charset::from_bytes(bits))
            }
            _ => Payload::None,
        };

        Ok((Self::new(opcode, offset, payload), len))
    }

    /// The code unit of a CHAR instruction.
    pub fn unit(&self) -> Option<u32> {
        match self.payload {
            Payload::Unit(u) => Some(u),
            _ => None,
        }
    }

    /// The count of an ANY or CHOICE instruction.
    pub fn count(&self) -> Option<u32> {
        match self.payload {
            Payload::Count(n) => Some(n),
            _ => None,
        }
    }

    /// The set of a CHARSET or SPAN instruction.
    pub fn set(&self) -> Option<&Charset> {
        match &self.payload {
            Payload::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn capture_kind(&self) -> Option<CaptureKind> {
        match self.payload {
            Payload::Capture(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn rule(&self) -> Option<u32> {
        match self.payload {
            Payload::Rule(r) => Some(r),
            _ => None,
        }
    }
}
