//! Program representation for PEG instruction streams.
//!
//! A program is an ordered, 0-indexed sequence of instructions. Binary files
//! (.pegb) are raw concatenations of encoded instructions with no header.

use crate::error::{DecodeError, EncodeError};
use crate::instruction::Instruction;

/// A linked PEG program: a sequence of instructions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Encode the entire program to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let size = self.instructions.iter().map(Instruction::encoded_len).sum();
        let mut bytes = Vec::with_capacity(size);
        for (at, instr) in self.instructions.iter().enumerate() {
            instr.encode_into(at, &mut bytes)?;
        }
        Ok(bytes)
    }

    /// Decode a byte slice into a program.
    ///
    /// Instructions are variable length, so the stream is consumed one
    /// instruction at a time until it is exhausted.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut instructions = Vec::new();
        let mut at = 0;

        while at < bytes.len() {
            let (instr, used) = Instruction::decode_at(bytes, at)?;
            instructions.push(instr);
            at += used;
        }

        Ok(Self { instructions })
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Fetch the instruction at `pc`.
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;
    use crate::instruction::CaptureKind;

    #[test]
    fn empty_program() {
        let program = Program::new(vec![]);
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.encode().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encode_decode_mixed_lengths() {
        let digits: Charset = (b'0'..=b'9').collect();
        let program = Program::new(vec![
            Instruction::choice(4),
            Instruction::capture(CaptureKind::Open),
            Instruction::span(digits),
            Instruction::capture(CaptureKind::Close),
            Instruction::commit(2),
            Instruction::char(b'x' as u32, 0),
            Instruction::end(),
        ]);

        let bytes = program.encode().unwrap();
        // 8 + 8 + 36 + 8 + 4 + 8 + 4
        assert_eq!(bytes.len(), 76);
        assert_eq!(Program::decode(&bytes).unwrap(), program);
    }

    #[test]
    fn encode_reports_instruction_index() {
        let program = Program::new(vec![
            Instruction::end(),
            Instruction::jump(1 << 23),
        ]);
        assert_eq!(
            program.encode(),
            Err(EncodeError::OffsetOutOfRange {
                at: 1,
                offset: 1 << 23
            })
        );
    }

    #[test]
    fn decode_reports_byte_position() {
        // END, then a CHAR cut off after its header.
        let bytes = vec![0, 0, 0, 0, 1, 0, 0, 0, b'a'];
        assert_eq!(
            Program::decode(&bytes),
            Err(DecodeError::Truncated {
                at: 4,
                needed: 8,
                available: 5
            })
        );
    }

    #[test]
    fn decode_propagates_instruction_errors() {
        let bytes = vec![0, 0, 0, 0, 0xEE, 0, 0, 0];
        assert_eq!(Program::decode(&bytes), Err(DecodeError::UnknownOpcode(0xEE)));
    }

    #[test]
    fn decode_empty_bytes() {
        let program = Program::decode(&[]).unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn get_is_bounds_checked() {
        let program: Program = vec![Instruction::end()].into();
        assert_eq!(program.get(0), Some(&Instruction::end()));
        assert_eq!(program.get(1), None);
    }
}
