//! PEG assembler: bidirectional text ↔ program translation.
//!
//! The assembler is a mechanical 1:1 translation. No labels, no rule
//! linking, no sugar: offsets are written as the relative distances the
//! machine uses.
//!
//! # Usage
//!
//! ```
//! use pegvm_assembler::{assemble, disassemble};
//!
//! let text = "CHOICE 3 0\nCHAR 0 'a'\nPARTIAL_COMMIT -1\nEND\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for every program
//! whose payloads match their opcodes and whose unused offsets are zero,
//! which includes every program the verifier accepts. Opcodes that ignore
//! their offset are printed without it. The disassembler outputs canonical
//! text; the assembler also accepts hex numbers, `+` signs, lowercase
//! mnemonics and character literals where canonical text uses hex.

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use lexer::tokenize_line;
use parser::parse_line;
use pegvm_common::Program;

/// Assemble text into a program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        if let Some(instr) = parse_line(&tokens, line_num)? {
            instructions.push(instr);
        }
    }

    Ok(Program::new(instructions))
}

/// Disassemble a program into canonical assembly text.
///
/// The output is flat text: one instruction per line, no indentation,
/// no comments.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegvm_common::{CaptureKind, Charset, Instruction, Opcode};

    #[test]
    fn assemble_minimal() {
        let program = assemble("CHAR 0 'a'\nEND\n").unwrap();
        assert_eq!(program.instructions.len(), 2);
        assert_eq!(program.instructions[0], Instruction::char('a' as u32, 0));
        assert_eq!(program.instructions[1].opcode, Opcode::End);
    }

    #[test]
    fn disassemble_minimal() {
        let program = Program::new(vec![Instruction::any(2, 0), Instruction::end()]);
        assert_eq!(disassemble(&program), "ANY 0 2\nEND\n");
    }

    #[test]
    fn roundtrip_disassemble_then_assemble() {
        let digits: Charset = (b'0'..=b'9').collect();
        let original = Program::new(vec![
            Instruction::capture(CaptureKind::Open),
            Instruction::charset(digits, 0),
            Instruction::span(digits),
            Instruction::capture(CaptureKind::Close),
            Instruction::choice_with_lookback(3, 2),
            Instruction::char(0x2603, 0),
            Instruction::back_commit(2),
            Instruction::fail(),
            Instruction::end(),
        ]);
        let text = disassemble(&original);
        let reassembled = assemble(&text).unwrap();
        assert_eq!(original, reassembled);
    }

    #[test]
    fn roundtrip_assemble_then_disassemble_then_assemble() {
        let text = "choice +0x3 0\nchar 0 97\npartial_commit -1\nend\n";
        let first = assemble(text).unwrap();
        let canonical = disassemble(&first);
        assert_eq!(canonical, "CHOICE 3 0\nCHAR 0 'a'\nPARTIAL_COMMIT -1\nEND\n");
        let second = assemble(&canonical).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn assemble_with_comments_and_blanks() {
        let text = "\
; 'a' / 'b'
CHOICE 3 0    ; alternative at +3
  CHAR 0 'a'
  COMMIT 2

  CHAR 0 'b'
END
";
        let program = assemble(text).unwrap();
        assert_eq!(program.instructions.len(), 5);
    }

    #[test]
    fn assemble_decimal_hex_and_literal_produce_same_result() {
        let lit = assemble("CHAR 0 'a'\n").unwrap();
        let hex = assemble("CHAR 0 0x61\n").unwrap();
        let dec = assemble("CHAR 0 97\n").unwrap();
        assert_eq!(lit, hex);
        assert_eq!(lit, dec);
    }

    #[test]
    fn error_unknown_opcode() {
        let err = assemble("FOOBAR\n").unwrap_err();
        assert!(matches!(err, AsmError::UnknownOpcode { line: 1, .. }));
    }

    #[test]
    fn error_missing_argument() {
        let err = assemble("JUMP\n").unwrap_err();
        assert!(matches!(err, AsmError::MissingArgument { line: 1, .. }));
    }

    #[test]
    fn error_invalid_number() {
        let err = assemble("JUMP 0xZZZZ\n").unwrap_err();
        assert!(matches!(err, AsmError::InvalidNumber { line: 1, .. }));
    }

    #[test]
    fn error_reports_correct_line() {
        let text = "END\nFOOBAR\n";
        let err = assemble(text).unwrap_err();
        assert!(matches!(err, AsmError::UnknownOpcode { line: 2, .. }));
    }

    #[test]
    fn every_opcode_roundtrips() {
        let lines = [
            "END",
            "CHAR 0 'z'",
            "JUMP 1",
            "CHOICE 2 0",
            "CALL 3",
            "RETURN",
            "COMMIT 4",
            "CAPTURE OPEN",
            "FAIL",
            "ANY 0 1",
            "CHARSET 5 [00-ff]",
            "PARTIAL_COMMIT -6",
            "SPAN [20,09-0a]",
            "FAIL_TWICE",
            "BACK_COMMIT 7",
            "OPEN_CALL 8",
        ];
        for line in &lines {
            let text = format!("{line}\n");
            let program = assemble(&text).unwrap();
            let disasm = disassemble(&program);
            // Sets are printed in ascending order.
            let expected = text.replace("[20,09-0a]", "[09-0a,20]");
            assert_eq!(disasm, expected, "roundtrip failed for {line}");
        }
    }
}
