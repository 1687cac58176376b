//! Disassembler: program → canonical assembly text.
//!
//! Output format is flat text, one instruction per line. No indentation,
//! no comments, no blank lines.

use pegvm_common::{CaptureKind, Charset, Instruction, Opcode, Program};

/// Disassemble a program into canonical assembly text.
///
/// For programs whose payloads match their opcodes and whose unused offsets
/// are zero, the output reassembles to an identical program
/// (`assemble(disassemble(program)) == program`). Every verified program
/// qualifies. An offset on an opcode that ignores it is not printed.
pub fn disassemble(program: &Program) -> String {
    let mut result = program
        .instructions
        .iter()
        .map(format_instruction)
        .collect::<Vec<_>>()
        .join("\n");
    if !result.is_empty() {
        result.push('\n');
    }
    result
}

/// One canonical line, without the newline.
///
/// A payload of the wrong shape prints as its zero value.
pub(crate) fn format_instruction(instr: &Instruction) -> String {
    let mnemonic = instr.opcode.mnemonic();
    match instr.opcode {
        Opcode::End | Opcode::Return | Opcode::Fail | Opcode::FailTwice => mnemonic.to_string(),

        Opcode::Jump
        | Opcode::Call
        | Opcode::Commit
        | Opcode::PartialCommit
        | Opcode::BackCommit => format!("{mnemonic} {}", instr.offset),

        Opcode::Choice | Opcode::Any => format!(
            "{mnemonic} {} {}",
            instr.offset,
            instr.count().unwrap_or_default()
        ),

        Opcode::Char => format!(
            "{mnemonic} {} {}",
            instr.offset,
            format_unit(instr.unit().unwrap_or_default())
        ),

        Opcode::Charset => format!(
            "{mnemonic} {} {}",
            instr.offset,
            format_set(&instr.set().copied().unwrap_or_default())
        ),

        Opcode::Span => format!(
            "{mnemonic} {}",
            format_set(&instr.set().copied().unwrap_or_default())
        ),

        Opcode::Capture => format!(
            "{mnemonic} {}",
            instr.capture_kind().unwrap_or(CaptureKind::Open).name()
        ),

        Opcode::OpenCall => format!("{mnemonic} {}", instr.rule().unwrap_or_default()),
    }
}

/// Printable ASCII as a character literal, anything else as hex.
fn format_unit(unit: u32) -> String {
    match u8::try_from(unit) {
        Ok(b) if b.is_ascii_graphic() && b != b'\'' && b != b';' => format!("'{}'", b as char),
        _ => format!("{unit:#x}"),
    }
}

/// `[61-7a,5f]`: maximal ranges in ascending order, two hex digits each.
pub(crate) fn format_set(set: &Charset) -> String {
    let items: Vec<String> = set
        .ranges()
        .into_iter()
        .map(|(lo, hi)| {
            if lo == hi {
                format!("{lo:02x}")
            } else {
                format!("{lo:02x}-{hi:02x}")
            }
        })
        .collect();
    format!("[{}]", items.join(","))
}
