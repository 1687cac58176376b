//! CLI command implementations.

use pegvm_common::Program;
use pegvm_vm::{ExecutionStack, MatchConfig, MatchError, Matcher};
use std::fs;
use tracing::debug;

/// Assemble a .peg text file to .pegb binary.
pub fn assemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: assemble requires an input file");
        eprintln!("Usage: pegvm assemble <input.peg> [-o output.pegb]");
        return Err(1);
    }

    let input = &args[0];

    let output = if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if input.ends_with(".peg") {
        format!("{input}b")
    } else {
        format!("{input}.pegb")
    };

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let program = pegvm_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let bytes = program.encode().map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    let instr_count = program.len();

    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!(
        "assembled {instr_count} instructions ({} bytes) -> {output}",
        bytes.len()
    );
    Ok(())
}

/// Verify a .pegb binary program.
pub fn verify(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: verify requires an input file");
        eprintln!("Usage: pegvm verify <input.pegb>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_binary(input)?;
    verify_program(&program)?;
    println!("OK: {input} ({} instructions)", program.len());
    Ok(())
}

/// Disassemble a .pegb binary to text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: pegvm disassemble <input.pegb>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_binary(input)?;
    print!("{}", pegvm_assembler::disassemble(&program));
    Ok(())
}

/// Verify a .pegb program, then match it against text anchored at a
/// start position.
///
/// The text is matched as a sequence of Unicode scalar values, so
/// positions count characters, not bytes.
pub fn match_input(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: match requires an input file");
        eprintln!("Usage: pegvm match <input.pegb> (--input TEXT | --file PATH) [--start N] [--end N] [--max-stack N]");
        return Err(1);
    }

    let input = &args[0];
    let options = parse_match_options(&args[1..])?;

    let program = read_binary(input)?;
    verify_program(&program)?;

    let text = match options.subject {
        Subject::Text(text) => text,
        Subject::File(path) => fs::read_to_string(&path).map_err(|e| {
            eprintln!("error: cannot read '{path}': {e}");
            1
        })?,
    };
    let units: Vec<char> = text.chars().collect();
    let end = options.end.unwrap_or(units.len());

    let mut config = MatchConfig::default();
    if let Some(depth) = options.max_stack {
        config = config.with_max_stack_depth(depth);
    }

    debug!(
        program = input.as_str(),
        units = units.len(),
        start = options.start,
        end,
        "matching"
    );

    let mut stack = ExecutionStack::new();
    match Matcher::with_config(&program, config).run(&mut stack, &units, options.start, end) {
        Ok(Some(m)) => {
            println!("match {}..{}", m.start, m.end);
            for span in &m.captures {
                println!("capture {}..{} depth {}", span.start, span.end, span.depth);
            }
            Ok(())
        }
        Ok(None) => {
            eprintln!("no match");
            Err(4)
        }
        Err(e @ MatchError::InvalidRange { .. }) => {
            eprintln!("error: {e}");
            Err(1)
        }
        Err(e) => {
            eprintln!("match error: {e}");
            Err(3)
        }
    }
}

/// Where the text to match comes from.
#[derive(Debug, PartialEq, Eq)]
enum Subject {
    Text(String),
    File(String),
}

#[derive(Debug, PartialEq, Eq)]
struct MatchOptions {
    subject: Subject,
    start: usize,
    end: Option<usize>,
    max_stack: Option<usize>,
}

fn parse_match_options(args: &[String]) -> Result<MatchOptions, i32> {
    let mut subject = None;
    let mut start = 0;
    let mut end = None;
    let mut max_stack = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let Some(value) = args.get(i + 1) else {
            eprintln!("error: {flag} requires a value");
            return Err(1);
        };
        match flag {
            "--input" | "--file" => {
                if subject.is_some() {
                    eprintln!("error: only one of --input and --file may be given");
                    return Err(1);
                }
                subject = Some(if flag == "--input" {
                    Subject::Text(value.clone())
                } else {
                    Subject::File(value.clone())
                });
            }
            "--start" => start = parse_count(flag, value)?,
            "--end" => end = Some(parse_count(flag, value)?),
            "--max-stack" => max_stack = Some(parse_count(flag, value)?),
            other => {
                eprintln!("error: unknown option '{other}'");
                return Err(1);
            }
        }
        i += 2;
    }

    let Some(subject) = subject else {
        eprintln!("error: one of --input or --file is required");
        return Err(1);
    };

    Ok(MatchOptions {
        subject,
        start,
        end,
        max_stack,
    })
}

fn parse_count(flag: &str, value: &str) -> Result<usize, i32> {
    value.parse().map_err(|_| {
        eprintln!("error: {flag} expects a non-negative integer, got '{value}'");
        1
    })
}

/// Run the verifier, printing every error.
fn verify_program(program: &Program) -> Result<(), i32> {
    pegvm_verifier::verify(program).map_err(|errors| {
        for e in &errors {
            eprintln!("error: {e}");
        }
        2
    })
}

/// Read and decode a binary program file.
fn read_binary(path: &str) -> Result<Program, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    Program::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary: {e}");
        1
    })
}
