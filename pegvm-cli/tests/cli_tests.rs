//! Integration tests for the PEG VM CLI.
//!
//! These tests invoke the `pegvm` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn pegvm() -> Command {
    Command::cargo_bin("pegvm").unwrap()
}

/// 'ab' / 'a'
const AB_OR_A: &str = "\
CHOICE 4 0
CHAR 0 'a'
CHAR 0 'b'
COMMIT 2
CHAR 0 'a'
END
";

/// {[0-9]+} captured, then any tail
const NUMBER: &str = "\
CAPTURE OPEN
CHARSET 0 [30-39]
SPAN [30-39]
CAPTURE CLOSE
END
";

/// A rule that calls itself forever.
const RUNAWAY: &str = "\
CALL 0
END
";

/// Helper: assemble text, returning the path to the .pegb output.
fn assemble_to_temp(dir: &TempDir, text: &str) -> PathBuf {
    let input = dir.path().join("test.peg");
    let output = dir.path().join("test.pegb");
    fs::write(&input, text).unwrap();
    pegvm()
        .args([
            "assemble",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    output
}

// ---- No-args / help ----

#[test]
fn no_args_prints_usage_and_exits_1() {
    pegvm()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: pegvm"));
}

#[test]
fn help_flag_exits_0() {
    pegvm()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn unknown_command_exits_1() {
    pegvm()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown command"));
}

// ---- Assemble ----

#[test]
fn assemble_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("grammar.peg");
    fs::write(&input, AB_OR_A).unwrap();

    pegvm()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("assembled 6 instructions"));

    assert!(dir.path().join("grammar.pegb").exists());
}

#[test]
fn assemble_reports_line_of_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.peg");
    fs::write(&input, "END\nBOGUS 1\n").unwrap();

    pegvm()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2: unknown opcode 'BOGUS'"));
}

#[test]
fn assemble_missing_file_exits_1() {
    pegvm()
        .args(["assemble", "/nonexistent/grammar.peg"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

// ---- Verify ----

#[test]
fn verify_valid_program() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .args(["verify", binary.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK:"))
        .stdout(predicate::str::contains("6 instructions"));
}

#[test]
fn verify_unlinked_program_exits_2() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, "OPEN_CALL 3\nEND\n");

    pegvm()
        .args(["verify", binary.to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unlinked call to rule 3"));
}

#[test]
fn verify_garbage_binary_exits_1() {
    let dir = TempDir::new().unwrap();
    let binary = dir.path().join("garbage.pegb");
    fs::write(&binary, [0xffu8, 0, 0, 0]).unwrap();

    pegvm()
        .args(["verify", binary.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid binary"));
}

// ---- Disassemble ----

#[test]
fn disassemble_prints_canonical_text() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(
        &dir,
        "choice +4 0\nchar 0 0x61\nchar 0 'b'\ncommit 2\nchar 0 97\nend\n",
    );

    pegvm()
        .args(["disassemble", binary.to_str().unwrap()])
        .assert()
        .success()
        .stdout(AB_OR_A);
}

// ---- Match ----

#[test]
fn match_prints_span() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .args(["match", binary.to_str().unwrap(), "--input", "abc"])
        .assert()
        .success()
        .stdout("match 0..2\n");
}

#[test]
fn match_retries_second_alternative() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .args(["match", binary.to_str().unwrap(), "--input", "ac"])
        .assert()
        .success()
        .stdout("match 0..1\n");
}

#[test]
fn match_prints_captures() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, NUMBER);

    pegvm()
        .args([
            "match",
            binary.to_str().unwrap(),
            "--input",
            "x=42;",
            "--start",
            "2",
        ])
        .assert()
        .success()
        .stdout("match 2..4\ncapture 2..4 depth 0\n");
}

#[test]
fn match_reads_input_file() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, NUMBER);
    let text = dir.path().join("input.txt");
    fs::write(&text, "123\n").unwrap();

    pegvm()
        .args([
            "match",
            binary.to_str().unwrap(),
            "--file",
            text.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("match 0..3\n"));
}

#[test]
fn match_respects_end_bound() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, NUMBER);

    pegvm()
        .args([
            "match",
            binary.to_str().unwrap(),
            "--input",
            "12345",
            "--end",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("match 0..2\n"));
}

#[test]
fn match_counts_characters_not_bytes() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, "CHAR 0 'é'\nANY 0 1\nEND\n");

    pegvm()
        .args(["match", binary.to_str().unwrap(), "--input", "éx"])
        .assert()
        .success()
        .stdout("match 0..2\n");
}

#[test]
fn no_match_exits_4() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .args(["match", binary.to_str().unwrap(), "--input", "b"])
        .assert()
        .failure()
        .code(4)
        .stdout("")
        .stderr(predicate::str::contains("no match"));
}

#[test]
fn match_refuses_unverified_program() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, "JUMP 5\nEND\n");

    pegvm()
        .args(["match", binary.to_str().unwrap(), "--input", "a"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("outside the program"));
}

#[test]
fn match_stack_ceiling_exits_3() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, RUNAWAY);

    pegvm()
        .args([
            "match",
            binary.to_str().unwrap(),
            "--input",
            "",
            "--max-stack",
            "32",
        ])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("match error"))
        .stderr(predicate::str::contains("32"));
}

#[test]
fn match_start_past_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .args([
            "match",
            binary.to_str().unwrap(),
            "--input",
            "ab",
            "--start",
            "9",
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn match_without_subject_exits_1() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .args(["match", binary.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--input or --file"));
}

#[test]
fn debug_logging_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, AB_OR_A);

    pegvm()
        .env("RUST_LOG", "debug")
        .args(["match", binary.to_str().unwrap(), "--input", "ab"])
        .assert()
        .success()
        .stdout("match 0..2\n")
        .stderr(predicate::str::contains("match succeeded"));
}
