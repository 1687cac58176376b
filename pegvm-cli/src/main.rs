//! PEG VM CLI: assemble, verify, disassemble, and match.
//!
//! Exit codes:
//! - 0: Success (or a match)
//! - 1: Input/decode/assembly error
//! - 2: Verification failure
//! - 3: Matcher error
//! - 4: No match

mod commands;

use std::process;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "assemble" => commands::assemble(&args[2..]),
        "verify" => commands::verify(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "match" => commands::match_input(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    eprintln!("Usage: pegvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  assemble <input.peg> [-o output.pegb]   Assemble text to binary");
    eprintln!("  verify <input.pegb>                     Verify a binary program");
    eprintln!("  disassemble <input.pegb>                Disassemble binary to text");
    eprintln!("  match <input.pegb> (--input TEXT | --file PATH)");
    eprintln!("        [--start N] [--end N] [--max-stack N]");
    eprintln!("                                          Verify, then match anchored at --start");
}
