//! retread CLI — disassemble, analyze, rewrite, and run instruction
//! streams.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/assembly error
//! - 2: Analysis/rewrite failure
//! - 3: Runtime error

mod commands;

use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "disasm" => commands::disasm(&args[2..]),
        "analyze" => commands::analyze(&args[2..]),
        "optimize" => commands::optimize(&args[2..]),
        "instrument" => commands::instrument(&args[2..]),
        "run" => commands::run(&args[2..]),
        "profile" => commands::profile(&args[2..]),
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

fn print_usage() {
    eprintln!("Usage: retread <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  disasm <file.rasm>                     Assemble and print a disassembly listing");
    eprintln!("  analyze <file.rasm>                    Report tail-recursive methods");
    eprintln!("  optimize <file.rasm> [method]          Rewrite tail calls, print the result");
    eprintln!("  instrument <file.rasm>                 Add entry/exit hook patches, print the result");
    eprintln!("  run <file.rasm> <method> [args..]      Interpret a method (ints, or comma-lists as int arrays)");
    eprintln!("  profile <file.rasm> <method> [args..]  Instrument, run, and print the calling context tree");
}
