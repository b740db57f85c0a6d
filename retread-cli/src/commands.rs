//! CLI command implementations.

use std::fs;

use retread_model::{Class, Method};
use retread_profile::Recorder;
use retread_vm::Value;

/// Assemble a file and print its disassembly listing.
pub fn disasm(args: &[String]) -> Result<(), i32> {
    let class = load_class(args, "disasm")?;
    print_listing(&class)
}

/// Report which methods end in a recursive tail call.
pub fn analyze(args: &[String]) -> Result<(), i32> {
    let class = load_class(args, "analyze")?;
    for method in &class.methods {
        let verdict = if retread_rewrite::is_tail_recursive(&class.name, method) {
            "tail-recursive"
        } else {
            "not tail-recursive"
        };
        println!("{}{}: {verdict}", method.name, method.desc);
    }
    Ok(())
}

/// Rewrite tail-recursive methods and print the result.
///
/// With a method name, rewrites exactly that method and fails when it
/// has no qualifying tail call; without one, rewrites whatever the
/// analyzer approves.
pub fn optimize(args: &[String]) -> Result<(), i32> {
    let mut class = load_class(args, "optimize")?;
    match args.get(1) {
        Some(name) => {
            let owner = class.name.clone();
            let index = class
                .methods
                .iter()
                .position(|m| &m.name == name)
                .ok_or_else(|| {
                    eprintln!("error: no method named '{name}'");
                    1
                })?;
            retread_rewrite::optimize(&owner, &mut class.methods[index]).map_err(|e| {
                eprintln!("error: {e}");
                2
            })?;
            eprintln!("rewrote 1 method(s)");
        }
        None => {
            let rewritten = retread_rewrite::optimize_class(&mut class);
            eprintln!("rewrote {} method(s)", rewritten.len());
        }
    }
    print_listing(&class)
}

/// Apply the standard entry/exit patches and print the result.
pub fn instrument(args: &[String]) -> Result<(), i32> {
    let mut class = load_class(args, "instrument")?;
    retread_rewrite::instrument_class(&mut class);
    print_listing(&class)
}

/// Interpret one method of an assembled file.
pub fn run(args: &[String]) -> Result<(), i32> {
    let (class, method, call_args) = prepare_call(args, "run")?;
    match retread_vm::run_method(&class, &method.name, &method.desc, call_args) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Instrument, interpret, and print the calling context tree.
pub fn profile(args: &[String]) -> Result<(), i32> {
    let (mut class, method, call_args) = prepare_call(args, "profile")?;
    let (name, desc) = (method.name.clone(), method.desc.clone());
    retread_rewrite::instrument_class(&mut class);

    let mut recorder = Recorder::new();
    match retread_vm::run_with_recorder(&class, &name, &desc, call_args, &mut recorder) {
        Ok(value) => {
            println!("{value}");
            println!("Calling Context Tree:");
            print!("{}", recorder.tree());
            Ok(())
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

// --- Helpers ---

/// Read and assemble the input file named by `args[0]`.
fn load_class(args: &[String], command: &str) -> Result<Class, i32> {
    let Some(input) = args.first() else {
        eprintln!("error: {command} requires an input file");
        eprintln!("Usage: retread {command} <file.rasm>");
        return Err(1);
    };

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let class = retread_asm::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    log::debug!("assembled {} ({} methods)", class.name, class.methods.len());
    Ok(class)
}

fn print_listing(class: &Class) -> Result<(), i32> {
    let text = retread_asm::disassemble_class(class).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    print!("{text}");
    Ok(())
}

/// Load the class, pick the target method, and parse call arguments.
///
/// Instance methods get a null receiver pushed in front of the parsed
/// arguments.
fn prepare_call(args: &[String], command: &str) -> Result<(Class, Method, Vec<Value>), i32> {
    if args.len() < 2 {
        eprintln!("error: {command} requires an input file and a method name");
        eprintln!("Usage: retread {command} <file.rasm> <method> [args..]");
        return Err(1);
    }
    let class = load_class(args, command)?;
    let name = &args[1];
    let method = class.method_by_name(name).cloned().ok_or_else(|| {
        eprintln!("error: no unique method named '{name}'");
        1
    })?;

    let mut call_args = Vec::new();
    if !method.is_static {
        call_args.push(Value::Null);
    }
    for raw in &args[2..] {
        call_args.push(parse_value(raw)?);
    }
    Ok((class, method, call_args))
}

/// `7` is an int, `1,2,3` is an int array.
fn parse_value(raw: &str) -> Result<Value, i32> {
    if raw.contains(',') {
        let mut items = Vec::new();
        for part in raw.split(',').filter(|p| !p.is_empty()) {
            items.push(Value::Int(parse_int(part)?));
        }
        return Ok(Value::array_of(items));
    }
    Ok(Value::Int(parse_int(raw)?))
}

fn parse_int(raw: &str) -> Result<i32, i32> {
    raw.parse().map_err(|_| {
        eprintln!("error: invalid argument '{raw}' (expected an int or a comma-list)");
        1
    })
}
