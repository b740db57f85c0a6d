//! Integration tests for the retread CLI.
//!
//! These tests invoke the `retread` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn retread() -> Command {
    Command::cargo_bin("retread").unwrap()
}

/// Return the workspace root (parent of retread-cli/).
fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Return the absolute path to a test program file.
fn test_program(name: &str) -> String {
    workspace_root()
        .join("tests/programs")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

// ---- No-args / help ----

#[test]
fn no_args_prints_usage_and_exits_1() {
    retread()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: retread"));
}

#[test]
fn help_flag_exits_0() {
    retread()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Usage: retread"));
}

#[test]
fn unknown_command_exits_1() {
    retread()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown command"));
}

// ---- disasm ----

#[test]
fn disasm_golden_output() {
    retread()
        .args(["disasm", &test_program("answer.rasm")])
        .assert()
        .success()
        .stdout("Class: lab/Answer\n  Method: answer()I\n0:\tBIPUSH 42\n1:\tIRETURN\n");
}

#[test]
fn disasm_shows_markers_and_calls() {
    retread()
        .args(["disasm", &test_program("sum.rasm")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Class: lab/Sum"))
        .stdout(predicate::str::contains("// label"))
        .stdout(predicate::str::contains("INVOKESTATIC lab/Sum.sum ([III)I"));
}

#[test]
fn disasm_missing_file_exits_1() {
    retread()
        .args(["disasm", "no/such/file.rasm"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn disasm_assembly_error_reports_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.rasm");
    fs::write(
        &path,
        ".class lab/Bad\n.method f ()V static\n    frobnicate\n.end method\n",
    )
    .unwrap();
    retread()
        .args(["disasm", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 3"));
}

// ---- analyze ----

#[test]
fn analyze_reports_tail_recursion() {
    retread()
        .args(["analyze", &test_program("sum.rasm")])
        .assert()
        .success()
        .stdout(predicate::str::contains("sum([III)I: tail-recursive"));
}

#[test]
fn analyze_reports_plain_methods() {
    retread()
        .args(["analyze", &test_program("answer.rasm")])
        .assert()
        .success()
        .stdout(predicate::str::contains("answer()I: not tail-recursive"));
}

// ---- optimize ----

#[test]
fn optimize_removes_the_self_call() {
    retread()
        .args(["optimize", &test_program("sum.rasm")])
        .assert()
        .success()
        .stderr(predicate::str::contains("rewrote 1 method(s)"))
        .stdout(predicate::str::contains("INVOKESTATIC").not())
        .stdout(predicate::str::contains("GOTO"));
}

#[test]
fn optimize_named_method() {
    retread()
        .args(["optimize", &test_program("sum.rasm"), "sum"])
        .assert()
        .success()
        .stderr(predicate::str::contains("rewrote 1 method(s)"))
        .stdout(predicate::str::contains("GOTO"));
}

#[test]
fn optimize_non_tail_method_exits_2() {
    retread()
        .args(["optimize", &test_program("answer.rasm"), "answer"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not tail recursive"));
}

#[test]
fn optimize_unknown_method_exits_1() {
    retread()
        .args(["optimize", &test_program("sum.rasm"), "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no method named 'nope'"));
}

// ---- instrument ----

#[test]
fn instrument_splices_hook_calls() {
    retread()
        .args(["instrument", &test_program("sum.rasm")])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "INVOKESTATIC retread/profile/Recorder.onEnter",
        ))
        .stdout(predicate::str::contains(
            "INVOKESTATIC retread/profile/Recorder.onExit",
        ));
}

// ---- run ----

#[test]
fn run_evaluates_a_method() {
    retread()
        .args(["run", &test_program("sum.rasm"), "sum", "1,2,3", "0", "0"])
        .assert()
        .success()
        .stdout("6\n");
}

#[test]
fn run_runtime_error_exits_3() {
    retread()
        .args(["run", &test_program("boom.rasm"), "boom"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("runtime error"));
}

#[test]
fn run_missing_method_exits_1() {
    retread()
        .args(["run", &test_program("sum.rasm"), "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no unique method"));
}

#[test]
fn run_bad_argument_exits_1() {
    retread()
        .args(["run", &test_program("sum.rasm"), "sum", "abc", "0", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid argument"));
}

// ---- profile ----

#[test]
fn profile_prints_the_call_tree() {
    retread()
        .args(["profile", &test_program("sum.rasm"), "sum", "1,2,3", "0", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6\n"))
        .stdout(predicate::str::contains("Calling Context Tree:"))
        .stdout(predicate::str::contains("root"))
        .stdout(predicate::str::contains("  lab/Sum.sum([III)I"));
}

#[test]
fn profile_nesting_depth_matches_recursion() {
    // Four nested activations for a three-element array.
    let assert = retread()
        .args(["profile", &test_program("sum.rasm"), "sum", "1,2,3", "0", "0"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let deepest = stdout
        .lines()
        .filter(|l| l.trim_start().starts_with("lab/Sum"))
        .map(|l| l.len() - l.trim_start().len())
        .max()
        .unwrap();
    assert_eq!(deepest, 8); // depth 4, two spaces per level
}
