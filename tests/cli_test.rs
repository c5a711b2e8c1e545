use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn rvdispatch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rvdispatch"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn table_override(dir: &Path, name: &str, source: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    format!("i={}", path.display())
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_success_writes_code_to_stdout() {
    let output = rvdispatch(&["-m", "rust"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("pub trait DispatchRv32im {"));
}

#[test]
fn test_repeated_extension_flags() {
    let output = rvdispatch(&["-c", "-c", "-m", "-c", "c++"]);
    assert_eq!(output.status.code(), Some(0));
    let code = stdout(&output);
    assert!(code.contains("struct Rv32imcDispatcher : public Handler"));
    assert_eq!(code.matches("IsRv32cInstructionHandler<Handler>").count(), 1);
}

#[test]
fn test_malformed_table_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let table = table_override(dir.path(), "bad.opcodes", "addi rd rs1 imm12 14..=0\n");

    let output = rvdispatch(&["--table", &table, "rust"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("invalid bit range '14..'"));
}

#[test]
fn test_ambiguous_table_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let table = table_override(
        dir.path(),
        "dup.opcodes",
        "add rd rs1 rs2 31..25=0 14..12=0 6..2=0x0C 1..0=3\n\
         add2 rd rs1 rs2 31..25=0 14..12=0 6..2=0x0C 1..0=3\n",
    );

    let output = rvdispatch(&["--table", &table, "rust"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("rules 'add' and 'add2' have the same encoding"));
}

#[test]
fn test_unknown_operands_exit_3() {
    let dir = tempfile::tempdir().unwrap();
    let table = table_override(dir.path(), "odd.opcodes", "frob rd imm7 6..2=0x1F 1..0=3\n");

    let output = rvdispatch(&["--table", &table, "rust"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unreadable_table_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let missing = format!("i={}", dir.path().join("absent.opcodes").display());

    let output = rvdispatch(&["--table", &missing, "rust"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("failed to read opcode table"));
}

#[test]
fn test_usage_errors_exit_64() {
    assert_eq!(rvdispatch(&[]).status.code(), Some(64));
    assert_eq!(rvdispatch(&["-x", "rust"]).status.code(), Some(64));
    assert_eq!(rvdispatch(&["pascal"]).status.code(), Some(64));
    assert_eq!(rvdispatch(&["--table", "q=rv32q.opcodes", "rust"]).status.code(), Some(64));
}

#[test]
fn test_help_exits_0() {
    let output = rvdispatch(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--table"));
}
