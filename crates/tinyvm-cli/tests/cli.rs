//! End-to-end coverage for the `tinyvm-asm` / `tinyvm-run` binaries:
//! assemble a textual program to a `.bin` image, then run it.

use std::path::PathBuf;

use assert_cmd::Command;

fn asm() -> Command {
    Command::cargo_bin("tinyvm-asm").expect("tinyvm-asm binary builds")
}

fn run() -> Command {
    Command::cargo_bin("tinyvm-run").expect("tinyvm-run binary builds")
}

fn write_source(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).expect("write source fixture");
    path
}

fn assemble(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let source = write_source(dir, name, text);
    let output = asm().arg(&source).output().expect("tinyvm-asm runs");
    assert!(output.status.success(), "assembly failed: {}", String::from_utf8_lossy(&output.stderr));
    source.with_extension("bin")
}

#[test]
fn register_mode_addition_assembles_and_runs_to_a_clean_exit() {
    let dir = tempfile::tempdir().unwrap();
    let binary = assemble(
        &dir,
        "add.asm",
        ".MODE register\nLDI R0,#7\nLDI R1,#35\nADD R2,R0,R1\nEXIT\n",
    );

    let output = run().arg(&binary).output().expect("tinyvm-run runs");
    assert!(output.status.success());
}

#[test]
fn stack_mode_addition_assembles_and_runs_to_a_clean_exit() {
    let dir = tempfile::tempdir().unwrap();
    let binary = assemble(&dir, "add_stack.asm", ".MODE stack\nLDI #7\nLDI #35\nADD\nEXIT\n");

    let output = run().arg(&binary).output().expect("tinyvm-run runs");
    assert!(output.status.success());
}

#[test]
fn printing_a_formatted_integer_reaches_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let source = concat!(
        ".MODE register\n",
        "LDI R0,#123\n",
        "STR R1,fmt\n",
        "SARG #128\n",
        "SARG #0\n",
        "PUSH R0\n",
        "PUSH R1\n",
        "SCALL #0\n",
        "EXIT\n",
        "fmt: .WORD 1,\"%d\"\n",
    );
    let binary = assemble(&dir, "print.asm", source);

    let output = run().arg(&binary).output().expect("tinyvm-run runs");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "123");
}

#[test]
fn a_jump_to_an_undefined_label_fails_assembly_and_writes_no_image() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "bad_jump.asm", ".MODE register\nJMP undefined_label\nEXIT\n");

    let output = asm().arg(&source).output().expect("tinyvm-asm runs");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(100));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("undefined_label"), "stderr was: {stderr}");
    assert!(!source.with_extension("bin").exists());
}

#[test]
fn a_self_recursive_call_chain_overflows_the_stack_with_exit_code_101() {
    let dir = tempfile::tempdir().unwrap();
    let binary = assemble(&dir, "overflow.asm", ".MODE register\nmain: CALL main\n");

    let output = run().arg(&binary).output().expect("tinyvm-run runs");
    assert_eq!(output.status.code(), Some(101));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tinyvm-run:"), "stderr was: {stderr}");
}

#[test]
fn running_a_missing_binary_reports_an_io_error_through_anyhow() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.bin");

    let output = run().arg(&missing).output().expect("tinyvm-run runs");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(100));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not read"), "stderr was: {stderr}");
}
