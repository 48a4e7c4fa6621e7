use assert_cmd::Command;
use predicates::str::contains;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const COUNTDOWN: &str = ":main\nLD R0 000 1010\nSUB R0 000 0001\nBZ R0 :Finished\nB :main\n\n:Finished\n";

fn temp_root(tag: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should move forward")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("eduasm-cli-{tag}-{unique}"));
    std::fs::create_dir_all(&root).expect("failed to create temp root");
    root
}

fn write_source(root: &PathBuf, name: &str, text: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, text).expect("failed to write input");
    path
}

#[test]
fn help_flag_prints_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eduasm"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("Usage: eduasm"))
        .stdout(contains("--output"))
        .stdout(contains("--listing"));
}

#[test]
fn assembles_to_stdout() {
    let root = temp_root("stdout");
    let input = write_source(&root, "countdown.asm", COUNTDOWN);

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eduasm"));
    let output = cmd.arg(&input).output().expect("failed to run");
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).expect("stdout is utf-8");
    assert_eq!(text.lines().count(), 64);
    assert!(text.starts_with("020a;(Assembly: :main LD R0 000 1010)\n"));
    assert!(text.contains("0000;(Assembly: :Finished)\n"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn writes_image_and_listing_files() {
    let root = temp_root("files");
    let input = write_source(&root, "countdown.asm", COUNTDOWN);
    let image = root.join("countdown.hex");
    let listing = root.join("countdown.lst");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eduasm"));
    cmd.arg(&input)
        .arg("-o")
        .arg(&image)
        .arg("--listing")
        .arg(&listing)
        .assert()
        .success()
        .stdout("");

    let text = std::fs::read_to_string(&image).expect("image should exist");
    assert_eq!(text.lines().count(), 64);
    assert!(text.lines().nth(3).is_some_and(|line| line.starts_with("1600;")));

    let report = std::fs::read_to_string(&listing).expect("listing should exist");
    assert!(report.contains("Program Listing:"));
    assert!(report.contains("4 of 64 words used"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn bad_program_fails_with_line_context() {
    let root = temp_root("error");
    let input = write_source(&root, "bad.asm", "NOP\nJUMP 3\n");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eduasm"));
    cmd.arg(&input)
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("line 2"))
        .stderr(contains("Unknown operation `JUMP`"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn hard_coded_branch_warns_on_stderr() {
    let root = temp_root("warn");
    let input = write_source(&root, "warn.asm", "BZ R0 5\nHALT\n");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eduasm"));
    cmd.arg(&input)
        .assert()
        .success()
        .stderr(contains("branching to hard coded address 5"))
        .stdout(contains("1805;(Assembly: BZ R0 5)"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_source_fails() {
    let root = temp_root("missing");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eduasm"));
    cmd.arg(root.join("nope.asm"))
        .assert()
        .failure()
        .stderr(contains("cant read"));

    let _ = std::fs::remove_dir_all(root);
}
