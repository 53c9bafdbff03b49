use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bytebf").unwrap();
    cmd.env("BYTEBF_CONFIG", "/nonexistent/bytebf.toml");
    cmd
}

fn source_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn dump_lists_without_running() {
    // Reads input, but dump never executes so no stdin is needed.
    let tf = source_file("+++--[>,<-]");
    cargo_bin()
        .arg("dump").arg(tf.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("    0: +1")
                .and(predicate::str::contains("    1: [7"))
                .and(predicate::str::contains("    3: ,"))
                .and(predicate::str::contains("    6: ]2")),
        );
}

#[test]
fn dump_honours_nesting_limit() {
    let tf = source_file("[[[]]]");
    cargo_bin()
        .arg("dump").arg("--max-nesting").arg("2").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nesting deeper than 2"));
}
