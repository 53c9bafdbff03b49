use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn config_file_sets_wrap_and_eof() {
    let config = write_temp("[run]\nwrap = true\neof = \"max\"\n");
    let program = write_temp("<,.");
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .env_remove("BYTEBF_TAPE_SIZE")
        .arg("run").arg(program.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(vec![255u8]);
}

#[test]
fn flags_override_config_file() {
    let config = write_temp("[run]\ntape_size = 2\n");
    let program = write_temp(">>>+.");
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .env_remove("BYTEBF_TAPE_SIZE")
        .arg("run").arg(program.path())
        .assert()
        .code(1);
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .env_remove("BYTEBF_TAPE_SIZE")
        .arg("run").arg("--tape-size").arg("8").arg(program.path())
        .assert()
        .success()
        .stdout(vec![1u8]);
}

#[test]
fn negative_flags_override_config_switches() {
    let config = write_temp("[run]\nwrap = true\ndebug_trap = true\n");
    let program = write_temp("<+.?");
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .env_remove("BYTEBF_TAPE_SIZE")
        .arg("run").arg(program.path())
        .assert()
        .success()
        .stdout(vec![1u8])
        .stderr(predicate::str::contains("cell=1, ptr=29999"));
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .env_remove("BYTEBF_TAPE_SIZE")
        .arg("run").arg("--no-wrap").arg(program.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Pointer out of bounds"));
    let trap_only = write_temp("+?.");
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .env_remove("BYTEBF_TAPE_SIZE")
        .env_remove("RUST_LOG")
        .arg("run").arg("--no-debug-trap").arg(trap_only.path())
        .assert()
        .success()
        .stdout(vec![1u8])
        .stderr(predicate::str::is_empty());
}

#[test]
fn invalid_config_value_is_a_usage_error() {
    let config = write_temp("[run]\neof = \"sometimes\"\n");
    let program = write_temp("+.");
    Command::cargo_bin("bytebf").unwrap()
        .env("BYTEBF_CONFIG", config.path())
        .arg("run").arg(program.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}
