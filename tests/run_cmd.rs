use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bytebf").unwrap();
    // Keep the user's config and environment out of the way.
    cmd.env("BYTEBF_CONFIG", "/nonexistent/bytebf.toml")
        .env_remove("BYTEBF_TAPE_SIZE")
        .env_remove("BYTEBF_MAX_STEPS")
        .env_remove("RUST_LOG")
        .timeout(Duration::from_secs(5));
    cmd
}

fn source_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn increments_and_prints_byte() {
    let tf = source_file("+++.");
    cargo_bin()
        .arg("run").arg(tf.path())
        .assert()
        .success()
        .stdout(vec![3u8])
        .stderr(predicate::str::is_empty());
}

#[test]
fn reads_stdin_byte() {
    let tf = source_file(",+.");
    cargo_bin()
        .arg("run").arg(tf.path())
        .write_stdin("A")
        .assert()
        .success()
        .stdout("B");
}

#[test]
fn hello_world_with_comments() {
    let tf = source_file(
        "Hello World program\n\
         ++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]\n\
         >>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.\n",
    );
    cargo_bin()
        .arg("run").arg(tf.path())
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn batch_continues_after_a_bad_file() {
    let bad = source_file("+]");
    let good = source_file("++++++++[>++++++++<-]>+.");
    cargo_bin()
        .arg("run").arg(bad.path()).arg(good.path())
        .assert()
        .code(1)
        .stdout("A")
        .stderr(predicate::str::contains("Parse error").and(predicate::str::contains("']'")));
}

#[test]
fn unmatched_open_reports_line_and_column() {
    let tf = source_file("+\n +[-\n");
    cargo_bin()
        .arg("run").arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2, column 3"));
}

#[test]
fn non_utf8_source_reports_column_of_stray_bracket() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    tf.write_all(b"\xff\xfe]").unwrap();
    cargo_bin()
        .arg("run").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 1, column 3"))
        .stderr(predicate::str::contains("\u{fffd}\u{fffd}]"));
}

#[test]
fn missing_file_is_reported() {
    cargo_bin()
        .arg("run").arg("/nonexistent/program.bf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn no_files_prints_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn stats_and_time_go_to_stderr() {
    let tf = source_file("+[-]");
    cargo_bin()
        .arg("run").arg("--stats").arg("--time").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("ops: 4")
                .and(predicate::str::contains("branches: 2 (taken 0"))
                .and(predicate::str::contains("Time:")),
        );
}

#[test]
fn dump_prints_listing_before_running() {
    let tf = source_file("++[>+<-]");
    cargo_bin()
        .arg("run").arg("-d").arg(tf.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Bytecode:").and(predicate::str::contains("    1: [7")));
}

#[test]
fn step_limit_aborts_infinite_loop() {
    let tf = source_file("+[]");
    cargo_bin()
        .arg("run").arg("--max-steps").arg("1000").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (1000)"));
}

#[test]
fn step_limit_from_environment() {
    let tf = source_file("+[]");
    cargo_bin()
        .env("BYTEBF_MAX_STEPS", "100")
        .arg("run").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (100)"));
}

#[test]
fn pointer_overrun_is_an_error_unless_wrapping() {
    let tf = source_file("<+.");
    cargo_bin()
        .arg("run").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Pointer out of bounds"));

    cargo_bin()
        .arg("run").arg("--wrap").arg(tf.path())
        .assert()
        .success()
        .stdout(vec![1u8]);
}

#[test]
fn tape_size_flag_limits_tape() {
    let tf = source_file(">>>+.");
    cargo_bin()
        .arg("run").arg("--tape-size").arg("3").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Pointer out of bounds"));
}

#[test]
fn eof_modes() {
    let tf = source_file("+,.");
    cargo_bin()
        .arg("run").arg(tf.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(vec![0u8]);
    cargo_bin()
        .arg("run").arg("--eof").arg("unchanged").arg(tf.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(vec![1u8]);
    cargo_bin()
        .arg("run").arg("--eof").arg("max").arg(tf.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(vec![255u8]);
}

#[test]
fn debug_trap_prints_state() {
    let tf = source_file("++>+?");
    cargo_bin()
        .arg("run").arg("--debug-trap").arg(tf.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("cell=1, ptr=1"));
}

#[test]
fn each_file_starts_on_a_zeroed_tape() {
    let first = source_file("+++++");
    let second = source_file(".");
    cargo_bin()
        .arg("run").arg(first.path()).arg(second.path())
        .assert()
        .success()
        .stdout(vec![0u8]);
}
