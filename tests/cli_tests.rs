// Integration tests for the bfront binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn parses_and_renders_a_program() {
    let mut cmd = Command::cargo_bin("bfront").unwrap();
    cmd.arg(fixture("example.b"))
        .assert()
        .success()
        .stdout(predicate::str::contains("tab [3] 1, 'a', \"hi\";"))
        .stdout(predicate::str::contains("v 0;"))
        .stdout(predicate::str::contains("main() {"))
        .stdout(predicate::str::contains("while(i < 10)"));
}

#[test]
fn dumps_tokens() {
    let mut cmd = Command::cargo_bin("bfront").unwrap();
    cmd.arg("--tokens")
        .arg(fixture("example.b"))
        .assert()
        .success()
        .stdout(predicate::str::contains("identifier 'main'"))
        .stdout(predicate::str::contains("'auto'"))
        .stdout(predicate::str::contains("number 10"))
        .stdout(predicate::str::contains("end of file"));
}

#[test]
fn reports_parse_errors_on_stderr() {
    let mut cmd = Command::cargo_bin("bfront").unwrap();
    cmd.arg(fixture("bad.b"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error on line 2"));
}

#[test]
fn rejects_a_missing_file() {
    let mut cmd = Command::cargo_bin("bfront").unwrap();
    cmd.arg(fixture("does_not_exist.b"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
