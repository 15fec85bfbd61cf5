// Regression tests for the trellis binary: exit codes, stdout HTML and miette
// diagnostics on stderr.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn trellis() -> Command {
    Command::cargo_bin("trellis").unwrap()
}

#[test]
fn run_prints_html() {
    let file = "tests/cli_run_ok.trellis";
    fs::write(file, "vstack do\n  text(\"Hello\")\nend\n").unwrap();

    trellis()
        .arg("run")
        .arg(file)
        .assert()
        .success()
        .stdout(contains("<div class=\"flex flex-col\"><span>Hello</span></div>"));

    let _ = fs::remove_file(file);
}

#[test]
fn run_reads_stdin() {
    trellis()
        .args(["run", "-"])
        .write_stdin("button(\"Go\")")
        .assert()
        .success()
        .stdout(contains("<button type=\"button\">Go</button>"));
}

#[test]
fn security_violation_renders_a_diagnostic() {
    let file = "tests/cli_run_bad.trellis";
    fs::write(file, "text(\"a\").instance_eval(\"x\")").unwrap();

    trellis()
        .arg("run")
        .arg(file)
        .assert()
        .failure()
        .stderr(contains("trellis::security").and(contains("instance_eval")));

    let _ = fs::remove_file(file);
}

#[test]
fn json_output_reports_failure() {
    trellis()
        .args(["run", "--json", "-"])
        .write_stdin("vstack do")
        .assert()
        .failure()
        .stdout(contains("\"success\": false").and(contains("Syntax Error:")));
}

#[test]
fn list_methods_as_json() {
    trellis()
        .args(["list-methods", "--json"])
        .assert()
        .success()
        .stdout(contains("\"name\": \"vstack\"").and(contains("\"name\": \"padding\"")));
}

#[test]
fn check_reports_each_snippet() {
    let dir = "tests/cli_check_tmp";
    let _ = fs::remove_dir_all(dir);
    fs::create_dir_all(dir).unwrap();
    fs::write(format!("{dir}/good.trellis"), "text(\"ok\")").unwrap();

    trellis()
        .args(["check", dir])
        .assert()
        .success()
        .stdout(contains("1 checked, 0 failed"));

    fs::write(format!("{dir}/bad.trellis"), "system(\"ls\")").unwrap();
    trellis()
        .args(["check", dir])
        .assert()
        .failure()
        .stdout(contains("2 checked, 1 failed"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_file_is_a_cli_error() {
    trellis()
        .args(["run", "tests/does_not_exist.trellis"])
        .assert()
        .code(2)
        .stderr(contains("could not read"));
}

#[test]
fn bindings_lists_controllers() {
    trellis()
        .args(["bindings", "-"])
        .write_stdin("div.data(controller: \"counter\", action: \"click->counter#add\")")
        .assert()
        .success()
        .stdout(contains("counter").and(contains("click -> counter#add")));
}
