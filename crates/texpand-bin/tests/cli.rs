use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn texpand() -> Command {
    let mut cmd = Command::cargo_bin("texpand").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("CLICOLOR_FORCE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn expand_text() {
    let mut cmd = texpand();
    cmd.args(["expand", r"\def\greet#1{Hello, #1!}\greet{World}"]);
    cmd.assert().success().stdout("Hello, World!");
}

#[test]
fn run_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("main.tex");
    std::fs::write(&input, "\\def\\a{b}%\n\\a\\a x\n").unwrap();

    let mut cmd = texpand();
    cmd.arg("run").arg(&input);
    cmd.assert().success().stdout("bbx ");
}

#[test]
fn run_appends_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.tex"), "ok").unwrap();

    let mut cmd = texpand();
    cmd.current_dir(dir.path()).args(["run", "main"]);
    cmd.assert().success().stdout("ok");
}

#[test]
fn run_with_input_and_output_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("macros.tex"), r"\def\name{texpand}").unwrap();
    std::fs::write(dir.path().join("main.tex"), r"\input macros I am \name.").unwrap();

    let mut cmd = texpand();
    cmd.current_dir(dir.path())
        .args(["run", "main.tex", "--output", "out.txt"]);
    cmd.assert().success().stdout("");
    let output = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    similar_asserts::assert_eq!(output, "I am texpand.");
}

#[test]
fn write_to_stream() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = texpand();
    cmd.current_dir(dir.path()).args([
        "expand",
        r"\def\a{x}\openout1=log.txt \write1{\a\a}done",
    ]);
    cmd.assert().success().stdout("done");
    let log = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
    assert_eq!(log, "xx\n");
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = texpand();
    cmd.current_dir(dir.path()).args(["run", "missing.tex"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not read `missing.tex`"));
}

#[test]
fn undefined_macro_suggestion() {
    let mut cmd = texpand();
    cmd.args(["expand", r"\def\hello{}\helo"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("undefined control sequence `\\helo`"))
        .stderr(predicate::str::contains("did you mean `\\hello`?"));
}

#[test]
fn json_errors() {
    let mut cmd = texpand();
    cmd.args(["--error-format", "json", "expand", r"\def\a{\a}\a"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(r#""kind":"MaxExpansionDepthExceeded""#));
}

#[test]
fn max_expansion_depth_flag() {
    let mut cmd = texpand();
    cmd.args([
        "expand",
        "--max-expansion-depth",
        "2",
        r"\def\a{\b}\def\b{\c}\def\c{x}\a",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("maximum expansion depth of 2 exceeded"));

    let mut cmd = texpand();
    cmd.args([
        "expand",
        "--max-expansion-depth",
        "3",
        r"\def\a{\b}\def\b{\c}\def\c{x}\a",
    ]);
    cmd.assert().success().stdout("x");
}

#[test]
fn max_input_depth_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("loop.tex"), "\\input loop\n").unwrap();

    let mut cmd = texpand();
    cmd.current_dir(dir.path())
        .args(["--error-format", "json", "--max-input-depth", "5", "run", "loop"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(r#""kind":"InputStackOverflow""#));
}

#[test]
fn doc_single_command() {
    let mut cmd = texpand();
    cmd.args(["doc", "def"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Define a custom macro"));
}

#[test]
fn doc_all_commands() {
    let mut cmd = texpand();
    cmd.arg("doc");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\\expandafter"))
        .stdout(predicate::str::contains("\\uppercase"));
}

#[test]
fn doc_unknown_command() {
    let mut cmd = texpand();
    cmd.args(["doc", "edeff"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command \\edeff; did you mean \\edef?"));
}
