use std::fs;
use std::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_micalint");

const FAILING: &str = "type Router interface {\n\tuse(h int)\n\tgroup(f func(Router))\n}\n\nfunc serve(r1 Router) {\n\tr1.group(func(r2 Router) {\n\t\tr1.use(0)\n\t})\n}\n";

const CLEAN: &str = "type Router interface {\n\tuse(h int)\n\tgroup(f func(Router))\n}\n\nfunc serve(r1 Router) {\n\tr1.group(func(r2 Router) {\n\t\tr2.use(0)\n\t})\n}\n";

#[test]
fn clean_file_exits_zero_with_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clean.mica");
    fs::write(&path, CLEAN).unwrap();

    let out = Command::new(BIN).arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
}

#[test]
fn finding_prints_one_line_and_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shadow.mica");
    fs::write(&path, FAILING).unwrap();

    let out = Command::new(BIN).arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(
        lines[0].ends_with(
            ":8:3: accessing outer scope when closer var of same type exists. Did you mean r2?"
        ),
        "unexpected line: {}",
        lines[0]
    );
}

#[test]
fn paths_under_the_working_directory_print_relative() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().canonicalize().unwrap();
    fs::write(cwd.join("shadow.mica"), FAILING).unwrap();

    let out = Command::new(BIN)
        .arg("shadow.mica")
        .current_dir(&cwd)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(
        stdout.starts_with("shadow.mica:8:3:"),
        "unexpected output: {stdout}"
    );
}

#[test]
fn unparseable_file_reports_loader_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.mica");
    fs::write(&path, "func (\n").unwrap();

    let out = Command::new(BIN).arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("loader: "), "unexpected output: {stdout}");
}

#[test]
fn missing_file_reports_loader_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.mica");

    let out = Command::new(BIN).arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("loader: "), "unexpected output: {stdout}");
}

#[test]
fn json_output_carries_the_finding_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shadow.mica");
    fs::write(&path, FAILING).unwrap();

    let out = Command::new(BIN).arg("--json").arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let findings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let arr = findings.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["line"], 8);
    assert_eq!(arr[0]["col"], 3);
    assert_eq!(arr[0]["suggestion"], "r2");
}

#[test]
fn multiple_files_are_checked_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let clean = dir.path().join("clean.mica");
    let failing = dir.path().join("shadow.mica");
    fs::write(&clean, CLEAN).unwrap();
    fs::write(&failing, FAILING).unwrap();

    let out = Command::new(BIN).arg(&clean).arg(&failing).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}
