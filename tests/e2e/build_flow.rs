//! Happy-path build flows through the CLI

use std::fs;

use super::helpers::*;

/// Test: a two-step chain builds and reports success.
#[test]
fn test_builds_dependency_chain() {
    let yaml = r"
rules:
  - target: 'out\.txt'
    depends: ['in.txt']
    commands: ['cp {depends} {target}']
";
    let temp = workspace_with_makefile(yaml).expect("Should create workspace");
    fs::write(temp.path().join("in.txt"), "payload").expect("Should write input");

    let output = run_kiln(temp.path(), &["out.txt"]).expect("Should run");
    assert_success(&output);

    let stdout = stdout_of(&output);
    assert!(stdout.contains("cp in.txt out.txt"), "commands echo: {stdout}");
    assert!(stdout.contains("kiln: Success!"), "missing banner: {stdout}");
    let built = fs::read_to_string(temp.path().join("out.txt")).expect("Should be built");
    assert_eq!(built, "payload");
}

/// Test: with no arguments the goal is the target named "default".
#[test]
fn test_default_target_used_when_omitted() {
    let yaml = r"
rules:
  - target: default
    phony: true
    commands: ['echo building default']
";
    let temp = workspace_with_makefile(yaml).expect("Should create workspace");

    let output = run_kiln(temp.path(), &[]).expect("Should run");
    assert_success(&output);
    assert!(stdout_of(&output).contains("building default"));
}

/// Test: an up-to-date target runs no commands on the second build.
#[test]
fn test_up_to_date_target_skips_commands() {
    let yaml = r"
rules:
  - target: 'out\.txt'
    depends: ['in.txt']
    commands: ['cp in.txt out.txt']
";
    let temp = workspace_with_makefile(yaml).expect("Should create workspace");
    fs::write(temp.path().join("in.txt"), "payload").expect("Should write input");

    let first = run_kiln(temp.path(), &["out.txt"]).expect("Should run");
    assert_success(&first);
    assert!(stdout_of(&first).contains("cp in.txt out.txt"));

    let second = run_kiln(temp.path(), &["out.txt"]).expect("Should run");
    assert_success(&second);
    let stdout = stdout_of(&second);
    assert!(
        !stdout.contains("cp in.txt out.txt"),
        "fresh target reran its commands: {stdout}"
    );
    assert!(stdout.contains("kiln: Success!"));
}

/// Test: a phony goal runs its commands on every build.
#[test]
fn test_phony_goal_runs_every_time() {
    let yaml = r"
rules:
  - target: lint
    phony: true
    commands: ['echo linting']
";
    let temp = workspace_with_makefile(yaml).expect("Should create workspace");

    for _ in 0..2 {
        let output = run_kiln(temp.path(), &["lint"]).expect("Should run");
        assert_success(&output);
        assert!(stdout_of(&output).contains("linting"));
    }
}

/// Test: wildcard rules resolve through capture groups from the CLI goal.
#[test]
fn test_wildcard_rule_via_cli() {
    let yaml = r"
rules:
  - target: '(\w+)\.copy'
    depends: ['{0}.txt']
    commands: ['cat {depends} > {target}']
";
    let temp = workspace_with_makefile(yaml).expect("Should create workspace");
    fs::write(temp.path().join("note.txt"), "wildcarded").expect("Should write input");

    let output = run_kiln(temp.path(), &["note.copy"]).expect("Should run");
    assert_success(&output);
    let built = fs::read_to_string(temp.path().join("note.copy")).expect("Should be built");
    assert_eq!(built, "wildcarded");
}

/// Test: a satisfied prerequisite never retriggers its dependents.
#[test]
fn test_prerequisite_gates_on_existence_only() {
    let yaml = r"
rules:
  - target: 'gen\.txt'
    prerequisites: ['marker.txt']
    commands: ['cat marker.txt > gen.txt']
  - target: 'marker\.txt'
    commands: ['echo marked > marker.txt']
";
    let temp = workspace_with_makefile(yaml).expect("Should create workspace");

    let first = run_kiln(temp.path(), &["gen.txt"]).expect("Should run");
    assert_success(&first);
    assert!(temp.path().join("marker.txt").exists());
    assert!(temp.path().join("gen.txt").exists());

    // Refresh the prerequisite; the generated file must still be considered
    // up to date.
    fs::write(temp.path().join("marker.txt"), "newer").expect("Should rewrite marker");
    let second = run_kiln(temp.path(), &["gen.txt"]).expect("Should run");
    assert_success(&second);
    assert!(
        !stdout_of(&second).contains("cat marker.txt"),
        "prerequisite freshness must not trigger a rebuild"
    );
}

/// Test: -f reads rules from another makefile name.
#[test]
fn test_custom_makefile_flag() {
    let temp = tempfile::TempDir::new().expect("Should create temp dir");
    let yaml = r"
rules:
  - target: default
    phony: true
    commands: ['echo from build.yml']
";
    fs::write(temp.path().join("build.yml"), yaml).expect("Should write makefile");

    let output = run_kiln(temp.path(), &["-f", "build.yml"]).expect("Should run");
    assert_success(&output);
    assert!(stdout_of(&output).contains("from build.yml"));
}

/// Test: -C enters the directory before reading the makefile.
#[test]
fn test_entering_directory_flag() {
    let temp = tempfile::TempDir::new().expect("Should create temp dir");
    let project = temp.path().join("proj");
    fs::create_dir(&project).expect("Should create subdir");
    let yaml = r"
rules:
  - target: default
    phony: true
    commands: ['echo inside']
";
    fs::write(project.join("kiln.yml"), yaml).expect("Should write makefile");

    let output = run_kiln(temp.path(), &["-C", "proj"]).expect("Should run");
    assert_success(&output);
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Entering directory 'proj'"), "{stdout}");
    assert!(stdout.contains("inside"));
}
