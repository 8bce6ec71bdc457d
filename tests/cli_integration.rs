//! CLI integration tests for babcheck
//!
//! These tests drive the binary against real babfile trees on disk,
//! covering resolution across includes, validation classifications and
//! the machine-readable output.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the babcheck binary
fn babcheck_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("babcheck"))
}

fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Root with tasks {build, test}, test depending on build.
fn setup_simple() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  build:
    desc: Compile everything
    run:
      - cmd: cargo build
  test:
    deps:
      - build
    run:
      - cmd: cargo test
"#,
    );
    dir
}

/// Root including utils -> babfile with task lint.
fn setup_with_include() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
includes:
  utils:
    babfile: ./utils/babfile.yml
tasks:
  build:
    run:
      - cmd: make
"#,
    );
    write_file(
        dir.path(),
        "utils/babfile.yml",
        r#"
tasks:
  lint:
    desc: Run the linters
    run:
      - cmd: lint
"#,
    );
    dir
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_resolve_local_task() {
    let dir = setup_simple();

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["resolve", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("Compile everything"));
}

#[test]
fn test_resolve_across_include() {
    let dir = setup_with_include();

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["resolve", "utils:lint"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lint"))
        .stdout(predicate::str::contains("utils"));
}

#[test]
fn test_resolve_missing_task_fails() {
    let dir = setup_simple();

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["resolve", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unresolved task reference"));
}

#[test]
fn test_resolve_through_missing_include_fails() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
includes:
  nope:
    babfile: ./missing/babfile.yml
tasks:
  build:
    run:
      - cmd: make
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["resolve", "nope:anything"])
        .assert()
        .failure();
}

#[test]
fn test_resolve_json_output() {
    let dir = setup_with_include();

    let output = babcheck_cmd()
        .current_dir(dir.path())
        .args(["resolve", "utils:lint", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["name"], "lint");
    assert_eq!(json["description"], "Run the linters");
    assert!(json["origin"].as_str().unwrap().ends_with("babfile.yml"));
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_shows_qualified_names() {
    let dir = setup_with_include();

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("utils:lint"))
        .stdout(predicate::str::contains("2 task(s)"));
}

#[test]
fn test_list_json_every_name_resolves() {
    let dir = setup_with_include();

    let output = babcheck_cmd()
        .current_dir(dir.path())
        .args(["list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();

    // Round-trip: everything the catalog offers must resolve.
    for entry in &entries {
        let name = entry["name"].as_str().unwrap();
        babcheck_cmd()
            .current_dir(dir.path())
            .args(["resolve", name])
            .assert()
            .success();
    }
}

#[test]
fn test_tree_shows_include_structure() {
    let dir = setup_with_include();

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("utils (./utils/babfile.yml)"))
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn test_tree_marks_unresolved_include() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        "includes:\n  nope:\n    babfile: ./missing/babfile.yml\ntasks:\n  build:\n",
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("[unresolved]"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validate_clean_configuration() {
    let dir = setup_simple();

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_validate_self_dependency() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  circular:
    deps:
      - circular
    run:
      - cmd: echo loop
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("task depends on itself"))
        .stdout(predicate::str::contains("1 issue(s) found"));
}

#[test]
fn test_validate_unresolved_reference() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  build:
    deps:
      - missing
    run:
      - cmd: make
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unresolved task reference"))
        .stdout(predicate::str::contains("'missing'"));
}

#[test]
fn test_validate_unresolved_include() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
includes:
  nope:
    babfile: ./missing/babfile.yml
tasks:
  build:
    deps:
      - nope:anything
    run:
      - cmd: make
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unresolved include"));
}

#[test]
fn test_validate_include_cycle_reports_cleanly() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
includes:
  sub:
    babfile: ./sub/babfile.yml
tasks:
  build:
    run:
      - cmd: make
"#,
    );
    write_file(
        dir.path(),
        "sub/babfile.yml",
        r#"
includes:
  back:
    babfile: ../babfile.yml
tasks:
  inner:
    run:
      - cmd: echo inner
"#,
    );

    // Terminates, and both files' own tasks are present exactly once.
    babcheck_cmd()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("sub:inner"))
        .stdout(predicate::str::contains("2 task(s)"));
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  build:
    deps:
      - missing
"#,
    );

    let output = babcheck_cmd()
        .current_dir(dir.path())
        .args(["validate", "--format", "json"])
        .assert()
        .failure();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let issues: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["task"], "build");
    assert_eq!(issues[0]["reference"], "missing");
    assert_eq!(issues[0]["status"], "unresolved_reference");
    assert_eq!(issues[0]["kind"], "dep");
}

#[test]
fn test_validate_run_task_reference() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  main:
    run:
      - cmd: echo start
      - task: ghost
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("run.task"));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_order_lists_dependencies_first() {
    let dir = setup_simple();

    let output = babcheck_cmd()
        .current_dir(dir.path())
        .args(["order", "test"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["build", "test"]);
}

#[test]
fn test_order_crosses_includes() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
includes:
  utils:
    babfile: ./utils/babfile.yml
tasks:
  check:
    deps:
      - utils:lint
"#,
    );
    write_file(
        dir.path(),
        "utils/babfile.yml",
        r#"
tasks:
  lint:
    deps:
      - fmt
  fmt:
    run:
      - cmd: fmt
"#,
    );

    let output = babcheck_cmd()
        .current_dir(dir.path())
        .args(["order", "check", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let order: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(order, vec!["utils:fmt", "utils:lint", "check"]);
}

#[test]
fn test_order_unknown_task_fails() {
    let dir = setup_simple();

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["order", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found"));
}

#[test]
fn test_order_dependency_cycle_fails() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  a:
    deps:
      - b
  b:
    deps:
      - a
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["order", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle"));
}

// =============================================================================
// Workspace discovery
// =============================================================================

#[test]
fn test_discovery_walks_up_from_subdirectory() {
    let dir = setup_simple();
    let nested = dir.path().join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();

    babcheck_cmd()
        .current_dir(&nested)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_explicit_babfile_flag() {
    let dir = setup_simple();
    let elsewhere = TempDir::new().unwrap();

    babcheck_cmd()
        .current_dir(elsewhere.path())
        .args(["--babfile"])
        .arg(dir.path().join("babfile.yml"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_no_babfile_anywhere_fails() {
    let dir = TempDir::new().unwrap();

    babcheck_cmd()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No babfile found"));
}

#[test]
fn test_duplicate_task_keys_last_definition_wins() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "babfile.yml",
        r#"
tasks:
  build:
    desc: first
  build:
    desc: second
"#,
    );

    babcheck_cmd()
        .current_dir(dir.path())
        .args(["resolve", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("second"))
        .stdout(predicate::str::contains("first").not());
}
