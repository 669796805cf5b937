//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn surveyrules() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("surveyrules").unwrap();
    cmd.env_remove("SURVEYRULES_FORMAT")
        .env_remove("SURVEYRULES_PRECISION");
    cmd
}

const AUDIT: &str = "../../assessments/supplier-audit.toml";
const AUDIT_RESPONSES: &str = "../../responses/supplier-audit.toml";
const AUDIT_RESPONSES_JSON: &str = "../../responses/supplier-audit.json";

const CYCLIC: &str = r#"
[assessment]
id = "loop"
name = "Loop"

[formulas.a]
op = "+"
left = "b"
right = "x"

[formulas.b]
op = "*"
left = "a"
right = "y"
"#;

#[test]
fn validate_valid_assessment() {
    surveyrules()
        .arg("validate")
        .arg("--assessment")
        .arg(AUDIT)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Supplier Audit (3 contingencies, 1 goals, 2 formulas)",
        ))
        .stdout(predicate::str::contains("All assessments valid"));
}

#[test]
fn validate_directory() {
    surveyrules()
        .arg("validate")
        .arg("--assessment")
        .arg("../../assessments")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supplier Audit"))
        .stdout(predicate::str::contains("Workplace Wellbeing"));
}

#[test]
fn validate_nonexistent_file() {
    surveyrules()
        .arg("validate")
        .arg("--assessment")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rejects_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loop.toml");
    std::fs::write(&path, CYCLIC).unwrap();

    surveyrules()
        .arg("validate")
        .arg("--assessment")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("formula cycle detected"))
        .stderr(predicate::str::contains("rejected"));
}

#[test]
fn validate_warnings_with_strict_config() {
    let dir = TempDir::new().unwrap();
    let assessment = dir.path().join("ops.toml");
    std::fs::write(
        &assessment,
        r#"
[assessment]
id = "ops"
name = "Ops"

[formulas.q3]
op = "%"
left = "q1"
right = "q2"
"#,
    )
    .unwrap();

    surveyrules()
        .arg("validate")
        .arg("--assessment")
        .arg(&assessment)
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown operator '%'"))
        .stdout(predicate::str::contains("1 warning(s) found"));

    let config = dir.path().join("strict.toml");
    std::fs::write(&config, "fail_on_warnings = true\n").unwrap();

    surveyrules()
        .arg("validate")
        .arg("--assessment")
        .arg(&assessment)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("fail_on_warnings"));
}

#[test]
fn expand_text() {
    surveyrules()
        .arg("expand")
        .arg("--assessment")
        .arg(AUDIT)
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden when q1 = no"))
        .stdout(predicate::str::contains("hidden when q2 = skip"))
        .stdout(predicate::str::contains("shown when q1 = yes"))
        .stdout(predicate::str::contains("ratio = ((q7 + q8) / q9)"));
}

#[test]
fn expand_json() {
    let output = surveyrules()
        .arg("expand")
        .arg("--assessment")
        .arg(AUDIT)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["assessment"], "supplier-audit");
    let q3 = &json["contingencies"]["q3"]["disabling_answer_values"];
    assert_eq!(q3["q1"], "no");
    assert_eq!(q3["q2"], "skip");
    assert!(json["formulas"]["ratio"].is_object());
}

#[test]
fn expand_rejects_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loop.toml");
    std::fs::write(&path, CYCLIC).unwrap();

    surveyrules()
        .arg("expand")
        .arg("--assessment")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("formula cycle detected"));
}

#[test]
fn evaluate_text() {
    surveyrules()
        .arg("evaluate")
        .arg("--assessment")
        .arg(AUDIT)
        .arg("--responses")
        .arg(AUDIT_RESPONSES)
        .assert()
        .success()
        .stdout(predicate::str::contains("Question"))
        .stdout(predicate::str::contains("8.00"))
        .stdout(predicate::str::contains("0.80"))
        .stdout(predicate::str::contains("1 hidden, 2 computed"));
}

#[test]
fn evaluate_json() {
    let output = surveyrules()
        .arg("evaluate")
        .arg("--assessment")
        .arg(AUDIT)
        .arg("--responses")
        .arg(AUDIT_RESPONSES_JSON)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["assessment_id"], "supplier-audit");
    assert!(json["evaluated_at"].is_string());
    for hidden in ["q2", "q3", "q4", "q5", "q6"] {
        assert_eq!(json["visibility"][hidden], false, "{hidden}");
    }
    assert_eq!(json["computed"]["total"], 8.0);
    assert_eq!(json["computed"]["ratio"], 0.0);
}

#[test]
fn evaluate_format_from_env() {
    let output = surveyrules()
        .env("SURVEYRULES_FORMAT", "json")
        .arg("evaluate")
        .arg("--assessment")
        .arg(AUDIT)
        .arg("--responses")
        .arg(AUDIT_RESPONSES)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["visibility"]["q4"], false);
    assert_eq!(json["visibility"]["q5"], true);
}

#[test]
fn evaluate_precision_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("surveyrules.toml");
    std::fs::write(&config, "precision = 4\n").unwrap();

    surveyrules()
        .arg("evaluate")
        .arg("--assessment")
        .arg(AUDIT)
        .arg("--responses")
        .arg(AUDIT_RESPONSES)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0.8000"));
}

#[test]
fn evaluate_unknown_format() {
    surveyrules()
        .arg("evaluate")
        .arg("--assessment")
        .arg(AUDIT)
        .arg("--responses")
        .arg(AUDIT_RESPONSES)
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    surveyrules()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created surveyrules.toml"))
        .stdout(predicate::str::contains("Created assessments/example.toml"))
        .stdout(predicate::str::contains("Created responses/example.toml"));

    assert!(dir.path().join("surveyrules.toml").exists());
    assert!(dir.path().join("assessments/example.toml").exists());

    // The generated starter files work end to end
    surveyrules()
        .current_dir(dir.path())
        .arg("evaluate")
        .arg("--assessment")
        .arg("assessments/example.toml")
        .arg("--responses")
        .arg("responses/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.80"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    surveyrules()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    surveyrules()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    surveyrules()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Assessment contingency and formula engine"));
}

#[test]
fn version_output() {
    surveyrules()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("surveyrules"));
}
