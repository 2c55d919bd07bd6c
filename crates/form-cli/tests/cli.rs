use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn form_cli() -> Command {
    Command::cargo_bin("form-cli").expect("binary")
}

#[test]
fn schema_prints_form_definition_schema() {
    form_cli()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("formElementGroups"));
}

#[test]
fn filter_prints_instances_for_visible_elements() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let statuses = temp.child("statuses.json");
    statuses
        .write_str(r#"[{"uuid":"fe-gender","visibility":true},{"uuid":"fe-age","visibility":false}]"#)
        .expect("write statuses");

    form_cli()
        .args(["filter", "--group", "feg-basic", "--statuses"])
        .arg(statuses.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fe-gender").and(predicate::str::contains("fe-age").not()));
}

#[test]
fn validate_fails_when_mandatory_answers_are_missing() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let statuses = temp.child("statuses.json");
    statuses
        .write_str(r#"[{"uuid":"fe-name","visibility":true}]"#)
        .expect("write statuses");

    form_cli()
        .args(["validate", "--group", "feg-basic", "--statuses"])
        .arg(statuses.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("fe-name: mandatory"))
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn validate_passes_with_recorded_answers() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let statuses = temp.child("statuses.json");
    statuses
        .write_str(r#"[{"uuid":"fe-name","visibility":true},{"uuid":"fe-age","visibility":true}]"#)
        .expect("write statuses");
    let observations = temp.child("observations.json");
    observations
        .write_str(
            r#"[{"conceptUuid":"c-name","value":{"primitive":"Lakshmi"}},{"conceptUuid":"c-age","value":{"primitive":34}}]"#,
        )
        .expect("write observations");

    form_cli()
        .args(["validate", "--format", "json", "--statuses"])
        .arg(statuses.path())
        .arg("--observations")
        .arg(observations.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn unknown_group_is_an_error() {
    form_cli()
        .args(["describe", "--group", "feg-missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not available"));
}

#[test]
fn navigate_reports_sibling_groups() {
    form_cli()
        .args(["navigate", "--group", "feg-basic"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"first\": true")
                .and(predicate::str::contains("\"next\": \"feg-household\"")),
        );
}
