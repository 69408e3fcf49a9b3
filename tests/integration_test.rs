use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use tempdir::TempDir;

#[test]
fn test_parse_file_to_json() {
    let temp_dir = TempDir::new("restxml_test").expect("Failed to create temp dir");
    let path = temp_dir.path().join("results.xml");
    let mut file = File::create(&path).expect("Failed to create results.xml");
    write!(
        file,
        r#"<?xml version="1.0"?>
<!DOCTYPE results [
  <!ENTITY long "SOME_SUPER_LONG_STRING">
]>
<results>
    <result>My para</result>
    <result>Ampersand &amp; is retained and not double encoded</result>
    <total>2</total>
</results>"#
    )
    .expect("Failed to write results.xml");

    let mut cmd = Command::cargo_bin("restxml").expect("Failed to build restxml");
    let output = cmd
        .arg("parse")
        .arg(path.to_str().unwrap())
        .output()
        .expect("Failed to execute restxml");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output is not JSON");
    assert_eq!(
        json,
        serde_json::json!({
            "result": ["My para", "Ampersand & is retained and not double encoded"],
            "total": "2"
        })
    );
}

#[test]
fn test_parse_stdin_rejects_entities() {
    let input = r#"<?xml version="1.0"?>
<!DOCTYPE results [<!ENTITY long "SOME_SUPER_LONG_STRING">]>
<results><result>&long;&long;&long;</result></results>"#;

    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .arg("parse")
        .write_stdin(input)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "[restxml] Error: String could not be parsed as XML",
        ));
}

#[test]
fn test_parse_missing_file() {
    let temp_dir = TempDir::new("restxml_test").expect("Failed to create temp dir");
    let path = temp_dir.path().join("missing.xml");

    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .arg("parse")
        .arg(path.to_str().unwrap())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot read"));
}

#[test]
fn test_parse_invalid_utf8_file() {
    let temp_dir = TempDir::new("restxml_test").expect("Failed to create temp dir");
    let path = temp_dir.path().join("latin1.xml");
    let mut file = File::create(&path).expect("Failed to create latin1.xml");
    file.write_all(b"<results><result>caf\xE9</result></results>")
        .expect("Failed to write latin1.xml");

    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .arg("parse")
        .arg(path.to_str().unwrap())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "[restxml] Error: String could not be parsed as XML",
        ));
}

#[test]
fn test_render_record() {
    let expected = r#"<Example-Type href="http://localhost/api/v1/Example-Type/1.xml"><ID>1</ID></Example-Type>"#;

    for extra in [None, Some("--trailing-slash")] {
        let mut cmd = Command::cargo_bin("restxml").expect("Failed to build restxml");
        cmd.args(["render", "--type", "Example-Type", "--id", "1"]);
        if let Some(flag) = extra {
            cmd.arg(flag);
        }
        let output = cmd.output().expect("Failed to execute restxml");
        assert!(output.status.success());
        let xml = String::from_utf8_lossy(&output.stdout).replace(['\n', '\r'], "");
        assert_eq!(xml, expected);
    }
}

#[test]
fn test_render_with_header_fields_and_relation() {
    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .args([
            "render",
            "--type",
            "App\\Model\\Page",
            "--id",
            "3",
            "--base-url",
            "https://example.com/api/v1",
            "--field",
            "Title=Fish & Chips",
            "--has-one",
            "Author=App\\Security\\Member:7",
            "--header",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        ))
        .stdout(predicate::str::contains(
            r#"<App-Model-Page href="https://example.com/api/v1/App-Model-Page/3.xml">"#,
        ))
        .stdout(predicate::str::contains("<Title>Fish &amp; Chips</Title>"))
        .stdout(predicate::str::contains(
            r#"<Author linktype="has_one" href="https://example.com/api/v1/App-Security-Member/7.xml" id="7"></Author>"#,
        ));
}

#[test]
fn test_render_rejects_bad_field() {
    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .args(["render", "--type", "Page", "--id", "1", "--field", "NoValue"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn test_render_rejects_bad_base_url() {
    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .args(["render", "--type", "Page", "--id", "1", "--base-url", "api/v1/"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid base URL"));
}

#[test]
fn test_render_encodes_string_id() {
    Command::cargo_bin("restxml")
        .expect("Failed to build restxml")
        .args(["render", "--type", "Page", "--id", "a/b?c"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"href="http://localhost/api/v1/Page/a%2Fb%3Fc.xml""#,
        ));
}
