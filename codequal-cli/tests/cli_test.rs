//! End-to-end tests for the `codequal` binary
//!
//! Every run gets an isolated config home and working directory. Services
//! are served by httpmock, models are trained in-test and saved as JSON.

use assert_cmd::Command;
use codequal::classifier::{train_gbdt, SMELL_FEATURE_COUNT};
use httpmock::Method::POST;
use httpmock::MockServer;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const SOURCE: &str = r#"class Order:
    def total(self, items):
        result = 0
        for item in items:
            if item.price > 0:
                result += item.price
        return result


def run(order):
    return order.total([])
"#;

const ENV_OVERRIDES: [&str; 9] = [
    "CODEQUAL_CONFIG",
    "CODEQUAL_LARGE_CLASS_MODEL",
    "CODEQUAL_LONG_METHOD_MODEL",
    "CODEQUAL_GENERAL_MODEL",
    "PINECONE_API_KEY",
    "PINECONE_INDEX_HOST",
    "CODEQUAL_EMBEDDING_URL",
    "CODEQUAL_EMBEDDING_MODEL",
    "CODEQUAL_EMBEDDING_API_KEY",
];

fn codequal(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_codequal"));
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    for name in ENV_OVERRIDES {
        cmd.env_remove(name);
    }
    cmd
}

fn write_source(dir: &Path) -> PathBuf {
    let path = dir.join("orders.py");
    std::fs::write(&path, SOURCE).unwrap();
    path
}

/// Smell model separating on the first feature (total lines)
fn write_smell_model(path: &Path) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..20 {
        let mut small = vec![0.0; SMELL_FEATURE_COUNT];
        small[0] = i as f64;
        rows.push(small);
        labels.push(-1.0);

        let mut large = vec![0.0; SMELL_FEATURE_COUNT];
        large[0] = 1000.0 + i as f64;
        rows.push(large);
        labels.push(1.0);
    }
    train_gbdt(&rows, &labels, 5, 2, 0.3)
        .unwrap()
        .save(path)
        .unwrap();
}

/// Every entity name in SOURCE is a single dictionary word, so each
/// embedding request carries exactly one input
fn mock_services(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200)
            .json_body(json!({"data": [{"index": 0, "embedding": [1.0, 0.0]}]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/query").header("Api-Key", "test-key");
        then.status(200)
            .json_body(json!({"matches": [{"id": "word", "score": 0.97}]}));
    });
}

fn write_config(dir: &Path, server: &MockServer) -> PathBuf {
    let lc = dir.join("large_class.json");
    let lm = dir.join("long_method.json");
    write_smell_model(&lc);
    write_smell_model(&lm);

    let config = format!(
        r#"[models]
large_class = "{}"
long_method = "{}"

[naming]
index_host = "{}"
api_key = "test-key"
embedding_url = "{}"
"#,
        lc.display(),
        lm.display(),
        server.base_url(),
        server.url("/embeddings"),
    );
    let path = dir.join("codequal-test.toml");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn test_metrics_command_prints_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());

    let output = codequal(dir.path())
        .arg("metrics")
        .arg(&source)
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    let names: Vec<&str> = records
        .iter()
        .map(|r| r["entity_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Order", "total", "run"]);
    assert_eq!(records[0]["kind"], "class");
    assert_eq!(records[1]["start_line"], 2);
    assert!(records[1]["metrics"]["maintainability"].as_f64().unwrap() > 0.0);
    assert!(records[1]["metrics"]["complexity"].as_f64().unwrap() >= 3.0);
}

#[test]
fn test_metrics_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    codequal(dir.path())
        .args(["metrics", "missing.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_metrics_syntax_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.py");
    std::fs::write(&path, "def broken(:\n    pass\n").unwrap();

    codequal(dir.path())
        .arg("metrics")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Syntax error at line 1"));
}

#[test]
fn test_check_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_services(&server);
    let config = write_config(dir.path(), &server);
    let source = write_source(dir.path());

    codequal(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: Order\n-----------------------\n"))
        .stdout(predicate::str::contains("Entity type:            class"))
        .stdout(predicate::str::contains("Name: total"))
        .stdout(predicate::str::contains("Name: run"))
        .stdout(predicate::str::contains("Naming score:           10/10"))
        .stdout(predicate::str::contains("Smell Found:"));
}

#[test]
fn test_check_json_report_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_services(&server);
    let config = write_config(dir.path(), &server);
    let source = write_source(dir.path());
    let out = dir.path().join("scores.json");

    codequal(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&source)
        .args(["--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();

    let reports: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let results = reports[0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    for result in results {
        assert_eq!(result["name_score"], 10);
        let mi = result["maintainability"].as_f64().unwrap();
        let smell = if result["smell"] == "No" { 0.0 } else { 0.2 };
        let expected = ((mi * 0.08 + 2.0 - smell) * 10.0).round_ties_even() / 10.0;
        assert_eq!(result["general_score"].as_f64().unwrap(), expected);
    }
}

#[test]
fn test_check_env_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_services(&server);
    let config = write_config(dir.path(), &server);
    let source = write_source(dir.path());

    codequal(dir.path())
        .env("PINECONE_API_KEY", "wrong-key")
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Scoring failed"));
}

#[test]
fn test_check_without_models_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());

    codequal(dir.path())
        .arg("check")
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No large_class model configured"));
}

#[test]
fn test_check_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());

    codequal(dir.path())
        .args(["--config", "nope.toml", "check"])
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_project_config_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("codequal.toml"),
        "[naming]\nindex_host = \"words.svc.pinecone.io\"\napi_key = \"pcsk_0123456789\"\n",
    )
    .unwrap();

    codequal(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("words.svc.pinecone.io"))
        .stdout(predicate::str::contains("pcsk****"))
        .stdout(predicate::str::contains("0123456789").not());
}

#[test]
fn test_config_init_writes_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("codequal.toml");

    codequal(dir.path())
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[models]"));
    assert!(written.contains("similarity_threshold"));
}

#[test]
fn test_vocabulary_upload_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let embeddings = server.mock(|when, then| {
        when.method(POST)
            .path("/embeddings")
            .json_body(json!({"model": "intfloat/e5-small-v2", "input": ["order", "total"]}));
        then.status(200).json_body(json!({"data": [
            {"index": 0, "embedding": [1.0, 0.0]},
            {"index": 1, "embedding": [0.0, 1.0]}
        ]}));
    });
    let upsert = server.mock(|when, then| {
        when.method(POST).path("/vectors/upsert");
        then.status(200).json_body(json!({"upsertedCount": 2}));
    });
    let delete = server.mock(|when, then| {
        when.method(POST)
            .path("/vectors/delete")
            .json_body(json!({"ids": ["order", "total"]}));
        then.status(200).json_body(json!({}));
    });

    let dataset = dir.path().join("words.csv");
    std::fs::write(&dataset, "order;120\ntotal;80\norder;10\n").unwrap();

    codequal(dir.path())
        .env("PINECONE_INDEX_HOST", server.base_url())
        .env("PINECONE_API_KEY", "test-key")
        .env("CODEQUAL_EMBEDDING_URL", server.url("/embeddings"))
        .args(["vocabulary", "upload", "--dataset"])
        .arg(&dataset)
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded 2/2 words in 1 batches"));

    embeddings.assert();
    upsert.assert();
    let handled = std::fs::read_to_string(dir.path().join("handled_words.csv")).unwrap();
    assert_eq!(handled, "order\ntotal\n");

    codequal(dir.path())
        .env("PINECONE_INDEX_HOST", server.base_url())
        .env("PINECONE_API_KEY", "test-key")
        .args(["vocabulary", "delete", "--dataset"])
        .arg(&dataset)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 words"));
    delete.assert();
}

#[test]
fn test_vocabulary_upload_failed_batch_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(500).body("down");
    });

    let dataset = dir.path().join("words.csv");
    std::fs::write(&dataset, "order;120\n").unwrap();

    codequal(dir.path())
        .env("PINECONE_INDEX_HOST", server.base_url())
        .env("PINECONE_API_KEY", "test-key")
        .env("CODEQUAL_EMBEDDING_URL", server.url("/embeddings"))
        .args(["vocabulary", "upload", "--dataset"])
        .arg(&dataset)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 words in 1 failed batches"));

    let not_handled = std::fs::read_to_string(dir.path().join("non_handled_words.csv")).unwrap();
    assert_eq!(not_handled, "order\n");
}
