//! End-to-end CLI tests for the bookfetch binary.

#![allow(deprecated)]

mod support;
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};
use support::{EMPTY_SEARCH_PAGE, HELLO_WORLD_MD5, mirror_page_html, search_page_html};

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bookfetch(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bookfetch").expect("binary built");
    cmd.env("XDG_CONFIG_HOME", config_home).env_remove("RUST_LOG");
    cmd
}

fn write_config(config_home: &Path, server_uri: &str) {
    let dir = config_home.join("bookfetch");
    std::fs::create_dir_all(&dir).expect("config dir");
    std::fs::write(
        dir.join("config.toml"),
        format!(
            "# test catalog\ncatalog_url = \"{server_uri}\"\nmirror_url = \"{server_uri}\"\nmax_pages = 5\n"
        ),
    )
    .expect("write config");
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page_html()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_SEARCH_PAGE))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/main/{HELLO_WORLD_MD5}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(mirror_page_html(&format!(
            "{}/get/dune.epub",
            server.uri()
        ))))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get/dune.epub"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
        .mount(server)
        .await;
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().expect("temp dir");
    bookfetch(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search a document catalog"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().expect("temp dir");
    bookfetch(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bookfetch"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().expect("temp dir");
    bookfetch(home.path())
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_without_search_terms_fails() {
    let home = TempDir::new().expect("temp dir");
    bookfetch(home.path())
        .arg("-e")
        .arg("epub")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to search for"));
}

#[test]
fn test_binary_rejects_invalid_config_value() {
    let home = TempDir::new().expect("temp dir");
    let dir = home.path().join("bookfetch");
    std::fs::create_dir_all(&dir).expect("config dir");
    std::fs::write(dir.join("config.toml"), "max_pages = 0\n").expect("write config");

    bookfetch(home.path())
        .arg("dune")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_pages"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_search_select_and_download_end_to_end() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_catalog(&mock_server).await;

    let home = TempDir::new().expect("temp dir");
    let output = TempDir::new().expect("temp dir");
    write_config(home.path(), &mock_server.uri());
    let cache_path = home.path().join("cache.sqlite3");

    let mut cmd = bookfetch(home.path());
    cmd.arg("dune")
        .args(["-e", "epub", "-q"])
        .arg("--cache-path")
        .arg(&cache_path)
        .arg("-o")
        .arg(output.path())
        .write_stdin("1\n1\n");
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .expect("join");

    assert
        .success()
        .stdout(predicate::str::contains("1) Dune"))
        .stdout(predicate::str::contains("Successful downloaded file"));

    let saved = output.path().join("Frank Herbert - Dune.epub");
    assert_eq!(std::fs::read(&saved).expect("saved file"), b"hello world");
    assert!(!output.path().join(".partial.Frank Herbert - Dune.epub").exists());
    assert!(cache_path.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_listing_prints_records_and_exits() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_catalog(&mock_server).await;

    let home = TempDir::new().expect("temp dir");
    write_config(home.path(), &mock_server.uri());

    let mut cmd = bookfetch(home.path());
    cmd.arg("dune")
        .arg("--json")
        .arg("--cache-path")
        .arg(home.path().join("cache.sqlite3"));
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("join")
        .expect("run");

    assert!(output.status.success());
    let records: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["digest"], HELLO_WORLD_MD5);
    assert_eq!(records[1]["extension"], "pdf");
}
