//! Integration tests for verified downloads over HTTP.
//!
//! These tests stream real responses from a mock server through
//! `HttpClient::open_stream` into `VerifiedStreamDownloader`.

mod support;
use support::HELLO_WORLD_MD5;
use support::socket_guard::{
    should_skip_socket_bound_test, socket_skip_return, start_mock_server_or_skip,
};

use bookfetch_core::download::{
    DownloadError, NoProgress, SessionState, TransferProgress, VerifiedStreamDownloader,
};
use bookfetch_core::{FetchError, HttpClient};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn dir_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_download_commits_verified_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    Mock::given(method("GET"))
        .and(path("/get/dune.epub"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("Frank Herbert - Dune.epub");

    let client = HttpClient::new();
    let body = client
        .open_stream(&format!("{}/get/dune.epub", mock_server.uri()))
        .await
        .expect("stream should open");
    let total = body.content_length();
    assert_eq!(total, Some(11));

    let mut session =
        VerifiedStreamDownloader::new(&destination, HELLO_WORLD_MD5).expect("valid digest");
    let mut last = None;
    let mut observer = |p: &TransferProgress| last = Some(*p);
    let report = session
        .run(body.into_stream(), total, &mut observer)
        .await
        .expect("download should commit");

    assert_eq!(session.state(), SessionState::Committed);
    assert_eq!(report.bytes, 11);
    assert_eq!(std::fs::read(&destination).expect("read"), b"hello world");
    assert_eq!(dir_names(temp_dir.path()), vec!["Frank Herbert - Dune.epub"]);

    let last = last.expect("at least one progress report");
    assert_eq!(last.bytes_transferred, 11);
    assert_eq!(last.percent, Some(100));
}

#[tokio::test]
async fn test_download_tampered_body_is_rejected() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    Mock::given(method("GET"))
        .and(path("/get/dune.epub"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello w0rld".to_vec()))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("dune.epub");

    let body = HttpClient::new()
        .open_stream(&format!("{}/get/dune.epub", mock_server.uri()))
        .await
        .expect("stream should open");
    let total = body.content_length();
    let mut session =
        VerifiedStreamDownloader::new(&destination, HELLO_WORLD_MD5).expect("valid digest");
    let err = session
        .run(body.into_stream(), total, &mut NoProgress)
        .await
        .expect_err("tampered body must be rejected");

    assert!(err.is_integrity_failure(), "got {err:?}");
    assert_eq!(session.state(), SessionState::Rejected);
    assert!(!destination.exists());
    assert_eq!(dir_names(temp_dir.path()), vec![".partial.dune.epub"]);
    if let DownloadError::ChecksumMismatch {
        expected, actual, ..
    } = err
    {
        assert_eq!(expected, HELLO_WORLD_MD5);
        assert_ne!(actual, expected);
    }
}

#[tokio::test]
async fn test_download_error_status_never_reaches_disk() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    Mock::given(method("GET"))
        .and(path("/get/missing.epub"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let result = HttpClient::new()
        .open_stream(&format!("{}/get/missing.epub", mock_server.uri()))
        .await;

    match result {
        Err(FetchError::HttpStatus { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected HttpStatus error, got {other:?}"),
    }
    assert!(dir_names(temp_dir.path()).is_empty());
}

/// Serves one response that promises `declared` bytes but sends only `body`.
async fn serve_truncated_body(declared: usize, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/epub+zip\r\nContent-Length: {declared}\r\n\r\n"
        );
        socket.write_all(head.as_bytes()).await.expect("write head");
        socket.write_all(body).await.expect("write body");
        socket.flush().await.expect("flush");
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/get/dune.epub")
}

#[tokio::test]
async fn test_download_connection_dropped_mid_body_aborts() {
    if should_skip_socket_bound_test() {
        return;
    }
    let url = serve_truncated_body(1000, b"hello world").await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("dune.epub");
    let body = HttpClient::new()
        .open_stream(&url)
        .await
        .expect("headers should arrive");
    let total = body.content_length();
    assert_eq!(total, Some(1000));

    let mut session =
        VerifiedStreamDownloader::new(&destination, HELLO_WORLD_MD5).expect("valid digest");
    let err = session
        .run(body.into_stream(), total, &mut NoProgress)
        .await
        .expect_err("short body must abort");

    assert!(matches!(err, DownloadError::StreamRead { .. }), "got {err:?}");
    assert!(!err.is_integrity_failure());
    assert_eq!(session.state(), SessionState::Aborted);
    assert!(!destination.exists());
    assert_eq!(dir_names(temp_dir.path()), vec![".partial.dune.epub"]);

    let staged = std::fs::read(session.staging_path()).expect("staging kept");
    assert_eq!(Some(staged.len() as u64), err.bytes_transferred());
    assert!(b"hello world".starts_with(&staged));
}

#[tokio::test]
async fn test_download_large_body_in_many_chunks() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    let content: Vec<u8> = (0..512 * 1024).map(|i| (i % 251) as u8).collect();
    let digest = {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(&content))
    };
    Mock::given(method("GET"))
        .and(path("/big.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("big.pdf");
    let body = HttpClient::new()
        .open_stream(&format!("{}/big.pdf", mock_server.uri()))
        .await
        .expect("stream should open");
    let total = body.content_length();

    let mut reports = 0usize;
    let mut observer = |_: &TransferProgress| reports += 1;
    let mut session = VerifiedStreamDownloader::new(&destination, &digest).expect("valid digest");
    let report = session
        .run(body.into_stream(), total, &mut observer)
        .await
        .expect("download should commit");

    assert_eq!(report.bytes, content.len() as u64);
    assert_eq!(report.digest, digest);
    assert!(reports >= 1);
    assert_eq!(std::fs::read(&destination).expect("read"), content);
}
