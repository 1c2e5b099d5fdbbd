//! Integration tests for the HTTP server.
//!
//! Servers are spun up on ephemeral ports with the same acceptor stack the
//! binary uses; reqwest drives them over real sockets. TLS fixtures live in
//! tests/testdata (a test CA plus server and client certificates it signed).

use std::net::SocketAddr;
use std::time::Duration;

use axum_server::accept::DefaultAcceptor;
use axum_server::tls_rustls::RustlsAcceptor;
use axum_server::Handle;
use tokio::task::JoinHandle;

use okserver::config::{Args, ServerConfig, TlsPaths, DEFAULT_LISTEN_ADDR};
use okserver::http::conn::ConnLogAcceptor;
use okserver::http::tls::build_tls_config;
use okserver::routes::create_router;

const CA_PEM: &str = include_str!("testdata/ca.pem");
const CLIENT_PEM: &str = include_str!("testdata/client.pem");
const CLIENT_KEY: &str = include_str!("testdata/client.key");

fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

fn test_config(tls: Option<TlsPaths>) -> ServerConfig {
    let mut config = ServerConfig::from_args(&Args {
        listen: DEFAULT_LISTEN_ADDR.to_string(),
        ca_cert: None,
        server_cert: None,
        server_key: None,
        log_level: None,
    });
    config.tls = tls;
    config
}

async fn start_plaintext() -> (SocketAddr, Handle, JoinHandle<std::io::Result<()>>) {
    install_crypto_provider();

    let config = test_config(None);
    let app = create_router(&config);
    let handle = Handle::new();

    let server = axum_server::bind("127.0.0.1:0".parse().unwrap())
        .handle(handle.clone())
        .acceptor(ConnLogAcceptor::new(DefaultAcceptor::new()));
    let task = tokio::spawn(
        server.serve(app.into_make_service_with_connect_info::<SocketAddr>()),
    );

    let addr = handle.listening().await.expect("server failed to bind");
    (addr, handle, task)
}

fn testdata(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata")
        .join(name)
}

async fn start_mtls() -> (SocketAddr, Handle) {
    install_crypto_provider();

    let paths = TlsPaths {
        ca_cert: testdata("ca.pem"),
        server_cert: testdata("server.pem"),
        server_key: testdata("server.key"),
    };
    let config = test_config(Some(paths.clone()));
    let app = create_router(&config);
    let handle = Handle::new();

    let rustls_config = build_tls_config(&paths).expect("TLS fixtures must load");
    let server = axum_server::bind("127.0.0.1:0".parse().unwrap())
        .handle(handle.clone())
        .acceptor(ConnLogAcceptor::new(RustlsAcceptor::new(rustls_config)));
    let _task = tokio::spawn(server.serve(app.into_make_service_with_connect_info::<SocketAddr>()));

    let addr = handle.listening().await.expect("server failed to bind");
    (addr, handle)
}

#[tokio::test]
async fn get_and_post_answer_ok() {
    let (addr, _handle, _task) = start_plaintext().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK\n");

    let response = client
        .post(format!("http://{addr}/"))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK\n");
}

#[tokio::test]
async fn repeated_requests_are_idempotent() {
    let (addr, _handle, _task) = start_plaintext().await;
    let client = reqwest::Client::new();

    for _ in 0..5 {
        let response = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "OK\n");
    }
}

#[tokio::test]
async fn missing_request_id_is_generated() {
    let (addr, _handle, _task) = start_plaintext().await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();

    let id = response
        .headers()
        .get("x-request-id")
        .expect("response must carry a request ID")
        .to_str()
        .unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn supplied_request_id_is_echoed() {
    let (addr, _handle, _task) = start_plaintext().await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .header("x-request-id", "integration-7")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "integration-7"
    );
}

#[tokio::test]
async fn graceful_shutdown_drains_and_stops() {
    let (addr, handle, task) = start_plaintext().await;

    // One request through, so the client holds a kept-alive connection
    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    handle.graceful_shutdown(None);

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("serve should return once connections drain")
        .unwrap();
    assert!(result.is_ok());

    // A fresh client can no longer connect
    let late = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .timeout(Duration::from_secs(1))
        .send()
        .await;
    assert!(late.is_err());
}

#[tokio::test]
async fn client_certificate_is_required() {
    let (addr, _handle) = start_mtls().await;

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap();

    // No client certificate: rejected during the handshake
    let result = client.get(format!("https://{addr}/")).send().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn client_certificate_signed_by_ca_is_accepted() {
    let (addr, _handle) = start_mtls().await;

    let identity_pem = format!("{CLIENT_PEM}{CLIENT_KEY}");
    let identity = reqwest::Identity::from_pem(identity_pem.as_bytes()).unwrap();
    let ca = reqwest::Certificate::from_pem(CA_PEM.as_bytes()).unwrap();

    let client = reqwest::Client::builder()
        .identity(identity)
        .add_root_certificate(ca)
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap();

    let response = client
        .get(format!("https://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("x-request-id").is_some());
    assert_eq!(response.text().await.unwrap(), "OK\n");
}
