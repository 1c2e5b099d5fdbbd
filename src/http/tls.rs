//! Mutual-TLS configuration.
//!
//! Builds a rustls server config from the three PEM files named in
//! [`TlsPaths`]: the server certificate chain, its private key, and a CA
//! bundle used to verify client certificates. Clients that do not present a
//! certificate signed by the CA are rejected during the handshake.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use crate::config::TlsPaths;

/// TLS setup error
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(String),

    #[error("no private key found in {0}")]
    NoPrivateKey(String),

    #[error("invalid CA certificate in {path}: {source}")]
    InvalidCa {
        path: String,
        source: rustls::Error,
    },

    #[error("failed to build client certificate verifier: {0}")]
    Verifier(#[from] rustls::server::VerifierBuilderError),

    #[error("invalid certificate/key pair: {0}")]
    KeyPair(#[from] rustls::Error),
}

/// Build the server TLS configuration with client-certificate verification.
pub fn build_tls_config(paths: &TlsPaths) -> Result<RustlsConfig, TlsError> {
    let certs = load_certs(&paths.server_cert)?;
    let key = load_private_key(&paths.server_key)?;
    let ca_certs = load_certs(&paths.ca_cert)?;

    let mut roots = RootCertStore::empty();
    for cert in ca_certs {
        roots.add(cert).map_err(|source| TlsError::InvalidCa {
            path: paths.ca_cert.display().to_string(),
            source,
        })?;
    }

    let verifier = WebPkiClientVerifier::builder(Arc::new(roots)).build()?;

    let mut config = ServerConfig::builder()
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(Arc::new(config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let read_error = |source| TlsError::Read {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.display().to_string()));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let read_error = |source| TlsError::Read {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(read_error)?
        .ok_or_else(|| TlsError::NoPrivateKey(path.display().to_string()))
}
