//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Certificate file not found: {0}")]
    CertNotFound(String),

    #[error("Private key file not found: {0}")]
    KeyNotFound(String),

    #[error("No certificates in {0}")]
    NoCertificates(String),

    #[error("No private key in {0}")]
    NoPrivateKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Count the PEM certificates in `path`.
pub fn count_certificates(path: &Path) -> Result<usize, TlsError> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    Ok(certs.len())
}

/// True if `path` holds a PEM private key.
pub fn has_private_key(path: &Path) -> Result<bool, TlsError> {
    let mut reader = BufReader::new(File::open(path)?);
    Ok(rustls_pemfile::private_key(&mut reader)?.is_some())
}

/// Load TLS configuration from certificate and key files.
///
/// The files are checked up front so a bad path or an empty PEM fails
/// with a readable error rather than a rustls one.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&tls.cert_path);
    let key_path = Path::new(&tls.key_path);

    if !cert_path.exists() {
        return Err(TlsError::CertNotFound(tls.cert_path.clone()));
    }
    if !key_path.exists() {
        return Err(TlsError::KeyNotFound(tls.key_path.clone()));
    }
    if count_certificates(cert_path)? == 0 {
        return Err(TlsError::NoCertificates(tls.cert_path.clone()));
    }
    if !has_private_key(key_path)? {
        return Err(TlsError::NoPrivateKey(tls.key_path.clone()));
    }

    tracing::info!(cert = %tls.cert_path, "Loading TLS certificate");
    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}
