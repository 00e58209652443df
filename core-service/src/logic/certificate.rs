//! Certificate Validator
//!
//! Probes the host's TLS endpoint on port 443. The answer is a plain bool:
//! true only when the handshake completed (trusted chain, matching name) and
//! the peer presented a certificate. Nothing here returns an error.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector;

use crate::constants::HTTPS_PORT;
use crate::logic::features::ParsedUrl;

#[derive(Clone)]
pub struct CertificateValidator {
    timeout: Duration,
    port: u16,
    connector: Option<TlsConnector>,
}

impl std::fmt::Debug for CertificateValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateValidator")
            .field("timeout", &self.timeout)
            .field("port", &self.port)
            .field("tls_available", &self.connector.is_some())
            .finish()
    }
}

impl CertificateValidator {
    pub fn new(timeout: Duration) -> Self {
        let connector = match native_tls::TlsConnector::new() {
            Ok(connector) => Some(TlsConnector::from(connector)),
            Err(e) => {
                log::warn!("TLS backend unavailable, certificate checks disabled: {}", e);
                None
            }
        };

        Self {
            timeout,
            port: HTTPS_PORT,
            connector,
        }
    }

    /// Probe a port other than 443
    #[cfg(test)]
    pub(crate) fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parse, then probe. Unparseable URLs are simply invalid.
    pub async fn validate(&self, url: &str) -> bool {
        match ParsedUrl::parse(url) {
            Ok(parsed) => self.validate_parsed(&parsed).await,
            Err(e) => {
                log::debug!("Certificate check skipped: {}", e);
                false
            }
        }
    }

    pub async fn validate_parsed(&self, parsed: &ParsedUrl) -> bool {
        if !parsed.is_https() {
            return false;
        }

        let Some(connector) = &self.connector else {
            return false;
        };

        let host = parsed.host();
        match tokio::time::timeout(self.timeout, probe(connector, host, self.port)).await {
            Ok(Ok(has_certificate)) => has_certificate,
            Ok(Err(e)) => {
                log::debug!("TLS handshake with {} failed: {}", host, e);
                false
            }
            Err(_) => {
                log::debug!("TLS handshake with {} timed out after {:?}", host, self.timeout);
                false
            }
        }
    }
}

async fn probe(
    connector: &TlsConnector,
    host: &str,
    port: u16,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let stream = TcpStream::connect((host, port)).await?;
    let tls = connector.connect(host, stream).await?;
    let certificate = tls.get_ref().peer_certificate()?;
    Ok(certificate.is_some())
}
