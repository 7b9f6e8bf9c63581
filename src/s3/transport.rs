//! HTTPS transport that skips server certificate verification
//!
//! Used only for profiles that opt out of certificate trust checks. The
//! connection is still encrypted; plain HTTP is refused by the connector.

use std::sync::Arc;
use std::time::SystemTime;

use aws_sdk_s3::config::SharedHttpClient;
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ClientConfig, ServerName};

/// Accepts any certificate chain the server presents
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

fn insecure_tls_config() -> ClientConfig {
    ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
        .with_no_client_auth()
}

/// HTTP client for the SDK that trusts every server certificate
pub fn insecure_http_client() -> SharedHttpClient {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(insecure_tls_config())
        .https_only()
        .enable_http1()
        .build();

    HyperClientBuilder::new().build(connector)
}
