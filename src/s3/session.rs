//! Store session: the operations the tree needs, and the S3 binding

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use url::Url;

use crate::error::{BrowserError, Result};
use crate::s3::transport;
use crate::s3::types::{Bucket, ConnectionProfile, ListEntry, ObjectInfo, DELIMITER};

/// Region sent with requests; S3-compatible stores ignore it
const DEFAULT_REGION: &str = "us-east-1";

/// Operations over one store's key namespace.
///
/// Every call is a network round-trip. Callers run one at a time.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all accessible buckets
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// List the entries exactly one level below `prefix`.
    ///
    /// Deeper keys collapse into a single grouped entry ending in the
    /// delimiter. Entries come back in key order.
    async fn list_immediate_children(&self, bucket: &str, prefix: &str) -> Result<Vec<ListEntry>>;

    /// Write a zero-byte object at `key`
    async fn put_empty_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Fetch size, modification time and etag of an object
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo>;
}

/// Session bound to one connection profile
pub struct S3Session {
    client: Client,
    endpoint: String,
}

impl S3Session {
    /// Build a client for `profile` and probe the store with a bucket listing.
    /// Returns the session together with the buckets that listing found.
    ///
    /// Transport is always HTTPS; only the certificate trust check is
    /// skipped when the profile asks for it.
    pub async fn establish(profile: &ConnectionProfile) -> Result<(Self, Vec<Bucket>)> {
        let endpoint = normalize_endpoint(&profile.endpoint)?;

        if profile.access_key.trim().is_empty() || profile.secret_key.trim().is_empty() {
            return Err(BrowserError::Config(format!(
                "profile '{}' has no credentials",
                profile.name
            )));
        }

        let credentials = Credentials::new(
            profile.access_key.clone(),
            profile.secret_key.clone(),
            None,
            None,
            "s3-tree-profile",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(DEFAULT_REGION))
            .credentials_provider(credentials)
            .endpoint_url(endpoint.clone());

        if profile.ignore_ssl_verification {
            tracing::debug!("Certificate verification disabled for {}", endpoint);
            loader = loader.http_client(transport::insecure_http_client());
        }

        let config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        let session = Self {
            client: Client::from_conf(s3_config),
            endpoint,
        };

        // Failures on first use count as establishment failures
        let buckets = session.list_buckets().await?;

        tracing::debug!(
            "Session established with {} ({} buckets)",
            session.endpoint,
            buckets.len()
        );
        Ok((session, buckets))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint URL this session talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectStore for S3Session {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| BrowserError::from_sdk("list buckets", e))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b.creation_date().map(|d| {
                    chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                        .unwrap_or_default()
                }),
            })
            .collect();

        Ok(buckets)
    }

    async fn list_immediate_children(&self, bucket: &str, prefix: &str) -> Result<Vec<ListEntry>> {
        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .delimiter(DELIMITER.to_string());

            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                BrowserError::from_sdk(&format!("list s3://{}/{}", bucket, prefix), e)
            })?;

            for common in response.common_prefixes() {
                if let Some(p) = common.prefix() {
                    entries.push(ListEntry::prefix(p));
                }
            }

            for obj in response.contents() {
                if let Some(key) = obj.key() {
                    entries.push(ListEntry::object(key));
                }
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        // Grouped prefixes and objects arrive as separate lists
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(
            "Listed {} entries under s3://{}/{}",
            entries.len(),
            bucket,
            prefix
        );

        Ok(entries)
    }

    async fn put_empty_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(|e| BrowserError::from_sdk(&format!("write s3://{}/{}", bucket, key), e))?;

        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BrowserError::from_sdk(&format!("stat s3://{}/{}", bucket, key), e))?;

        Ok(ObjectInfo {
            key: key.to_string(),
            size: response.content_length().unwrap_or(0).max(0) as u64,
            last_modified: response.last_modified().map(|d| {
                chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos()).unwrap_or_default()
            }),
            etag: response.e_tag().map(|s| s.trim_matches('"').to_string()),
        })
    }
}

/// Turn `host[:port]` or `https://host[:port]` into an endpoint URL.
///
/// Plain HTTP and other schemes are refused.
pub fn normalize_endpoint(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(BrowserError::Config("endpoint is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| BrowserError::Config(format!("invalid endpoint '{}': {}", raw, e)))?;

    if url.scheme() != "https" {
        return Err(BrowserError::Config(format!(
            "endpoint '{}' must use https",
            raw
        )));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| BrowserError::Config(format!("endpoint '{}' has no host", raw)))?;

    if url.path() != "/" || url.query().is_some() {
        return Err(BrowserError::Config(format!(
            "endpoint '{}' must not contain a path",
            raw
        )));
    }

    Ok(match url.port() {
        Some(port) => format!("https://{}:{}", host, port),
        None => format!("https://{}", host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_host() {
        assert_eq!(normalize_endpoint("play.min.io").unwrap(), "https://play.min.io");
    }

    #[test]
    fn test_normalize_host_with_port() {
        assert_eq!(
            normalize_endpoint("minio.local:9000").unwrap(),
            "https://minio.local:9000"
        );
    }

    #[test]
    fn test_normalize_https_url() {
        assert_eq!(
            normalize_endpoint("https://s3.example.com/").unwrap(),
            "https://s3.example.com"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_endpoint("  10.0.0.5:9000  ").unwrap(),
            "https://10.0.0.5:9000"
        );
    }

    #[test]
    fn test_normalize_rejects_plain_http() {
        let err = normalize_endpoint("http://minio.local:9000").unwrap_err();
        assert!(matches!(err, BrowserError::Config(_)));
        assert!(err.to_string().contains("https"));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(
            normalize_endpoint("   ").unwrap_err(),
            BrowserError::Config(_)
        ));
    }

    #[test]
    fn test_normalize_rejects_path() {
        assert!(matches!(
            normalize_endpoint("s3.example.com/bucket").unwrap_err(),
            BrowserError::Config(_)
        ));
    }

    #[tokio::test]
    async fn test_establish_rejects_plaintext_endpoint_before_network() {
        let profile = ConnectionProfile {
            name: "local".to_string(),
            endpoint: "http://127.0.0.1:9000".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            ignore_ssl_verification: true,
        };
        let err = S3Session::establish(&profile).await.err().unwrap();
        assert!(matches!(err, BrowserError::Config(_)));
    }

    #[tokio::test]
    async fn test_establish_rejects_blank_credentials() {
        let profile = ConnectionProfile {
            name: "local".to_string(),
            endpoint: "127.0.0.1:9000".to_string(),
            access_key: " ".to_string(),
            secret_key: "sk".to_string(),
            ignore_ssl_verification: false,
        };
        let err = S3Session::establish(&profile).await.err().unwrap();
        assert!(matches!(err, BrowserError::Config(_)));
    }
}
