use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use flate2::read::{GzDecoder, ZlibDecoder};
use log::{debug, warn};
use reqwest::Client;
use std::io::Read;
use std::time::Duration;

use super::{BodySource, DEFAULT_MAX_BODY_SIZE};
use anyhow::{bail, Result};

/// HTTP source that fetches a remote body and buffers it whole
///
/// The response body is accumulated chunk by chunk under the size cap and
/// inflated when the server declared a `gzip` or `deflate` content
/// encoding, so the buffered bytes are always the decoded payload.
pub struct HttpBodySource {
    client: Client,
    url: String,
    content_length: Option<u64>,
    max_size: u64,
    max_retry: u32,
}

impl HttpBodySource {
    /// Create a source for the given URL
    ///
    /// Builds the HTTP client up front; no network traffic happens until
    /// [`BodySource::read_body`] is called.
    pub fn new(url: String) -> Result<Self> {
        Self::with_max_size(url, DEFAULT_MAX_BODY_SIZE)
    }

    /// Create a source with a custom in-memory size cap
    pub fn with_max_size(url: String, max_size: u64) -> Result<Self> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("unsupported URL scheme: {}", url);
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            url,
            content_length: None,
            max_size,
            max_retry: 10,
        })
    }
}

#[async_trait]
impl BodySource for HttpBodySource {
    async fn read_body(&mut self) -> Result<Bytes> {
        let mut retry_count = 0;

        // Retry the initial send on transient connection failures; once a
        // response is streaming there is no resumable position to retry from.
        let mut resp = loop {
            match self.client.get(&self.url).send().await {
                Ok(resp) => break resp,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("max retries exceeded fetching {}", self.url);
                    }
                    warn!(
                        "connection error, retry {}/{}: {}",
                        retry_count, self.max_retry, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if !resp.status().is_success() {
            bail!("HTTP request failed with status: {}", resp.status());
        }

        // Reject bodies the server already declares as oversized, before
        // pulling a single chunk.
        if let Some(len) = resp.content_length() {
            if len > self.max_size {
                bail!(
                    "declared body length {} exceeds maximum buffered size of {} bytes",
                    len,
                    self.max_size
                );
            }
            self.content_length = Some(len);
        }

        let encoding = resp
            .headers()
            .get("content-encoding")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("identity")
            .to_ascii_lowercase();

        let mut buf = BytesMut::new();
        while let Some(chunk) = resp.chunk().await? {
            if (buf.len() + chunk.len()) as u64 > self.max_size {
                bail!(
                    "body exceeds maximum buffered size of {} bytes",
                    self.max_size
                );
            }
            buf.extend_from_slice(&chunk);
        }

        let body = inflate_body(buf.freeze(), &encoding, self.max_size)?;
        debug!("buffered {} bytes from {}", body.len(), self.url);
        Ok(body)
    }

    fn content_length(&self) -> Option<u64> {
        // Known only once response headers have been seen
        self.content_length
    }
}

/// Decode a buffered payload according to its declared content encoding.
///
/// The inflated output is held to the same size cap as the wire bytes, so
/// a small compressed body cannot expand past the configured limit.
fn inflate_body(raw: Bytes, encoding: &str, max_size: u64) -> Result<Bytes> {
    match encoding {
        "identity" | "" => Ok(raw),
        "gzip" | "x-gzip" => {
            let mut out = Vec::new();
            GzDecoder::new(raw.as_ref())
                .take(max_size + 1)
                .read_to_end(&mut out)?;
            if out.len() as u64 > max_size {
                bail!(
                    "inflated body exceeds maximum buffered size of {} bytes",
                    max_size
                );
            }
            Ok(Bytes::from(out))
        }
        "deflate" => {
            let mut out = Vec::new();
            ZlibDecoder::new(raw.as_ref())
                .take(max_size + 1)
                .read_to_end(&mut out)?;
            if out.len() as u64 > max_size {
                bail!(
                    "inflated body exceeds maximum buffered size of {} bytes",
                    max_size
                );
            }
            Ok(Bytes::from(out))
        }
        other => bail!("unsupported content encoding: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Bytes {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        Bytes::from(enc.finish().unwrap())
    }

    #[test]
    fn gzip_bodies_inflate_to_the_original_bytes() {
        let body = inflate_body(gzip(b"hello\nworld\n"), "gzip", 1024).unwrap();
        assert_eq!(body, "hello\nworld\n");
    }

    #[test]
    fn deflate_bodies_inflate_to_the_original_bytes() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"hello\nworld\n").unwrap();
        let raw = Bytes::from(enc.finish().unwrap());

        let body = inflate_body(raw, "deflate", 1024).unwrap();
        assert_eq!(body, "hello\nworld\n");
    }

    #[test]
    fn identity_bodies_pass_through() {
        let body = inflate_body(Bytes::from_static(b"raw"), "identity", 16).unwrap();
        assert_eq!(body, "raw");
    }

    #[test]
    fn inflated_bodies_respect_the_size_cap() {
        let err = inflate_body(gzip(&[0u8; 4096]), "gzip", 16).unwrap_err();
        assert!(err.to_string().contains("maximum buffered size"));
    }

    #[test]
    fn unknown_encodings_are_rejected() {
        let err = inflate_body(Bytes::new(), "br", 16).unwrap_err();
        assert!(err.to_string().contains("unsupported content encoding"));
    }

    #[test]
    fn only_http_urls_are_accepted() {
        assert!(HttpBodySource::new("ftp://example.com/body".to_string()).is_err());
        assert!(HttpBodySource::new("https://example.com/body".to_string()).is_ok());
    }
}
