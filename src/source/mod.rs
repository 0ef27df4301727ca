mod http;
mod stream;

pub use http::HttpBodySource;
pub use stream::StreamBodySource;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Default cap on how many bytes a source may buffer in memory (64 MiB).
pub const DEFAULT_MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

/// Trait for producers that materialize an entire body into memory
#[async_trait]
pub trait BodySource: Send + Sync {
    /// Read the whole body and return it as one immutable buffer
    async fn read_body(&mut self) -> Result<Bytes>;

    /// Declared length of the body, when the transport knows it
    fn content_length(&self) -> Option<u64>;
}
