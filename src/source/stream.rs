use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{BodySource, DEFAULT_MAX_BODY_SIZE};
use anyhow::{bail, Result};

/// Source that buffers any async byte stream fully into memory
pub struct StreamBodySource<R> {
    reader: R,
    max_size: u64,
}

impl<R> StreamBodySource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_size(reader, DEFAULT_MAX_BODY_SIZE)
    }

    /// Create a source with a custom in-memory size cap
    pub fn with_max_size(reader: R, max_size: u64) -> Self {
        Self { reader, max_size }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send + Sync> BodySource for StreamBodySource<R> {
    async fn read_body(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();

        loop {
            let n = self.reader.read_buf(&mut buf).await?;
            if n == 0 {
                break;
            }
            if buf.len() as u64 > self.max_size {
                bail!(
                    "body exceeds maximum buffered size of {} bytes",
                    self.max_size
                );
            }
        }

        debug!("buffered {} bytes from stream", buf.len());
        Ok(buf.freeze())
    }

    fn content_length(&self) -> Option<u64> {
        // A raw stream carries no length up front
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffers_the_stream_byte_for_byte() {
        let mut source = StreamBodySource::new(&b"hello\nworld\n"[..]);
        assert_eq!(source.content_length(), None);
        let body = source.read_body().await.unwrap();
        assert_eq!(body, "hello\nworld\n");
    }

    #[tokio::test]
    async fn empty_streams_buffer_to_an_empty_body() {
        let mut source = StreamBodySource::new(&b""[..]);
        let body = source.read_body().await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn oversized_streams_are_rejected() {
        let data = [0u8; 32];
        let mut source = StreamBodySource::with_max_size(&data[..], 16);
        let err = source.read_body().await.unwrap_err();
        assert!(err.to_string().contains("maximum buffered size"));
    }
}
