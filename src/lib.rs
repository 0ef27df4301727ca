//! # rebody
//!
//! A rewindable, fully-buffered HTTP body reader.
//!
//! This library materializes a request or response body into memory once and
//! then exposes it through a rewindable streaming-input interface. Code
//! written against a "read the body as a stream" contract can re-read the
//! same bytes any number of times: signature verification, content sniffing
//! and parsing can each consume the body without coordinating with one
//! another, even though the transport that delivered it could never seek.
//!
//! ## Features
//!
//! - Cursor-style reads with exact end-of-input semantics ([`BodyInput::read`])
//! - Line-by-line reading and iteration over the buffered bytes
//! - Unconditional rewind back to the start of the body
//! - Buffering sources for any async byte stream or a remote URL
//! - Transparent gzip/deflate inflation and a configurable in-memory size cap
//!
//! ## Example
//!
//! ```no_run
//! use rebody::{BodyInput, BufferedBody, HttpBodySource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Fetch and buffer a remote body
//!     let mut source = HttpBodySource::new("https://example.com/webhook.json".to_string())?;
//!     let mut body = BufferedBody::from_source(&mut source).await?;
//!
//!     // Peek at the first bytes, then hand the whole body to a parser
//!     let preview = body.read(Some(64), None)?;
//!     println!("{:?}", preview);
//!
//!     body.rewind();
//!     let full = body.read(None, None)?;
//!     println!("{} bytes total", full.map(|b| b.len()).unwrap_or(0));
//!
//!     Ok(())
//! }
//! ```

pub mod body;
pub mod source;

pub use body::{BodyError, BodyInput, BufferedBody};
pub use source::{BodySource, HttpBodySource, StreamBodySource};
