use bytes::{Bytes, BytesMut};
use log::trace;

use crate::source::BodySource;
use anyhow::Result;

use super::{BodyError, BodyInput};

/// Rewindable reader over a fully-buffered body.
///
/// Holds a shared, immutable byte buffer and a read offset. The offset
/// only moves forward through the read operations and back to zero
/// through [`BodyInput::rewind`]; it never runs past the end of the
/// buffer. Cloning the underlying [`Bytes`] is cheap, so every chunk
/// handed out references the same allocation.
///
/// ## Example
///
/// ```
/// use rebody::{BodyInput, BufferedBody};
///
/// let mut body = BufferedBody::new("hello world");
/// assert_eq!(body.read(Some(5), None).unwrap().unwrap(), "hello");
/// body.rewind();
/// assert_eq!(body.read(None, None).unwrap().unwrap(), "hello world");
/// ```
pub struct BufferedBody {
    /// The materialized body. Never mutated after construction.
    buffer: Bytes,
    /// Current read offset. Invariant: `pos <= buffer.len()`.
    pos: usize,
}

impl BufferedBody {
    /// Wrap an already-materialized buffer.
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            pos: 0,
        }
    }

    /// An input with no bytes, for requests that carry no body.
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// Drain `source` and wrap the materialized bytes.
    ///
    /// This is the seam between the transport layer and the cursor: the
    /// source performs all of its I/O here, and the returned body never
    /// touches the network again.
    ///
    /// # Errors
    ///
    /// Propagates whatever the source failed on, such as transport
    /// errors, oversized bodies, or undecodable content.
    pub async fn from_source<S: BodySource + ?Sized>(source: &mut S) -> Result<Self> {
        let bytes = source.read_body().await?;
        Ok(Self::new(bytes))
    }

    /// Total length of the buffered body in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes between the offset and the end.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }
}

impl Default for BufferedBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl BodyInput for BufferedBody {
    fn read_all(&self) -> Bytes {
        self.buffer.clone()
    }

    fn read_line(&mut self) -> Option<Bytes> {
        if self.pos >= self.buffer.len() {
            return None;
        }
        // A line runs through its `\n`; the unterminated tail counts too.
        let end = match self.buffer[self.pos..].iter().position(|&b| b == b'\n') {
            Some(i) => self.pos + i + 1,
            None => self.buffer.len(),
        };
        let line = self.buffer.slice(self.pos..end);
        self.pos = end;
        Some(line)
    }

    fn read(
        &mut self,
        length: Option<i64>,
        dest: Option<&mut BytesMut>,
    ) -> Result<Option<Bytes>, BodyError> {
        let length = match length {
            Some(n) if n < 0 => return Err(BodyError::InvalidLength(n)),
            Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
            None => None,
        };

        if self.pos >= self.buffer.len() {
            // End of input. Sized reads signal it with an absent value;
            // unsized reads ("read to EOF") yield the empty value instead,
            // whether or not a destination was supplied.
            return Ok(match length {
                Some(_) => None,
                None => Some(Bytes::new()),
            });
        }

        let take = match length {
            Some(n) => n.min(self.remaining()),
            None => self.remaining(),
        };
        let chunk = self.buffer.slice(self.pos..self.pos + take);
        self.pos += take;

        match dest {
            Some(dest) => {
                dest.extend_from_slice(&chunk);
                Ok(None)
            }
            None => Ok(Some(chunk)),
        }
    }

    fn rewind(&mut self) {
        trace!("rewinding body cursor from offset {}", self.pos);
        self.pos = 0;
    }
}
