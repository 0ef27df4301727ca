//! Rewindable body input.
//!
//! This module defines the streaming-input contract that request handlers
//! consume, and its in-memory implementation.
//!
//! ## Architecture
//!
//! - [`BodyInput`]: the contract itself: cursor-style reads, per-line
//!   iteration, and an unconditional rewind
//! - [`BufferedBody`]: the concrete implementation over a fully-buffered
//!   byte sequence
//!
//! ## Reading Model
//!
//! A body is materialized into memory exactly once (see
//! [`crate::source`]), after which a [`BufferedBody`] tracks a single read
//! offset over the immutable bytes. Sized reads advance the offset and
//! signal end-of-input by returning an absent value; unsized reads drain
//! the remainder; `rewind` moves the offset back to the start so the same
//! bytes can be consumed again. End-of-input is never an error; only a
//! malformed `read` argument is.
//!
//! ## Ownership
//!
//! A `BufferedBody` belongs to exactly one request context at a time. The
//! offset is plain mutable state with no internal synchronization; the
//! underlying buffer is immutable and may be shared freely.

mod buffered;

pub use buffered::BufferedBody;

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Errors produced by [`BodyInput::read`].
#[derive(Error, Debug)]
pub enum BodyError {
    /// A sized read was requested with a negative length.
    #[error("length must be a non-negative integer, got {0}")]
    InvalidLength(i64),
}

/// Streaming input over a fully-buffered body.
///
/// The trait is object-safe so a host can store request bodies as
/// `Box<dyn BodyInput>` behind a uniform interface.
pub trait BodyInput {
    /// Return the complete body contents, regardless of how much has
    /// already been read.
    ///
    /// The read offset is left untouched; this is "everything", not
    /// "everything remaining". Never fails.
    fn read_all(&self) -> Bytes;

    /// Read the next line, advancing the offset past it.
    ///
    /// Lines end at a `\n`, which is included in the returned bytes. An
    /// unterminated tail is returned as a final line without its
    /// terminator. Returns `None` once the offset reaches the end.
    fn read_line(&mut self) -> Option<Bytes>;

    /// Read from the current offset, with `IO#read`-style semantics.
    ///
    /// # Arguments
    ///
    /// * `length` - Maximum number of bytes to read. Reads are clamped to
    ///   the unread remainder, so a length past the end is not an error.
    ///   With no length, the entire remainder is read and the offset
    ///   moves to the end.
    /// * `dest` - Optional destination the read bytes are appended to.
    ///   When supplied, the call returns `Ok(None)` instead of a separate
    ///   value, even when bytes were read.
    ///
    /// # Returns
    ///
    /// At end of input the result depends on the call shape: a sized read
    /// returns `Ok(None)`, an unsized read returns an empty value.
    /// Otherwise the read bytes (or `Ok(None)` when `dest` was supplied).
    ///
    /// # Errors
    ///
    /// [`BodyError::InvalidLength`] if `length` is negative. The offset
    /// is not moved in that case.
    fn read(
        &mut self,
        length: Option<i64>,
        dest: Option<&mut BytesMut>,
    ) -> Result<Option<Bytes>, BodyError>;

    /// Invoke `visitor` once per remaining line, consuming the cursor.
    ///
    /// Lines are non-overlapping, keep their terminators, and arrive in
    /// order. The iteration drains the cursor to the end: calling this
    /// twice in a row visits nothing the second time unless [`rewind`]
    /// is called in between. An exhausted cursor yields zero visits.
    ///
    /// [`rewind`]: BodyInput::rewind
    fn each_line(&mut self, visitor: &mut dyn FnMut(Bytes)) {
        while let Some(line) = self.read_line() {
            visitor(line);
        }
    }

    /// Move the read offset back to the start of the body.
    ///
    /// Always legal, including before the first read: the whole point of
    /// buffering up front is that rewinding works even when the transport
    /// that delivered the bytes could never seek. Idempotent.
    fn rewind(&mut self);

    /// Release the input. A no-op for buffered bodies.
    ///
    /// Reserved for the infrastructure that owns the request lifecycle;
    /// application code is not expected to call it, but doing so is
    /// harmless and never invalidates the buffer.
    fn close(&mut self) {}
}
