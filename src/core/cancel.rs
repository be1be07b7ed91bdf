//! Cooperative cancellation
//!
//! A single token is shared by every in-flight item. Streams wrapped in
//! [`CancellableReader`] / [`CancellableWriter`] observe it before each I/O
//! call, so work stops at the next read or write after a cancel request.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::error::{ConvertError, Result};

/// Marker carried inside an [`io::Error`] raised by a cancelled stream.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of all work observing this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`ConvertError::Cancelled`] once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ConvertError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn check_io(&self) -> io::Result<()> {
        if self.is_cancelled() {
            Err(io::Error::other(Cancelled))
        } else {
            Ok(())
        }
    }
}

/// Reader that checks a [`CancellationToken`] before every read
pub struct CancellableReader<R> {
    inner: R,
    token: CancellationToken,
}

impl<R: Read> CancellableReader<R> {
    pub fn new(inner: R, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CancellableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.token.check_io()?;
        self.inner.read(buf)
    }
}

/// Writer that checks a [`CancellationToken`] before every write
pub struct CancellableWriter<W> {
    inner: W,
    token: CancellationToken,
}

impl<W: Write> CancellableWriter<W> {
    pub fn new(inner: W, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CancellableWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.token.check_io()?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.token.check_io()?;
        self.inner.flush()
    }
}
