//! Blocking adapter for async transports.

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use super::{AsyncTransport, Exchange, SendRequest, Transport};
use crate::error::{CliError, Result};

/// Drives an [`AsyncTransport`] from the synchronous engine.
///
/// Each call blocks on a private current-thread runtime. When a request
/// carries a timeout it is enforced here as well, so a stuck async
/// transport cannot hang the session.
pub struct BlockingTransport<T> {
    /// The tokio runtime.
    runtime: Runtime,
    /// The wrapped transport.
    inner: T,
}

impl<T: AsyncTransport> BlockingTransport<T> {
    /// Wrap an async transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created.
    pub fn new(inner: T) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::io_context("creating tokio runtime", e))?;
        Ok(Self { runtime, inner })
    }

    /// Get a reference to the wrapped transport.
    #[must_use]
    pub const fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Get a mutable reference to the wrapped transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the transport, dropping the runtime.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: AsyncTransport> Transport for BlockingTransport<T> {
    fn send(&mut self, request: &SendRequest<'_>) -> Result<Exchange> {
        let inner = &mut self.inner;
        // Timers must be created inside the runtime.
        self.runtime.block_on(async {
            match request.timeout {
                Some(limit) => tokio::time::timeout(limit, inner.send(request))
                    .await
                    .unwrap_or_else(|_| Err(CliError::timeout(Some(limit), ""))),
                None => inner.send(request).await,
            }
        })
    }

    fn remove_echo(&self, output: &str, command: &str) -> String {
        self.inner.remove_echo(output, command)
    }

    fn sleep(&mut self, duration: Duration) {
        let inner = &mut self.inner;
        self.runtime.block_on(async { inner.sleep(duration).await });
    }
}

impl<T> std::fmt::Debug for BlockingTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingTransport").finish_non_exhaustive()
    }
}
