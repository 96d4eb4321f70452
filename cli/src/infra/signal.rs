//! Interrupt signal source for the bootstrap routine.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};

/// Install the SIGINT handler now and return a future that resolves on the
/// first interrupt.
///
/// Registration happens before the future is polled, so an interrupt that
/// arrives while the routine is still starting up is not lost.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be registered.
pub fn interrupt() -> Result<impl Future<Output = ()>> {
    let mut sigint = signal(SignalKind::interrupt()).context("cannot register SIGINT handler")?;
    Ok(async move {
        sigint.recv().await;
    })
}
