//! Media transport capability
//!
//! The coordinator treats the transfer mechanism as opaque: anything that
//! can stream a URL to a destination file, report progress fractions and
//! react to cancellation works. Production uses the HTTP implementation;
//! tests inject mocks.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use vmp_common::progress::Progress;
use vmp_common::{Error, Result};

/// How often an in-flight transfer reports its progress fraction
const PROGRESS_REPORT_INTERVAL: Duration = Duration::from_millis(200);

/// A single-transfer media fetch capability
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Stream `url` into `dest`, reporting fractions in [0, 1) on
    /// `progress` at a bounded interval
    ///
    /// Must return `Error::Cancelled` promptly (within one report
    /// interval) once `cancel` fires, without leaking the underlying
    /// connection. The receiver side of `progress` consumes values at its
    /// own pace; the channel is bounded, so reporting waits for the
    /// consumer.
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: mpsc::Sender<Progress>,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// HTTP media transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaTransport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: mpsc::Sender<Progress>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.client.get(url).send() => response
                .map_err(|e| Error::Download(format!("request to {url} failed: {e}")))?,
        };

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "unexpected status {} for {url}",
                response.status()
            )));
        }

        // Without a Content-Length there is no fraction to report; the
        // slot then jumps straight from 0% to done.
        let total_bytes = response.content_length().filter(|total| *total > 0);

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;
        let mut last_report = Instant::now();

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => {
                    drop(file);
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(Error::Cancelled);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else { break };
            let chunk = chunk.map_err(|e| Error::Download(format!("transfer failed: {e}")))?;

            file.write_all(&chunk).await?;
            received += chunk.len() as u64;

            if let Some(total) = total_bytes {
                if last_report.elapsed() >= PROGRESS_REPORT_INTERVAL {
                    last_report = Instant::now();
                    let fraction = received as f64 / total as f64;
                    if fraction < 1.0 {
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                drop(file);
                                let _ = tokio::fs::remove_file(dest).await;
                                return Err(Error::Cancelled);
                            }
                            // A dropped receiver just means nobody is
                            // relaying anymore; keep transferring.
                            _ = progress.send(Progress::new(fraction)) => {}
                        }
                    }
                }
            }
        }

        file.flush().await?;
        Ok(())
    }
}
