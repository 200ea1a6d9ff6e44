//! Outbound HTTP for a single request.
use fxload_core::TRANSPORT_FAILURE;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Outcome of one POST: how long it took and what came back.
///
/// `status` is [`TRANSPORT_FAILURE`] when no HTTP response was received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub elapsed: Duration,
    pub status: u16,
}

impl Exchange {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Elapsed time truncated to whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Sends a JSON body to a URL.
///
/// Implementations are called from many workers at once; the harness gives every worker its
/// own instance so they never share a connection pool.
pub trait RequestDriver: Send + Sync + 'static {
    fn post(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<Exchange, DriverError>> + Send;
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("unable to build request: {0}")]
    Request(#[source] reqwest::Error),
}

/// [`RequestDriver`] backed by a dedicated `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpDriver {
    client: Client,
}

impl HttpDriver {
    pub fn new(request_timeout: Duration) -> Result<Self, DriverError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(DriverError::Client)?;
        Ok(Self { client })
    }
}

impl RequestDriver for HttpDriver {
    async fn post(&self, url: &str, body: String) -> Result<Exchange, DriverError> {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()
            .map_err(DriverError::Request)?;

        let start = Instant::now();
        let status = match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status().as_u16();
                // A body that cannot be read in full is a transport failure, whatever the status.
                match response.bytes().await {
                    Ok(_) => status,
                    Err(err) => {
                        debug!("Failed reading response body from {url}: {err}");
                        TRANSPORT_FAILURE
                    }
                }
            }
            Err(err) => {
                debug!("Transport failure for {url}: {err}");
                TRANSPORT_FAILURE
            }
        };

        Ok(Exchange {
            elapsed: start.elapsed(),
            status,
        })
    }
}
