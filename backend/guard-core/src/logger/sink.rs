//! External destinations for production error events.

use crate::error::logger::LoggerError;

use common::ErrorLocation;
use models::LogEvent;

use std::panic::Location;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use tokio::runtime::Handle;
use url::Url;

const SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives error and warning events in production builds.
///
/// `forward` is called synchronously from the logging path and must not
/// block; implementations hand the event off and return.
pub trait ErrorSink: Send + Sync {
    fn forward(&self, event: &LogEvent) -> Result<(), LoggerError>;
}

/// Posts events as JSON to an error-tracking endpoint.
#[derive(Debug, Clone)]
pub struct HttpErrorSink {
    endpoint: Url,
    client: Client,
}

impl HttpErrorSink {
    #[track_caller]
    pub fn new(endpoint: &str) -> Result<Self, LoggerError> {
        let endpoint = Url::parse(endpoint).map_err(|e| LoggerError::Sink {
            message: format!("Invalid error sink URL '{endpoint}': {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let client = Client::builder()
            .timeout(SINK_TIMEOUT)
            .build()
            .map_err(|e| LoggerError::Sink {
                message: format!("Failed to build HTTP client: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ErrorSink for HttpErrorSink {
    /// Spawns the POST on the current tokio runtime.
    #[track_caller]
    fn forward(&self, event: &LogEvent) -> Result<(), LoggerError> {
        let handle = Handle::try_current().map_err(|e| LoggerError::Sink {
            message: format!("No async runtime to forward event: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let body = serde_json::to_value(event).map_err(|e| LoggerError::Sink {
            message: format!("Failed to serialize event: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        handle.spawn(async move {
            match client.post(endpoint.clone()).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Forwarded error event to {endpoint}");
                }
                Ok(response) => {
                    warn!(
                        "Error sink {endpoint} rejected event: HTTP {}",
                        response.status().as_u16()
                    );
                }
                Err(e) => {
                    warn!("Failed to forward error event to {endpoint}: {e}");
                }
            }
        });

        Ok(())
    }
}
