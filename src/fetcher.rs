use crate::backend::RiskBackend;
use crate::errors::FetchError;
use crate::models::Dataset;
use std::sync::Arc;
use tracing::{debug, warn};

/// A finished snapshot request, still tagged with the token it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub token: u64,
    pub date: String,
    pub result: Result<Dataset, FetchError>,
}

#[derive(Clone)]
pub struct DataFetcher {
    backend: Arc<dyn RiskBackend>,
}

impl DataFetcher {
    pub fn new(backend: Arc<dyn RiskBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn RiskBackend {
        self.backend.as_ref()
    }

    /// Never decides whether the result is still wanted; the caller compares
    /// `token` against its pending token on completion.
    pub async fn fetch_snapshot(&self, date: String, token: u64) -> FetchOutcome {
        debug!("fetching snapshot for {date} (token {token})");
        let result = self.backend.fetch_snapshot(&date).await;
        if let Err(err) = &result {
            warn!("snapshot request {token} failed: {err}");
        }
        FetchOutcome {
            token,
            date,
            result,
        }
    }
}
