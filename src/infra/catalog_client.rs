//! HTTP adapter for the catalog service's batch lookup endpoint.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::catalog::{BookCatalog, UpstreamError};
use crate::config::CatalogSettings;
use crate::domain::books::BookRecord;

use super::error::InfraError;

const BATCH_PATH: &str = "api/v1/books/batch";

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    books: Vec<BookRecord>,
}

/// [`BookCatalog`] backed by the catalog service's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpBookCatalog {
    client: Client,
    endpoint: Url,
}

impl HttpBookCatalog {
    pub fn new(settings: &CatalogSettings) -> Result<Self, InfraError> {
        let base = settings
            .base_url
            .as_ref()
            .ok_or_else(|| InfraError::configuration("catalog.base_url is required"))?;
        let endpoint = base.join(BATCH_PATH).map_err(|err| {
            InfraError::configuration(format!("invalid catalog endpoint: {err}"))
        })?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build catalog client: {err}"))
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn user_agent() -> &'static str {
        concat!("shelfmark/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BookCatalog for HttpBookCatalog {
    async fn batch_lookup(&self, ids: &[String]) -> Result<Vec<BookRecord>, UpstreamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&BatchRequest { ids })
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::status(status.as_u16(), body));
        }

        let payload: BatchResponse = response
            .json()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))?;

        let total = payload.books.len();
        let books: Vec<BookRecord> = payload
            .books
            .into_iter()
            .filter(|book| !book.is_placeholder())
            .collect();
        if books.len() != total {
            warn!(
                discarded = total - books.len(),
                "Catalog returned books without an id"
            );
        }

        debug!(requested = ids.len(), found = books.len(), "Catalog batch lookup");
        Ok(books)
    }
}
