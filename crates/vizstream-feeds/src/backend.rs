//! HTTP client for the generative chart backend.
//!
//! # Endpoints
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | [`HttpBackend::stream_plan`] | `POST /generate` | event stream |
//! | [`HttpBackend::stream_suggestions`] | `GET /csv/{id}/suggest?user_query=…` | event stream |
//! | [`HttpBackend::fetch_table`] | `GET /csv/{id}` | `{"csvId", "data": [rows]}` |
//! | [`HttpBackend::fetch_schema`] | `GET /csv/{id}/schema` | `{"csvId", "schema": {col: type}}` |
//!
//! Streaming calls return the response body as a [`ChunkStream`] as soon as
//! the status line arrives; the body is consumed incrementally by the caller.
//! Plain HTTP only.

use crate::{ChunkStream, TransportError};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{BodyExt, BodyStream, Full};
use hyper::body::{Body, Incoming};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Method, Request, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vizstream_core::config::BackendConfig;
use vizstream_core::{ChartType, Schema, Table};

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub chart_type: ChartType,
    /// Column name → declared type, as shown to the model.
    pub columns: Schema,
    pub user_query: String,
}

#[derive(Deserialize)]
struct TableResponse {
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct SchemaResponse {
    schema: Schema,
}

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base_url.clone(), config.connect_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open the plan stream for `request`.
    pub async fn stream_plan(&self, request: &PlanRequest) -> Result<ChunkStream, TransportError> {
        let body = serde_json::to_vec(request)?;
        let url = format!("{}/generate", self.base_url);
        let req = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| invalid(&url, e))?;
        self.open_stream(url, req).await
    }

    /// Open the chart-suggestion stream for an uploaded table.
    pub async fn stream_suggestions(
        &self,
        csv_id: &str,
        user_query: &str,
    ) -> Result<ChunkStream, TransportError> {
        let url = format!(
            "{}/csv/{}/suggest?user_query={}",
            self.base_url,
            urlencoding::encode(csv_id),
            urlencoding::encode(user_query)
        );
        let req = get(&url, "text/event-stream")?;
        self.open_stream(url, req).await
    }

    /// Fetch the full table for an uploaded CSV.
    pub async fn fetch_table(&self, csv_id: &str) -> Result<Table, TransportError> {
        let url = format!("{}/csv/{}", self.base_url, urlencoding::encode(csv_id));
        let bytes = self.fetch(&url).await?;
        let response: TableResponse = serde_json::from_slice(&bytes)?;
        let table = Table::from_records(&response.data)?;
        tracing::info!(%url, rows = table.len(), "table fetched");
        Ok(table)
    }

    /// Fetch the advisory schema for an uploaded CSV.
    pub async fn fetch_schema(&self, csv_id: &str) -> Result<Schema, TransportError> {
        let url = format!("{}/csv/{}/schema", self.base_url, urlencoding::encode(csv_id));
        let bytes = self.fetch(&url).await?;
        let response: SchemaResponse = serde_json::from_slice(&bytes)?;
        Ok(response.schema)
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    async fn send(
        &self,
        url: &str,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>, TransportError> {
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|source| TransportError::Connect {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "backend rejected request");
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
            });
        }
        if resp.body().is_end_stream() {
            return Err(TransportError::NoBody {
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    async fn open_stream(
        &self,
        url: String,
        req: Request<Full<Bytes>>,
    ) -> Result<ChunkStream, TransportError> {
        let resp = self.send(&url, req).await?;
        tracing::info!(%url, "event stream opened");
        Ok(body_chunks(resp.into_body()))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, TransportError> {
        let req = get(url, "application/json")?;
        let resp = self.send(url, req).await?;
        Ok(resp.into_body().collect().await?.to_bytes())
    }
}

fn get(url: &str, accept: &str) -> Result<Request<Full<Bytes>>, TransportError> {
    Request::builder()
        .method(Method::GET)
        .uri(url)
        .header(ACCEPT, accept)
        .body(Full::new(Bytes::new()))
        .map_err(|e| invalid(url, e))
}

fn invalid(url: &str, err: impl std::fmt::Display) -> TransportError {
    TransportError::InvalidRequest {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

/// Data frames of a response body, in arrival order. Trailers are skipped.
fn body_chunks(body: Incoming) -> ChunkStream {
    let stream = BodyStream::new(body).filter_map(|frame| async move {
        match frame {
            Ok(frame) => frame.into_data().ok().map(Ok),
            Err(err) => Some(Err(TransportError::Body(err))),
        }
    });
    Box::pin(stream)
}
