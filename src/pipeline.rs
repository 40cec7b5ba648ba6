//! Request-level pipeline: chunks in, chart config out.
//!
//! The free functions work on any frame stream or chunk source and are what
//! the transcript path and the tests drive. [`Planner`] adds the HTTP backend
//! and configuration on top.

use futures::Stream;
use vizstream_core::config::Config;
use vizstream_core::{
    accumulate, aggregate, assemble_for_plan, extract_plan, extract_suggestions, AggregateError,
    ChartConfig, ChartPlan, ChartSuggestions, ChartType, Frame, Schema, Table,
};
use vizstream_feeds::{frames, ChunkStream, HttpBackend, PlanRequest, TransportError};

// ---------------------------------------------------------------------------
// Stream stages
// ---------------------------------------------------------------------------

/// Accumulate `content_event` payloads and extract the plan they spell out.
///
/// `Ok(None)` means the stream finished cleanly but held no usable plan.
pub async fn read_plan<S, E>(content_event: &str, frames: S) -> Result<Option<ChartPlan>, E>
where
    S: Stream<Item = Result<Frame, E>> + Unpin,
{
    let content = accumulate(content_event, frames).await?;
    let plan = extract_plan(&content);
    if let Some(plan) = &plan {
        tracing::info!(
            x = %plan.x().column,
            y = %plan.y().column,
            aggregation = %plan.y().aggregation,
            top_k = plan.top_k(),
            "plan received"
        );
    }
    Ok(plan)
}

/// Accumulate `content_event` payloads and extract chart suggestions.
pub async fn read_suggestions<S, E>(
    content_event: &str,
    frames: S,
) -> Result<Option<ChartSuggestions>, E>
where
    S: Stream<Item = Result<Frame, E>> + Unpin,
{
    let content = accumulate(content_event, frames).await?;
    Ok(extract_suggestions(&content))
}

// ---------------------------------------------------------------------------
// Chart building
// ---------------------------------------------------------------------------

/// Aggregate `table` per `plan` and assemble the result.
pub fn build_chart(
    id: impl Into<String>,
    table: &Table,
    plan: &ChartPlan,
) -> Result<ChartConfig, AggregateError> {
    let series = aggregate(table, plan)?;
    Ok(assemble_for_plan(id, plan, Some(series)))
}

/// Like [`build_chart`], but an aggregation failure yields the plan's chart
/// with an empty series.
pub fn build_chart_or_empty(id: impl Into<String>, table: &Table, plan: &ChartPlan) -> ChartConfig {
    let id = id.into();
    match aggregate(table, plan) {
        Ok(series) => assemble_for_plan(id, plan, Some(series)),
        Err(err) => {
            tracing::warn!(%err, chart = %id, "aggregation failed, emitting empty chart");
            assemble_for_plan(id, plan, None)
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Backend-facing entry point: one instance per process, one call per
/// request.
pub struct Planner {
    config: Config,
    backend: HttpBackend,
}

impl Planner {
    pub fn new(config: Config) -> Self {
        let backend = HttpBackend::from_config(&config.backend);
        Self { config, backend }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &HttpBackend {
        &self.backend
    }

    /// Schema sent to the backend for `table`.
    pub fn schema_of(&self, table: &Table) -> Schema {
        table.infer_schema(self.config.table.schema_sample_rows)
    }

    /// Request a bar-chart plan for `table` and decode it from the stream.
    pub async fn plan(
        &self,
        table: &Table,
        user_query: &str,
    ) -> Result<Option<ChartPlan>, TransportError> {
        let request = PlanRequest {
            chart_type: ChartType::Bar,
            columns: self.schema_of(table),
            user_query: user_query.to_string(),
        };
        let chunks = self.backend.stream_plan(&request).await?;
        self.plan_from(chunks).await
    }

    /// Decode a plan from an already open chunk source.
    pub async fn plan_from(&self, chunks: ChunkStream) -> Result<Option<ChartPlan>, TransportError> {
        read_plan(&self.config.stream.content_event, frames(chunks)).await
    }

    /// Request chart-type suggestions for an uploaded table.
    pub async fn suggest(
        &self,
        csv_id: &str,
        user_query: &str,
    ) -> Result<Option<ChartSuggestions>, TransportError> {
        let chunks = self.backend.stream_suggestions(csv_id, user_query).await?;
        self.suggest_from(chunks).await
    }

    /// Decode suggestions from an already open chunk source.
    pub async fn suggest_from(
        &self,
        chunks: ChunkStream,
    ) -> Result<Option<ChartSuggestions>, TransportError> {
        read_suggestions(&self.config.stream.content_event, frames(chunks)).await
    }
}
