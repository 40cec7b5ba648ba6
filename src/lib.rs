//! vizstream: streamed chart planning.
//!
//! Asks a generative backend for a chart plan, decodes the plan from its
//! event stream, and aggregates a table into a renderer-agnostic chart
//! config. This crate wires the transports in `vizstream-feeds` to the
//! stages in `vizstream-core` and re-exports the types the CLI needs.
//!
//! # Architecture
//!
//! ```text
//! HttpBackend / transcript ──► ChunkStream ──► FrameStream ──► accumulate
//!                                                                  │
//!                                                          extract_plan
//!                                                                  │
//!                                         Table ──► aggregate ──► assemble ──► ChartConfig
//! ```
//!
//! Every request runs sequentially on the caller's task. Independent
//! requests may be awaited concurrently; they share no mutable state.

pub mod pipeline;

pub use pipeline::{build_chart, build_chart_or_empty, read_plan, read_suggestions, Planner};
pub use vizstream_core::config::Config;
pub use vizstream_core::{
    AggregateError, ChartConfig, ChartPlan, ChartSuggestions, Series, Table, TableError,
};
pub use vizstream_feeds::{ChunkStream, TransportError};
