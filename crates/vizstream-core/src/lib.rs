//! vizstream-core: decoding and aggregation stages for streamed chart plans.
//!
//! This crate holds every transformation stage of the pipeline plus the
//! shared types used across them. It performs no network I/O; transports
//! live in `vizstream-feeds`.
//!
//! # Architecture
//!
//! ```text
//! chunks ──► decoder ──► accumulator ──► extract ──► ChartPlan
//!                                                       │
//!                                  Table (table) ───────┤
//!                                                       ▼
//!                                 aggregate ──► Series ──► assemble ──► ChartConfig
//! ```
//!
//! Each stage is owned by a single request. Nothing here holds shared
//! mutable state, so independent requests can run concurrently without
//! locking.

pub mod accumulator;
pub mod aggregate;
pub mod assemble;
pub mod config;
pub mod decoder;
pub mod encode;
pub mod extract;
pub mod table;
pub mod types;

pub use accumulator::{accumulate, ContentAccumulator, CONTENT_EVENT};
pub use aggregate::{aggregate, AggregateError};
pub use assemble::{assemble, assemble_for_plan};
pub use decoder::{FrameDecoder, FrameStream};
pub use extract::{extract_plan, extract_suggestions, ExtractError};
pub use table::{Cell, ColumnType, Row, Schema, Table, TableError};
pub use types::{
    Aggregation, BarPlan, ChartConfig, ChartPlan, ChartSuggestions, ChartType, Frame, Series,
    XAxis, YAxis, DONE_SENTINEL,
};
