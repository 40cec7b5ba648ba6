//! Core types for vizstream-core.
//!
//! This module defines the data structures shared across all pipeline stages:
//! the decoded [`Frame`], the declarative [`ChartPlan`] produced by the
//! generative backend, and the [`Series`] / [`ChartConfig`] pair handed to the
//! rendering layer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload value that marks the end of meaningful output for an event.
pub const DONE_SENTINEL: &str = "[DONE]";

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// One decoded `(event, payload)` unit from the event stream.
///
/// `event` is `None` for `data:` lines that arrive before any `event:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: Option<String>,
    /// Text after the `data: ` prefix, untrimmed.
    pub payload: String,
}

impl Frame {
    pub fn new(event: Option<&str>, payload: impl Into<String>) -> Self {
        Self {
            event: event.map(str::to_string),
            payload: payload.into(),
        }
    }

    /// True when this frame belongs to the given event category.
    pub fn is_event(&self, name: &str) -> bool {
        self.event.as_deref() == Some(name)
    }

    /// True when the payload is exactly the `[DONE]` sentinel.
    pub fn is_done(&self) -> bool {
        self.payload == DONE_SENTINEL
    }
}

// ---------------------------------------------------------------------------
// Chart plan
// ---------------------------------------------------------------------------

/// Chart kinds the pipeline knows how to aggregate and assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartType::Bar => write!(f, "bar"),
        }
    }
}

/// Per-group reduction applied to the value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Aggregation::Sum => write!(f, "sum"),
            Aggregation::Avg => write!(f, "avg"),
            Aggregation::Count => write!(f, "count"),
        }
    }
}

/// Grouping (category) axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XAxis {
    pub column: String,
    pub label: String,
}

/// Value axis and the reduction used to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YAxis {
    pub column: String,
    pub aggregation: Aggregation,
    pub label: String,
}

fn default_top_k() -> i64 {
    10
}

/// Accepts `10` and `10.0`; rejects fractional and out-of-range numbers.
fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(D::Error::custom(format!("expected an integer, got {number}"))),
    }
}

/// Plan body for a bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarPlan {
    pub x: XAxis,
    pub y: YAxis,
    /// Maximum number of groups kept after sorting. Non-positive values are
    /// accepted here and produce an empty series at aggregation time.
    #[serde(default = "default_top_k", deserialize_with = "integral")]
    pub top_k: i64,
}

/// A declarative chart plan, tagged by its `type` field.
///
/// A plan without `type` is a bar plan. Unknown `type` values are rejected.
/// New chart kinds are added as variants; every stage matches exhaustively so
/// the compiler points at each place that needs a new branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartPlan {
    Bar(BarPlan),
}

#[derive(Deserialize)]
struct TaggedPlan {
    #[serde(rename = "type", default)]
    chart_type: Option<ChartType>,
    #[serde(flatten)]
    body: serde_json::Value,
}

impl<'de> Deserialize<'de> for ChartPlan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let tagged = TaggedPlan::deserialize(deserializer)?;
        match tagged.chart_type.unwrap_or(ChartType::Bar) {
            ChartType::Bar => BarPlan::deserialize(tagged.body)
                .map(ChartPlan::Bar)
                .map_err(D::Error::custom),
        }
    }
}

impl ChartPlan {
    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartPlan::Bar(_) => ChartType::Bar,
        }
    }

    pub fn x(&self) -> &XAxis {
        match self {
            ChartPlan::Bar(plan) => &plan.x,
        }
    }

    pub fn y(&self) -> &YAxis {
        match self {
            ChartPlan::Bar(plan) => &plan.y,
        }
    }

    pub fn top_k(&self) -> i64 {
        match self {
            ChartPlan::Bar(plan) => plan.top_k,
        }
    }

    /// Default human-readable title, e.g. `"Total Sales by Region"`.
    pub fn title(&self) -> String {
        format!("{} by {}", self.y().label, self.x().label)
    }
}

/// Chart kinds suggested by the backend's suggestion stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSuggestions {
    #[serde(default)]
    pub chart_types: Vec<String>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Parallel label/value arrays, ordered by descending aggregated value.
///
/// Integral values serialize without a fractional part (`500`, not `500.0`).
/// Non-finite values serialize as JSON `null` and read back as NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub labels: Vec<String>,
    #[serde(serialize_with = "write_values", deserialize_with = "read_values")]
    pub values: Vec<f64>,
}

/// Largest magnitude below which every integer is exact in an `f64`.
const EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn write_values<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeSeq;

    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for &value in values {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < EXACT_INT {
            seq.serialize_element(&(value as i64))?;
        } else if value.is_finite() {
            seq.serialize_element(&value)?;
        } else {
            seq.serialize_element(&None::<f64>)?;
        }
    }
    seq.end()
}

fn read_values<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate `(label, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Renderer-agnostic chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Caller-supplied identity; must be unique among charts shown together.
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub series: Series,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
