//! Test builders: ergonomic constructors for tables and plans.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use vizstream_core::{Aggregation, BarPlan, Cell, ChartPlan, Row, Table, XAxis, YAxis};

// ---------------------------------------------------------------------------
// TableBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Table`] fixtures. Cells go through [`Cell::parse`],
/// exactly like CSV ingest.
///
/// # Example
///
/// ```rust
/// let table = TableBuilder::new(["region", "sales"])
///     .row(["N", "10"])
///     .row(["S", "5"])
///     .build();
/// ```
pub struct TableBuilder {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableBuilder {
    pub fn new<const N: usize>(columns: [&str; N]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<const N: usize>(mut self, values: [&str; N]) -> Self {
        assert_eq!(N, self.columns.len(), "row width must match header");
        let row = self
            .columns
            .iter()
            .zip(values)
            .map(|(c, v)| (c.clone(), Cell::parse(v)))
            .collect();
        self.rows.push(row);
        self
    }

    /// Add a row of already typed cells.
    pub fn cells<const N: usize>(mut self, values: [Cell; N]) -> Self {
        assert_eq!(N, self.columns.len(), "row width must match header");
        let row = self.columns.iter().cloned().zip(values).collect();
        self.rows.push(row);
        self
    }

    pub fn build(self) -> Table {
        Table::new(self.columns, self.rows)
    }
}

/// The three-row sales table used throughout the aggregation cases.
pub fn sales_table() -> Table {
    TableBuilder::new(["region", "sales"])
        .row(["N", "10"])
        .row(["N", "20"])
        .row(["S", "5"])
        .build()
}

// ---------------------------------------------------------------------------
// PlanBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for bar [`ChartPlan`]s. Defaults to `sum` and `top_k = 10`,
/// with labels equal to the column names.
pub struct PlanBuilder {
    plan: BarPlan,
}

impl PlanBuilder {
    pub fn new(x: &str, y: &str) -> Self {
        Self {
            plan: BarPlan {
                x: XAxis {
                    column: x.to_string(),
                    label: x.to_string(),
                },
                y: YAxis {
                    column: y.to_string(),
                    aggregation: Aggregation::Sum,
                    label: y.to_string(),
                },
                top_k: 10,
            },
        }
    }

    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.plan.y.aggregation = aggregation;
        self
    }

    pub fn top_k(mut self, top_k: i64) -> Self {
        self.plan.top_k = top_k;
        self
    }

    pub fn labels(mut self, x: &str, y: &str) -> Self {
        self.plan.x.label = x.to_string();
        self.plan.y.label = y.to_string();
        self
    }

    pub fn build(self) -> ChartPlan {
        ChartPlan::Bar(self.plan)
    }
}
