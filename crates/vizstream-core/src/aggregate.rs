//! Aggregation engine: reduce a table to a chart-ready [`Series`] according
//! to a [`ChartPlan`].
//!
//! # Semantics
//!
//! - Rows are grouped by the literal value of the x column. `Int(1)` and
//!   `Text("1")` are different groups even though both label as `"1"`.
//! - Every y value is coerced with [`Cell::as_f64`]. Values that fail
//!   coercion become `NaN` and poison their group's `sum`/`avg`. Rows are
//!   never dropped, so `count` counts every row of the group.
//! - Groups are sorted by aggregated value, descending. The sort is stable,
//!   so ties keep first-encountered order. `NaN` groups sort after every
//!   number.
//! - At most `top_k` groups are kept. An empty table or `top_k <= 0` yields
//!   an empty series.

use crate::table::{Cell, Table};
use crate::types::{Aggregation, BarPlan, ChartPlan, Series};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// The plan names a column the table does not have.
    #[error("column {column:?} not found in table")]
    ColumnNotFound { column: String },
}

/// Aggregate `table` according to `plan`.
pub fn aggregate(table: &Table, plan: &ChartPlan) -> Result<Series, AggregateError> {
    match plan {
        ChartPlan::Bar(bar) => aggregate_bar(table, bar),
    }
}

fn aggregate_bar(table: &Table, plan: &BarPlan) -> Result<Series, AggregateError> {
    if table.is_empty() {
        return Ok(Series::default());
    }
    for column in [&plan.x.column, &plan.y.column] {
        if !table.has_column(column) {
            tracing::warn!(column = %column, "plan references missing column");
            return Err(AggregateError::ColumnNotFound {
                column: column.clone(),
            });
        }
    }
    if plan.top_k <= 0 {
        return Ok(Series::default());
    }

    let groups = group_rows(table, &plan.x.column, &plan.y.column);
    let total = groups.len();

    let mut ranked: Vec<(String, f64)> = groups
        .into_iter()
        .map(|g| {
            let value = g.value(plan.y.aggregation);
            (g.label, value)
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));
    ranked.truncate(usize::try_from(plan.top_k).unwrap_or(usize::MAX));

    tracing::debug!(
        x = %plan.x.column,
        y = %plan.y.column,
        aggregation = %plan.y.aggregation,
        groups = total,
        kept = ranked.len(),
        "aggregated"
    );

    let (labels, values) = ranked.into_iter().unzip();
    Ok(Series { labels, values })
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Hashable identity of a raw grouping value.
#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl<'a> From<&'a Cell> for GroupKey<'a> {
    fn from(cell: &'a Cell) -> Self {
        match cell {
            Cell::Null => GroupKey::Null,
            Cell::Bool(b) => GroupKey::Bool(*b),
            Cell::Int(i) => GroupKey::Int(*i),
            // -0.0 and 0.0 are one value; all NaNs are one value
            Cell::Float(f) if *f == 0.0 => GroupKey::Float(0),
            Cell::Float(f) if f.is_nan() => GroupKey::Float(f64::NAN.to_bits()),
            Cell::Float(f) => GroupKey::Float(f.to_bits()),
            Cell::Text(s) => GroupKey::Text(s),
        }
    }
}

struct Group {
    label: String,
    sum: f64,
    rows: usize,
}

impl Group {
    fn value(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.sum,
            Aggregation::Avg => self.sum / self.rows as f64,
            Aggregation::Count => self.rows as f64,
        }
    }
}

/// Groups in first-encountered order.
fn group_rows(table: &Table, x: &str, y: &str) -> Vec<Group> {
    let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in 0..table.len() {
        let key_cell = table.cell(row, x);
        let slot = *index.entry(GroupKey::from(key_cell)).or_insert_with(|| {
            groups.push(Group {
                label: key_cell.to_string(),
                sum: 0.0,
                rows: 0,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.sum += table.cell(row, y).as_f64();
        group.rows += 1;
    }

    groups
}

/// Descending order with `NaN` after every number.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
