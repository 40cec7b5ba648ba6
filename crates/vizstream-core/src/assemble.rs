//! Chart config assembly: package a [`Series`] for the rendering layer.

use crate::types::{ChartConfig, ChartPlan, ChartType, Series};

/// Wrap a series into a [`ChartConfig`]. An absent series becomes an empty
/// one.
pub fn assemble(
    id: impl Into<String>,
    title: impl Into<String>,
    chart_type: ChartType,
    series: Option<Series>,
) -> ChartConfig {
    ChartConfig {
        id: id.into(),
        title: title.into(),
        chart_type,
        series: series.unwrap_or_default(),
    }
}

/// Assemble using the plan's chart type and default title.
pub fn assemble_for_plan(id: impl Into<String>, plan: &ChartPlan, series: Option<Series>) -> ChartConfig {
    assemble(id, plan.title(), plan.chart_type(), series)
}
