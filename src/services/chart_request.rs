use std::io::{self, Write};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::scope::{ActiveProjectSelection, AggregatedScope};
use crate::services::query_builder::{SnapshotQuery, build_query};
use crate::services::summary_metrics::{Summary, compute_summary};

pub const CHART_TITLE: &str = "Milestone Cumulative Flow";

/// Inputs for the cumulative flow calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    pub state_field_name: String,
    pub state_field_values: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub enable_projects: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub title: String,
    pub subtitle: String,
    pub zoom_type: String,
    pub x_axis_title: String,
    pub x_tick_interval: u32,
    pub y_axis_title: String,
    pub stacking: String,
    pub markers: bool,
}

/// Everything the chart renderer needs for one milestone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub store_config: SnapshotQuery,
    pub calculator_config: CalculatorConfig,
    pub chart_config: ChartConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn build_chart_request(
    scope: &AggregatedScope,
    active_projects: &ActiveProjectSelection,
) -> ChartRequest {
    let summary = compute_summary(&scope.portfolio_items);
    ChartRequest {
        store_config: build_query(scope, active_projects),
        calculator_config: build_calculator_config(scope),
        chart_config: build_chart_config(&summary),
    }
}

fn build_calculator_config(scope: &AggregatedScope) -> CalculatorConfig {
    CalculatorConfig {
        state_field_name: scope.state_field.clone(),
        state_field_values: scope.schedule_states.clone(),
        start_date: earliest_start_date(scope),
        end_date: scope.milestone.target_date,
        enable_projects: true,
    }
}

/// Earliest actual start date among the portfolio items, ignoring unstarted ones.
pub fn earliest_start_date(scope: &AggregatedScope) -> Option<NaiveDate> {
    scope
        .portfolio_items
        .iter()
        .filter_map(|item| item.actual_start_date)
        .min()
}

fn build_chart_config(summary: &Summary) -> ChartConfig {
    ChartConfig {
        title: CHART_TITLE.to_string(),
        subtitle: format!(
            "{} % of {} Total Points Completed",
            summary.display_percent(),
            summary.total_points
        ),
        zoom_type: "xy".to_string(),
        x_axis_title: "Date".to_string(),
        x_tick_interval: 15,
        y_axis_title: "Points".to_string(),
        stacking: "normal".to_string(),
        markers: false,
    }
}

pub fn serialize_chart_request<W: Write>(
    writer: &mut W,
    request: &ChartRequest,
    format: OutputFormat,
) -> io::Result<()> {
    let contents = match format {
        OutputFormat::Yaml => serde_yaml::to_string(request).map_err(io::Error::other)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(request).map_err(io::Error::other)?;
            json.push('\n');
            json
        }
    };
    writer.write_all(contents.as_bytes())
}
