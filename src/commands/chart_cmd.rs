use crate::commands::command_error::CommandError;
use crate::commands::connect::load_milestone;
use crate::services::chart_request::{OutputFormat, serialize_chart_request};
use crate::services::dashboard::DashboardError;

pub async fn chart_command(
    config: &str,
    milestone: &str,
    projects: &[u64],
    excluded_projects: &[u64],
    output: &str,
    format: OutputFormat,
) -> Result<(), CommandError> {
    let dashboard = load_milestone(config, milestone).await?;

    let mut request = if projects.is_empty() {
        dashboard.chart_request().ok_or(DashboardError::NoScopeLoaded)?
    } else {
        dashboard.set_active_projects(projects.iter().copied())?
    };
    for project_id in excluded_projects {
        request = dashboard.toggle_project(*project_id, false)?;
    }
    tracing::info!(
        projects = ?dashboard.active_projects().ids(),
        "active projects"
    );
    if request.store_config.matches_nothing() {
        tracing::warn!(milestone, "chart request matches no snapshots");
    }

    let mut buffer = Vec::new();
    serialize_chart_request(&mut buffer, &request, format)?;
    tokio::fs::write(output, buffer).await?;
    println!("Chart request written to {output}");
    Ok(())
}
