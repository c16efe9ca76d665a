use crate::commands::command_error::CommandError;
use crate::commands::connect::load_milestone;
use crate::commands::report_format::format_summary_report;
use crate::services::dashboard::DashboardError;

pub async fn summary_command(config: &str, milestone: &str) -> Result<(), CommandError> {
    let dashboard = load_milestone(config, milestone).await?;
    let scope = dashboard.scope().ok_or(DashboardError::NoScopeLoaded)?;
    let summary = dashboard.summary().ok_or(DashboardError::NoScopeLoaded)?;

    println!(
        "{}",
        format_summary_report(&scope, &summary, &dashboard.projects())
    );
    Ok(())
}
