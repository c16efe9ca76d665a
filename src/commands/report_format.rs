use crate::domain::project::Project;
use crate::domain::scope::AggregatedScope;
use crate::services::chart_request::earliest_start_date;
use crate::services::summary_metrics::Summary;

pub fn format_summary_report(
    scope: &AggregatedScope,
    summary: &Summary,
    projects: &[Project],
) -> String {
    let target_date = match scope.milestone.target_date {
        Some(date) => date.to_string(),
        None => "n/a".to_string(),
    };
    let start_date = match earliest_start_date(scope) {
        Some(date) => date.to_string(),
        None => "n/a".to_string(),
    };

    let mut lines = Vec::new();
    lines.push("Milestone Summary".to_string());
    lines.push(format!("Milestone: {}", scope.milestone.reference));
    lines.push(format!("Target date: {target_date}"));
    lines.push(format!("Earliest start: {start_date}"));
    lines.push(format!(
        "Portfolio item type: {}",
        scope.portfolio_item_type.as_deref().unwrap_or("n/a")
    ));
    lines.push(format!("Portfolio items: {}", scope.portfolio_items.len()));
    lines.push(format!("Accepted points: {}", summary.accepted_points));
    lines.push(format!("Total points: {}", summary.total_points));
    lines.push(format!("Percent complete: {}", summary.display_percent()));
    lines.push(format!("Workflow states: {}", scope.schedule_states.join(", ")));
    lines.push(String::new());
    lines.push(format_project_list(projects));

    lines.join("\n")
}

pub fn format_project_list(projects: &[Project]) -> String {
    let mut lines = vec!["Projects:".to_string()];
    if projects.is_empty() {
        lines.push("(none)".to_string());
    }
    for project in projects {
        lines.push(format!("{} | {}", project.id, project.name));
    }
    lines.join("\n")
}
