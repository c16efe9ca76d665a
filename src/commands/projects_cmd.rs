use crate::commands::command_error::CommandError;
use crate::commands::connect::load_milestone;
use crate::commands::report_format::format_project_list;

pub async fn projects_command(config: &str, milestone: &str) -> Result<(), CommandError> {
    let dashboard = load_milestone(config, milestone).await?;
    println!("{}", format_project_list(&dashboard.projects()));
    Ok(())
}
