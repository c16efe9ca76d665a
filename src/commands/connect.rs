use tokio::sync::mpsc::UnboundedReceiver;

use crate::commands::command_error::CommandError;
use crate::services::dashboard::{Dashboard, DashboardEvent};
use crate::services::orchestrator::LoadSettings;
use crate::services::rally_api::{AuthData, RallyApiClient, RallyConfigParser};

/// Builds a dashboard backed by the Rally API described in `config_path`.
pub fn open_dashboard(
    config_path: &str,
) -> Result<(Dashboard, UnboundedReceiver<DashboardEvent>), CommandError> {
    let config = RallyConfigParser
        .parse(config_path)
        .map_err(CommandError::Config)?;
    let auth = AuthData::from_env().map_err(CommandError::Auth)?;
    let settings = LoadSettings {
        leaf_type: config.leaf_type.clone(),
        state_field: config.state_field.clone(),
    };
    let client = RallyApiClient::new(config, auth).map_err(CommandError::Client)?;
    Ok(Dashboard::new(Box::new(client), settings))
}

/// Loads `milestone_ref`, failing if nothing was published.
pub async fn load_milestone(
    config_path: &str,
    milestone_ref: &str,
) -> Result<Dashboard, CommandError> {
    let (dashboard, _events) = open_dashboard(config_path)?;
    dashboard.load(milestone_ref).await?;
    Ok(dashboard)
}
