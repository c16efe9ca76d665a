use thiserror::Error;
use tracing::info;

use crate::domain::reference::ReferenceError;
use crate::domain::scope::AggregatedScope;
use crate::services::data_source::{DataSourceError, ItemStore};
use crate::services::scope_resolver::{resolve_milestone, resolve_portfolio_items_in_milestone};
use crate::services::taxonomy_loader::load_schedule_states;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),
    #[error("remote load failed: {0}")]
    RemoteLoad(#[from] DataSourceError),
}

/// Which leaf type and field the workflow states come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSettings {
    pub leaf_type: String,
    pub state_field: String,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            leaf_type: "HierarchicalRequirement".to_string(),
            state_field: "ScheduleState".to_string(),
        }
    }
}

/// Runs the milestone, portfolio item and workflow state loads concurrently.
/// Succeeds only if all three do; the first failure fails the whole load.
pub async fn load_all(
    store: &dyn ItemStore,
    milestone_ref: &str,
    settings: &LoadSettings,
) -> Result<AggregatedScope, LoadError> {
    info!(milestone_ref, "loading milestone scope");
    let (milestone, (portfolio_item_type, portfolio_items), schedule_states) = tokio::try_join!(
        resolve_milestone(store, milestone_ref),
        resolve_portfolio_items_in_milestone(store, milestone_ref),
        async {
            load_schedule_states(store, &settings.leaf_type, &settings.state_field)
                .await
                .map_err(LoadError::from)
        },
    )?;

    Ok(AggregatedScope {
        milestone,
        portfolio_item_type,
        portfolio_items,
        leaf_type: settings.leaf_type.clone(),
        state_field: settings.state_field.clone(),
        schedule_states,
    })
}
