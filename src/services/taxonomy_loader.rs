use tracing::{info, warn};

use crate::services::data_source::{DataSourceError, ItemStore};

/// Allowed workflow states of `state_field` on `root_type`, in the order the
/// store declares them. That order becomes the stacking order of the chart.
pub async fn load_schedule_states(
    store: &dyn ItemStore,
    root_type: &str,
    state_field: &str,
) -> Result<Vec<String>, DataSourceError> {
    let states = store.allowed_values(root_type, state_field).await?;
    if states.is_empty() {
        warn!(root_type, state_field, "no allowed values defined");
    } else {
        info!(root_type, count = states.len(), "loaded workflow states");
    }
    Ok(states)
}
