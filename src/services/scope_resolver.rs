use tracing::{debug, info};

use crate::domain::milestone::Milestone;
use crate::domain::portfolio_item::PortfolioItem;
use crate::domain::project::Project;
use crate::domain::reference::object_id_from_ref;
use crate::services::data_source::{DataSourceError, Filter, ItemStore, Record, StoreQuery};
use crate::services::orchestrator::LoadError;

pub const PORTFOLIO_ITEM_FETCH: [&str; 8] = [
    "ObjectID",
    "Project",
    "Name",
    "PreliminaryEstimate",
    "ActualStartDate",
    "PlannedEndDate",
    "AcceptedLeafStoryPlanEstimateTotal",
    "LeafStoryPlanEstimateTotal",
];

/// Loads the milestone's target date. A well-formed reference to a
/// milestone that does not exist yields a milestone without a target date.
pub async fn resolve_milestone(
    store: &dyn ItemStore,
    milestone_ref: &str,
) -> Result<Milestone, LoadError> {
    let milestone_id = object_id_from_ref(milestone_ref)?;
    let mut milestone = Milestone::new(milestone_id);

    match store.load("Milestone", milestone_id, &["TargetDate"]).await? {
        Some(record) => milestone.target_date = record.get_date("TargetDate"),
        None => debug!(milestone_id, "milestone not found, continuing without target date"),
    }
    Ok(milestone)
}

/// Discovers the lowest-ordinal portfolio item type, then loads every item
/// of that type associated with the milestone.
pub async fn resolve_portfolio_items_in_milestone(
    store: &dyn ItemStore,
    milestone_ref: &str,
) -> Result<(Option<String>, Vec<PortfolioItem>), LoadError> {
    // Items list their milestones by relative ref, so bare ids and absolute
    // refs have to be rewritten before they can match.
    let milestone = Milestone::new(object_id_from_ref(milestone_ref)?);

    let Some(type_path) = discover_portfolio_item_type(store).await? else {
        info!("no portfolio item type definition found");
        return Ok((None, Vec::new()));
    };

    let query = StoreQuery::new(&type_path, &PORTFOLIO_ITEM_FETCH)
        .filter(Filter::contains("Milestones", milestone.reference))
        .workspace_wide();
    let records = store.query(&query).await?;
    let items = records
        .iter()
        .map(map_portfolio_item)
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        portfolio_item_type = %type_path,
        count = items.len(),
        "loaded portfolio items in milestone"
    );
    Ok((Some(type_path), items))
}

pub async fn discover_portfolio_item_type(
    store: &dyn ItemStore,
) -> Result<Option<String>, DataSourceError> {
    let query = StoreQuery::new("TypeDefinition", &["TypePath"])
        .filter(Filter::equals("Parent.Name", "Portfolio Item"))
        .filter(Filter::equals("Ordinal", 0));
    let records = store.query(&query).await?;
    Ok(records
        .first()
        .and_then(|record| record.get_str("TypePath"))
        .map(str::to_string))
}

fn map_portfolio_item(record: &Record) -> Result<PortfolioItem, DataSourceError> {
    let id = record.id().ok_or(DataSourceError::Parse)?;
    let mut item = PortfolioItem::new(id);
    item.project = record.get_record("Project").map(|project| map_project(&project)).transpose()?;
    item.name = record.get_str("Name").map(str::to_string);
    item.preliminary_estimate = record
        .get_record("PreliminaryEstimate")
        .and_then(|estimate| estimate.display_name().map(str::to_string));
    item.actual_start_date = record.get_date("ActualStartDate");
    item.planned_end_date = record.get_date("PlannedEndDate");
    item.accepted_points = record
        .get_f64("AcceptedLeafStoryPlanEstimateTotal")
        .unwrap_or(0.0);
    item.total_points = record.get_f64("LeafStoryPlanEstimateTotal").unwrap_or(0.0);
    Ok(item)
}

fn map_project(record: &Record) -> Result<Project, DataSourceError> {
    Ok(Project {
        id: record.id().ok_or(DataSourceError::Parse)?,
        name: record.display_name().unwrap_or_default().to_string(),
    })
}
