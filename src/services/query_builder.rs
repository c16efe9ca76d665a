use serde::Serialize;

use crate::domain::scope::{ActiveProjectSelection, AggregatedScope};

/// Set-membership predicate, serialized as `{"$in": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InSet<T> {
    #[serde(rename = "$in")]
    pub values: Vec<T>,
}

impl<T> InSet<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotFind {
    #[serde(rename = "_TypeHierarchy")]
    pub type_hierarchy: InSet<String>,
    #[serde(rename = "_ItemHierarchy")]
    pub item_hierarchy: InSet<u64>,
    #[serde(rename = "_ProjectHierarchy")]
    pub project_hierarchy: InSet<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSort {
    #[serde(rename = "_ValidFrom")]
    pub valid_from: i8,
}

/// Snapshot store query for the leaf items below a milestone's portfolio items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotQuery {
    pub find: SnapshotFind,
    pub fetch: Vec<String>,
    pub hydrate: Vec<String>,
    pub sort: SnapshotSort,
}

impl SnapshotQuery {
    /// True when any `$in` set is empty, i.e. no snapshot can match.
    pub fn matches_nothing(&self) -> bool {
        self.find.type_hierarchy.values.is_empty()
            || self.find.item_hierarchy.values.is_empty()
            || self.find.project_hierarchy.values.is_empty()
    }
}

pub fn build_query(scope: &AggregatedScope, active_projects: &ActiveProjectSelection) -> SnapshotQuery {
    let state_field = scope.state_field.clone();
    SnapshotQuery {
        find: SnapshotFind {
            type_hierarchy: InSet::new(vec![scope.leaf_type.clone()]),
            item_hierarchy: InSet::new(scope.portfolio_item_ids()),
            project_hierarchy: InSet::new(active_projects.ids()),
        },
        fetch: vec![
            state_field.clone(),
            "PlanEstimate".to_string(),
            "PortfolioItem".to_string(),
            "LeafStoryPlanEstimateTotal".to_string(),
            "State".to_string(),
        ],
        hydrate: vec![state_field, "State".to_string()],
        sort: SnapshotSort { valid_from: 1 },
    }
}
