use std::collections::BTreeSet;

use crate::domain::milestone::Milestone;
use crate::domain::portfolio_item::PortfolioItem;
use crate::domain::project::Project;

/// Everything one milestone load produced. Replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedScope {
    pub milestone: Milestone,
    pub portfolio_item_type: Option<String>,
    pub portfolio_items: Vec<PortfolioItem>,
    /// Leaf type the workflow states were loaded for.
    pub leaf_type: String,
    pub state_field: String,
    pub schedule_states: Vec<String>,
}

impl AggregatedScope {
    pub fn portfolio_item_ids(&self) -> Vec<u64> {
        self.portfolio_items.iter().map(|item| item.id).collect()
    }
}

/// Project ids whose checkbox is currently checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveProjectSelection {
    project_ids: BTreeSet<u64>,
}

impl ActiveProjectSelection {
    pub fn all_of(projects: &[Project]) -> Self {
        Self {
            project_ids: projects.iter().map(|project| project.id).collect(),
        }
    }

    pub fn from_ids<I: IntoIterator<Item = u64>>(ids: I) -> Self {
        Self {
            project_ids: ids.into_iter().collect(),
        }
    }

    pub fn set(&mut self, project_id: u64, checked: bool) {
        if checked {
            self.project_ids.insert(project_id);
        } else {
            self.project_ids.remove(&project_id);
        }
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        self.project_ids.iter().copied().collect()
    }
}
