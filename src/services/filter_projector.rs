use std::collections::HashSet;

use crate::domain::portfolio_item::PortfolioItem;
use crate::domain::project::Project;

/// Distinct projects referenced by `items`, in first-seen order.
pub fn project_projects(items: &[PortfolioItem]) -> Vec<Project> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| item.project.as_ref())
        .filter(|project| seen.insert(project.id))
        .cloned()
        .collect()
}
