use chrono::NaiveDate;

use crate::domain::project::Project;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioItem {
    pub id: u64,
    pub project: Option<Project>,
    pub name: Option<String>,
    pub preliminary_estimate: Option<String>,
    pub actual_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub accepted_points: f64,
    pub total_points: f64,
}

impl PortfolioItem {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
