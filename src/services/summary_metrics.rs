use crate::domain::portfolio_item::PortfolioItem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub accepted_points: f64,
    pub total_points: f64,
    /// `None` when there are no points to complete.
    pub percent_complete: Option<f64>,
}

impl Summary {
    pub fn display_percent(&self) -> String {
        match self.percent_complete {
            Some(percent) => format!("{percent:.2}"),
            None => "n/a".to_string(),
        }
    }
}

pub fn compute_summary(items: &[PortfolioItem]) -> Summary {
    let accepted_points: f64 = items.iter().map(|item| item.accepted_points).sum();
    let total_points: f64 = items.iter().map(|item| item.total_points).sum();
    let percent_complete = if total_points == 0.0 {
        None
    } else {
        Some(accepted_points / total_points * 100.0)
    };

    Summary {
        accepted_points,
        total_points,
        percent_complete,
    }
}
