use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub id: u64,
    pub reference: String,
    pub target_date: Option<NaiveDate>,
}

impl Milestone {
    /// Milestone with the relative ref other objects use to point at it,
    /// whatever form the caller's reference came in.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            reference: format!("/milestone/{id}"),
            target_date: None,
        }
    }
}
