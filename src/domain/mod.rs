pub mod milestone;
pub mod portfolio_item;
pub mod project;
pub mod reference;
pub mod scope;
