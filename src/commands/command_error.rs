use std::io;

use thiserror::Error;

use crate::services::dashboard::DashboardError;
use crate::services::data_source::DataSourceError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to parse Rally config: {0}")]
    Config(DataSourceError),
    #[error("Failed to load Rally auth: {0}")]
    Auth(DataSourceError),
    #[error("Failed to create RallyApiClient: {0}")]
    Client(DataSourceError),
    #[error("Failed to load milestone scope: {0}")]
    Dashboard(#[from] DashboardError),
    #[error("Failed to write output file: {0}")]
    Write(#[from] io::Error),
}
