pub mod base_commands;
pub mod chart_cmd;
pub mod command_error;
pub mod connect;
pub mod projects_cmd;
pub mod report_format;
pub mod summary_cmd;
