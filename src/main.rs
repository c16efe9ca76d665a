mod commands;
mod domain;
mod services;
#[cfg(test)]
mod test_support;

use std::env;
use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::chart_cmd::chart_command;
use crate::commands::projects_cmd::projects_command;
use crate::commands::summary_cmd::summary_command;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MILESTONE_CFD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("milestone_cfd=info,warn"));
    let format = env::var("MILESTONE_CFD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing();

    let result = match args.command {
        Commands::Chart {
            config,
            milestone,
            projects,
            excluded_projects,
            output,
            format,
        } => {
            chart_command(
                &config,
                &milestone,
                &projects,
                &excluded_projects,
                &output,
                format,
            )
            .await
        }
        Commands::Summary { config, milestone } => summary_command(&config, &milestone).await,
        Commands::Projects { config, milestone } => projects_command(&config, &milestone).await,
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
