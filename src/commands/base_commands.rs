use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::services::chart_request::OutputFormat;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the cumulative flow chart request for a milestone
    Chart {
        /// Path to Rally config YAML
        #[arg(short, long)]
        config: String,
        /// Milestone reference, e.g. /milestone/12345
        #[arg(short, long)]
        milestone: String,
        /// Restrict the chart to these project ids (default: all projects)
        #[arg(short, long = "project")]
        projects: Vec<u64>,
        /// Uncheck these project ids after the selection is applied
        #[arg(short = 'x', long = "exclude-project")]
        excluded_projects: Vec<u64>,
        /// Output file
        #[arg(short, long)]
        output: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Print point totals and percent complete for a milestone
    Summary {
        /// Path to Rally config YAML
        #[arg(short, long)]
        config: String,
        /// Milestone reference, e.g. /milestone/12345
        #[arg(short, long)]
        milestone: String,
    },
    /// List the projects owning portfolio items in a milestone
    Projects {
        /// Path to Rally config YAML
        #[arg(short, long)]
        config: String,
        /// Milestone reference, e.g. /milestone/12345
        #[arg(short, long)]
        milestone: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
