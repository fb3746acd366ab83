use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;
use crate::models::{OutputFormat, ReportMode};

#[derive(Parser)]
#[command(name = "worklog-report")]
#[command(about = "Generate reports of your Jira worklogs", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a worklog report.
    ///
    /// From the 16th of a month the current month to date is reported,
    /// before that the whole previous month.
    Report(ReportArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Row per worklog entry (detailed) or per day (daily)
    #[arg(short, long, value_enum)]
    pub mode: Option<ReportMode>,

    /// Delimited text on stdout (csv) or a printable document file (document)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Report this month (YYYY-MM) instead of picking one from today's date
    #[arg(long)]
    pub month: Option<String>,

    /// Output file for document reports
    #[arg(short, long)]
    pub output: Option<String>,

    /// Title shown before the month in document reports
    #[arg(short, long)]
    pub title: Option<String>,

    /// Field delimiter for delimited text (single character or "tab")
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Jira site, e.g. acme.atlassian.net
    #[arg(long, env = "JIRA_HOST")]
    pub host: Option<String>,

    /// Account email; only worklogs by this author are reported
    #[arg(long, env = "JIRA_EMAIL")]
    pub email: Option<String>,

    /// Jira API token
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl ReportArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            email: self.email.clone(),
            api_token: self.token.clone(),
            mode: self.mode,
            format: self.format,
            delimiter: self.delimiter.clone(),
            title: self.title.clone(),
            output: self.output.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Initialize default configuration
    Init,
    /// Open configuration file in editor
    Edit,
    /// Show current configuration
    Show,
}
