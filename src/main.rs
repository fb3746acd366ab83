mod adf;
mod cli;
mod config;
mod error;
mod jira;
mod models;
mod period;
mod report;
mod worklog;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{error, info};

use cli::{Cli, Commands, ConfigAction, ReportArgs};
use config::EffectiveConfig;
use jira::JiraClient;
use models::OutputFormat;
use period::ReportPeriod;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Report(args) => cmd_report(args).await,
        Commands::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Edit => cmd_config_edit(),
            ConfigAction::Show => cmd_config_show(),
        },
    };

    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

async fn cmd_report(args: ReportArgs) -> Result<()> {
    let config = EffectiveConfig::load(args.overrides())?;

    let period = match args.month {
        Some(ref month) => ReportPeriod::parse_month(month)?,
        None => ReportPeriod::for_today(Local::now().date_naive()),
    };

    info!(
        "Generating {} {} report for {} ({})",
        config.mode.as_str(),
        config.format.as_str(),
        config.jira.email,
        period
    );

    let client = JiraClient::new(config.jira.clone()).context("Failed to create Jira client")?;
    let entries = worklog::collect_entries(&client, &period, &config.jira.email).await?;
    let table = report::build_table(&entries, config.mode, config.format);

    match config.format {
        OutputFormat::Csv => {
            let output = report::csv::generate_string(&table, config.delimiter)?;
            print!("{}", output);
        }
        OutputFormat::Document => {
            let html = report::html::generate(
                &table,
                config.title.as_deref(),
                &period.month_label(config.locale),
            );
            let backend = report::document::backend_for(config.converter.as_deref());
            report::document::write_document(backend.as_ref(), &html, &config.output_file)?;
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = config::init_global_config()?;
    println!("Configuration initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_edit() -> Result<()> {
    let path = config::global_config_path()?;

    if !path.exists() {
        config::init_global_config()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to open editor: {}", editor))?;

    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = config::load_global_config()?;
    let toml = toml::to_string_pretty(&config.redacted())?;
    println!("{}", toml);
    Ok(())
}
