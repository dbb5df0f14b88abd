use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use seo_variations::config::{Config, ConfigOverrides};
use seo_variations::metrics::metric_sequence;
use seo_variations::notify::{read_log_tail, NotifySink, RunReport, StdoutSink, TelegramSink};
use seo_variations::output::{render_json, render_variation_table, variations_to_csv};
use seo_variations::pipeline::assemble::VariationTable;
use seo_variations::run::run_analysis;
use seo_variations::schedule;
use seo_variations::store::CsvStore;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "seo-variations",
    about = "Weekly SEO variation analysis over search-performance and site-analytics worksheets"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long = "data-dir")]
    data_dir: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the weekly variation table and write it to the store.
    Run {
        /// Compute without writing the output worksheet.
        #[arg(long)]
        dry_run: bool,
        /// Override the output worksheet name.
        #[arg(long = "output-worksheet")]
        output_worksheet: Option<String>,
    },
    /// Decide whether the cadence window allows a run today.
    Guard,
    /// Send a run-outcome notification through the configured sinks.
    Notify {
        #[arg(long)]
        status: String,
        #[arg(long = "variation-count")]
        variation_count: Option<usize>,
        #[arg(long = "summary-file")]
        summary_file: Option<PathBuf>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let output_worksheet = match &cli.command {
        Commands::Run {
            output_worksheet, ..
        } => output_worksheet.clone(),
        _ => None,
    };
    config.apply_overrides(ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        output_worksheet,
    });

    match &cli.command {
        Commands::Run { dry_run, .. } => {
            let store = CsvStore::open(config.resolved_data_dir())?;
            let metrics = metric_sequence();
            let table = run_analysis(&store, &config, &metrics, !dry_run)?;
            print_variations(&table, cli.output)?;
        }
        Commands::Guard => handle_guard(&config)?,
        Commands::Notify {
            status,
            variation_count,
            summary_file,
        } => {
            handle_notify(
                &config,
                status,
                *variation_count,
                summary_file.as_deref(),
            )
            .await?;
        }
        Commands::Config { init, show } => {
            if *init {
                Config::write_template(&config_path)?;
                println!("Wrote config template to {}", config_path.display());
            }
            if *show || !*init {
                println!("{}", render_json(&config)?);
            }
        }
    }

    Ok(())
}

fn handle_guard(config: &Config) -> Result<()> {
    let anchor = std::env::var("ANCHOR_TIMESTAMP_UTC")
        .unwrap_or_else(|_| config.schedule.anchor_utc.clone());
    let decision = schedule::evaluate(&anchor, config.schedule.cadence_days, Utc::now())?;

    print!("{}", decision.output_lines());
    if let Ok(output_path) = std::env::var("GITHUB_OUTPUT") {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output_path)?;
        file.write_all(decision.output_lines().as_bytes())?;
    }
    Ok(())
}

async fn handle_notify(
    config: &Config,
    status: &str,
    variation_count: Option<usize>,
    summary_file: Option<&std::path::Path>,
) -> Result<()> {
    let log_tail = if status.eq_ignore_ascii_case("success") {
        None
    } else {
        summary_file.and_then(|path| read_log_tail(path, 40))
    };
    let report = RunReport {
        status: status.to_string(),
        executed_at: Utc::now().to_rfc3339(),
        variation_count,
        log_tail,
    };

    let mut sinks: Vec<Box<dyn NotifySink>> = Vec::new();
    if config.notify.enable_stdout {
        sinks.push(Box::new(StdoutSink));
    }
    if let Some((token, chat_id)) = config.telegram_credentials() {
        sinks.push(Box::new(TelegramSink::new(token, chat_id)));
    }

    for sink in &sinks {
        sink.send(&report).await?;
    }
    info!(sinks = sinks.len(), "notification dispatched");
    Ok(())
}

fn print_variations(table: &VariationTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_variation_table(table)),
        OutputFormat::Json => println!("{}", render_json(table)?),
        OutputFormat::Csv => println!("{}", variations_to_csv(table)?),
    }
    Ok(())
}
