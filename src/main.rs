use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use pos_insights::logging::init_logging;
use pos_insights::{analyze, load_branch, BranchSet, DashboardReport, InsightsConfig, InsightsError, RawUpload, View};

/// Sales analytics over point-of-sale exports.
#[derive(Debug, Parser)]
#[command(name = "pos-insights", version)]
struct Cli {
    /// A branch as LABEL=ITEMS_FILE,PERIODS_FILE (repeatable).
    #[arg(long = "branch", value_name = "LABEL=ITEMS,PERIODS", required = true)]
    branches: Vec<String>,

    /// Branch label to analyze, or "consolidated".
    #[arg(long, default_value = "consolidated")]
    view: String,

    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

struct BranchArg {
    label: String,
    items: PathBuf,
    periods: PathBuf,
}

fn parse_branch_arg(raw: &str) -> Result<BranchArg, InsightsError> {
    let invalid = || InsightsError::Config(format!("expected LABEL=ITEMS,PERIODS, got '{raw}'"));
    let (label, files) = raw.split_once('=').ok_or_else(invalid)?;
    let (items, periods) = files.split_once(',').ok_or_else(invalid)?;
    if label.trim().is_empty() {
        return Err(invalid());
    }
    Ok(BranchArg {
        label: label.trim().to_string(),
        items: PathBuf::from(items.trim()),
        periods: PathBuf::from(periods.trim()),
    })
}

fn run(cli: &Cli, config: &InsightsConfig) -> Result<DashboardReport, InsightsError> {
    let mut branches = BranchSet::new();
    for raw in &cli.branches {
        let arg = parse_branch_arg(raw)?;
        let tables = load_branch(
            &RawUpload::from_path(&arg.items)?,
            &RawUpload::from_path(&arg.periods)?,
            &arg.label,
            &config.analysis,
        )?;
        branches.insert(tables)?;
    }
    analyze(&branches, &View::parse(&cli.view), &config.analysis)
}

fn print_text(report: &DashboardReport) {
    let k = &report.kpis;
    println!("== {} ==", report.view);
    println!("Revenue          {:>14.2}", k.total_revenue);
    println!("Units            {:>14.0}", k.total_units);
    println!("Tickets          {:>14.0}", k.total_tickets);
    println!("Average ticket   {:>14.2}", k.avg_ticket);
    println!("Units per ticket {:>14.2}", k.units_per_ticket);
    println!("Dining share     {:>13.1}%", k.dining_share_pct);
    println!("Counter share    {:>13.1}%", k.counter_share_pct);

    println!("\nABC summary\n{}", report.abc.summary);
    println!("\nTop A items\n{}", report.top_a);
    for slice in &report.top_categories {
        println!("\n{} ({:.2})\n{}", slice.category, slice.revenue, slice.items);
    }
    println!("\nDead stock\n{}", report.dead_stock);
    println!("\nPeriods\n{}", report.periods);
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match InsightsConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::from(2);
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{e}");
    }

    let report = match run(&cli, &config) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, recoverable = e.is_recoverable(), "analysis failed");
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match report.to_json().map(|v| serde_json::to_string_pretty(&v)) {
            Ok(Ok(text)) => println!("{text}"),
            Ok(Err(e)) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("{}", e.user_message());
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_text(&report);
    }
    ExitCode::SUCCESS
}
