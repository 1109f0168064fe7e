use clap::{Parser, ValueEnum};
use debtplan::application::advisor::{AdvisorService, DEFAULT_ADVISOR_TIMEOUT};
use debtplan::application::{
    DebtMetrics, compare_strategies, compute_metrics, run_strategy, validate,
};
use debtplan::domain::debt::Debt;
use debtplan::domain::ports::ProfileStoreBox;
use debtplan::domain::profile::{Advice, FinancialProfile};
use debtplan::domain::schedule::{Strategy, StrategyComparison, StrategyResult};
use debtplan::error::PlanError;
use debtplan::infrastructure::command_advisor::CommandAdvisor;
use debtplan::infrastructure::in_memory::InMemoryProfileStore;
use debtplan::infrastructure::rate_limiter::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiter};
use debtplan::interfaces::csv::debt_reader::DebtReader;
use debtplan::interfaces::csv::schedule_writer::ScheduleWriter;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    /// Payment schedule as CSV
    Csv,
    /// Full report as JSON
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input debts CSV file
    input: PathBuf,

    /// Total amount available for debt payments each month
    #[arg(long)]
    budget: Decimal,

    /// Repayment strategy: snowball, avalanche or hybrid
    #[arg(long, default_value = "avalanche")]
    strategy: Strategy,

    /// Monthly income, used for the debt-to-income ratio
    #[arg(long, default_value = "0")]
    income: Decimal,

    /// Simulate every strategy and report the cheapest
    #[arg(long)]
    compare: bool,

    /// Free-text goal passed on to the advisor
    #[arg(long)]
    goal: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Shell command that reads a prompt on stdin and answers on stdout
    #[arg(long, env = "DEBTPLAN_ADVISOR_CMD")]
    advisor_cmd: Option<String>,

    /// Advisor requests allowed per minute
    #[arg(long, env = "DEBTPLAN_RATE_LIMIT", default_value_t = DEFAULT_REQUESTS_PER_MINUTE)]
    rate_limit: usize,

    /// Seconds to wait for the advisor
    #[arg(long, default_value_t = DEFAULT_ADVISOR_TIMEOUT.as_secs())]
    advisor_timeout: u64,
}

#[derive(Serialize)]
struct Report<'a> {
    plan: Option<&'a StrategyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<&'a StrategyComparison>,
    metrics: Option<&'a DebtMetrics>,
    problems: Vec<String>,
    advice: Option<&'a Advice>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<ProfileStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = debtplan::infrastructure::rocksdb::RocksDBProfileStore::open(path)?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryProfileStore::new()))
        }
        None => Ok(Box::new(InMemoryProfileStore::new())),
    }
}

fn write_report(report: &Report) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, report).into_diagnostic()?;
    writeln!(out).into_diagnostic()?;
    Ok(())
}

fn read_debts(input: PathBuf) -> Result<Vec<Debt>> {
    let file = File::open(input).into_diagnostic()?;
    let mut debts = Vec::new();
    for debt in DebtReader::new(file).debts() {
        match debt {
            Ok(debt) => debts.push(debt),
            Err(e) => eprintln!("Error reading debt: {}", e),
        }
    }
    Ok(debts)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let debts = read_debts(cli.input)?;

    let problems: Vec<String> = validate(&debts).iter().map(|i| i.to_string()).collect();
    for problem in &problems {
        eprintln!("Validation: {}", problem);
    }
    if !problems.is_empty() {
        let count = problems.len();
        if let OutputFormat::Json = cli.format {
            write_report(&Report {
                plan: None,
                comparison: None,
                metrics: None,
                problems,
                advice: None,
            })?;
        }
        return Err(PlanError::Validation(format!(
            "{count} problem(s) in the input, nothing was simulated"
        ))
        .into());
    }

    let metrics = compute_metrics(&debts, cli.income)?;
    let comparison = if cli.compare || cli.advisor_cmd.is_some() {
        Some(compare_strategies(&debts, cli.budget)?)
    } else {
        None
    };
    let plan = match (&comparison, cli.compare) {
        (Some(comparison), true) => comparison
            .recommended_result()
            .cloned()
            .ok_or_else(|| PlanError::Validation("no recommended strategy".to_string()))?,
        (Some(comparison), false) => comparison
            .result(cli.strategy)
            .cloned()
            .ok_or_else(|| PlanError::Validation(format!("no result for {}", cli.strategy)))?,
        (None, _) => run_strategy(&debts, cli.budget, cli.strategy)?,
    };

    let profile = FinancialProfile {
        monthly_income: cli.income,
        debts,
        goal: cli.goal,
    };
    let store = open_store(cli.db_path)?;
    store.save_profile(profile.clone()).await?;

    let mut advice = None;
    if let (Some(command), Some(comparison)) = (cli.advisor_cmd, &comparison) {
        let service = AdvisorService::new(
            Box::new(CommandAdvisor::new(command)),
            store,
            RateLimiter::per_minute(cli.rate_limit),
        )
        .with_timeout(Duration::from_secs(cli.advisor_timeout));

        match service.advise(&profile, &metrics, comparison).await {
            Ok(answer) => advice = Some(answer),
            Err(e) if e.is_external() => warn!("Advice unavailable: {}", e),
            Err(e) => return Err(e.into()),
        }
    }

    match cli.format {
        OutputFormat::Csv => {
            eprintln!(
                "Strategy {}: {} months, total interest {}, payoff order [{}]",
                plan.strategy,
                plan.months,
                plan.total_interest.round_dp(2).normalize(),
                plan.payoff_order.join(", ")
            );
            if let Some(advice) = &advice {
                eprintln!("{}", serde_json::to_string_pretty(advice).into_diagnostic()?);
            }
            ScheduleWriter::new(io::stdout().lock()).write_periods(&plan.periods)?;
        }
        OutputFormat::Json => {
            write_report(&Report {
                plan: Some(&plan),
                comparison: comparison.as_ref().filter(|_| cli.compare),
                metrics: Some(&metrics),
                problems,
                advice: advice.as_ref(),
            })?;
        }
    }

    Ok(())
}
