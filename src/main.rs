use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use incident_triage::classify;
use incident_triage::io as boundary;
use incident_triage::{AnalysisResult, Evaluator, IncidentRecord, ScoringConfig};

#[derive(Parser)]
#[command(
    name = "incident-triage",
    about = "Risk scoring and triage recommendations for operational incidents",
    version,
    long_about = None
)]
struct Cli {
    /// Scoring table overrides (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an incident read as JSON (default)
    Analyze(AnalyzeArgs),

    /// Derive a severity from the incident's severityHint and error text
    Classify {
        /// Read the incident from a file instead of stdin
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Print the effective scoring tables as TOML
    Tables,
}

#[derive(Args, Default)]
struct AnalyzeArgs {
    /// Read the incident from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Input is a JSON array of incidents; output is an array of results
    #[arg(long)]
    batch: bool,

    /// Write a per-factor breakdown to stderr
    #[arg(long)]
    explain: bool,

    /// Fill a missing severity from severityHint before scoring
    #[arg(long)]
    classify: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match &cli.config {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("loading scoring tables from {}", path.display()))?,
        None => ScoringConfig::load_or_default(),
    };

    match cli.command.unwrap_or(Commands::Analyze(AnalyzeArgs::default())) {
        Commands::Analyze(args) => {
            let evaluator: Evaluator = Evaluator::new(Arc::new(config));
            analyze(&evaluator, &args)?;
        }
        Commands::Classify { input } => {
            let document = boundary::read_document(open_input(input.as_deref())?)
                .context("reading incident input")?;
            let record = boundary::parse_record(document)?;
            let verdict = classify::classify_record(&record);
            tracing::info!(severity = %verdict.severity, "incident classified");
            boundary::write_pretty(std::io::stdout().lock(), &verdict)?;
        }
        Commands::Tables => {
            let rendered = toml::to_string_pretty(&config).context("rendering scoring tables")?;
            print!("{}", rendered);
        }
    }

    Ok(())
}

fn analyze(evaluator: &Evaluator, args: &AnalyzeArgs) -> Result<()> {
    let document = boundary::read_document(open_input(args.input.as_deref())?)
        .context("reading incident input")?;

    if args.batch {
        let records = boundary::parse_batch(document)?;
        tracing::info!(count = records.len(), "scoring incident batch");
        let results: Vec<AnalysisResult> = records
            .into_iter()
            .map(|record| score(evaluator, record, args))
            .collect::<Result<_>>()?;
        boundary::write_pretty(std::io::stdout().lock(), &results)?;
    } else {
        let record = boundary::parse_record(document)?;
        let result = score(evaluator, record, args)?;
        boundary::write_pretty(std::io::stdout().lock(), &result)?;
    }

    Ok(())
}

fn score(
    evaluator: &Evaluator,
    mut record: IncidentRecord,
    args: &AnalyzeArgs,
) -> Result<AnalysisResult> {
    if args.classify {
        classify::fill_missing_severity(&mut record);
    }

    let explained = evaluator.evaluate_explained(&record);
    tracing::info!(
        service = record.service(),
        risk_score = explained.result.risk_score,
        recommendation = %explained.result.recommendation,
        "incident scored"
    );

    if args.explain {
        boundary::write_pretty(std::io::stderr().lock(), &explained.breakdown)
            .context("writing score breakdown")?;
    }

    Ok(explained.result)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening incident input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
