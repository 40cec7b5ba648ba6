use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use vizstream::{build_chart_or_empty, ChunkStream, Config, Planner, Table};
use vizstream_feeds::transcript;

#[derive(Parser)]
#[command(name = "vizstream", about = "Streamed chart planning from a generative backend")]
struct Cli {
    /// Log at debug level to stderr (RUST_LOG overrides).
    #[arg(long, global = true)]
    debug: bool,

    /// Config file to use instead of ~/.config/vizstream/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask for a chart plan and print the aggregated chart config.
    Plan(PlanArgs),
    /// Ask which chart types suit an uploaded table.
    Suggest(SuggestArgs),
    /// Print the schema of a table.
    Schema(SourceArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Local delimited-text file with a header row.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Id of a table already uploaded to the backend.
    #[arg(long)]
    csv_id: Option<String>,
}

#[derive(Args)]
struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// What the chart should show, in plain language.
    #[arg(long)]
    query: String,

    /// Replay a recorded event stream instead of calling the backend ("-" for stdin).
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Chart id. Defaults to the current Unix time in milliseconds.
    #[arg(long)]
    id: Option<String>,

    /// Override the title derived from the plan's axis labels.
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args)]
struct SuggestArgs {
    #[arg(long)]
    csv_id: String,

    #[arg(long)]
    query: String,

    /// Replay a recorded event stream instead of calling the backend ("-" for stdin).
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    tracing::debug!(backend = %config.backend.base_url, "config loaded");
    let planner = Planner::new(config);

    match cli.command {
        Command::Plan(args) => plan(&planner, args).await,
        Command::Suggest(args) => suggest(&planner, args).await,
        Command::Schema(args) => schema(&planner, args).await,
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn plan(planner: &Planner, args: PlanArgs) -> anyhow::Result<()> {
    let table = load_table(planner, &args.source).await?;

    let plan = match &args.transcript {
        Some(path) => planner.plan_from(open_transcript(path).await?).await?,
        None => planner.plan(&table, &args.query).await?,
    };
    let plan = plan.context("could not determine chart from backend output")?;

    let id = args
        .id
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());
    let mut chart = build_chart_or_empty(id, &table, &plan);
    if let Some(title) = args.title {
        chart.title = title;
    }
    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}

async fn suggest(planner: &Planner, args: SuggestArgs) -> anyhow::Result<()> {
    let suggestions = match &args.transcript {
        Some(path) => planner.suggest_from(open_transcript(path).await?).await?,
        None => planner.suggest(&args.csv_id, &args.query).await?,
    };
    let suggestions = suggestions.context("backend returned no chart suggestions")?;
    println!("{}", serde_json::to_string_pretty(&suggestions)?);
    Ok(())
}

async fn schema(planner: &Planner, args: SourceArgs) -> anyhow::Result<()> {
    let schema = match (&args.csv, &args.csv_id) {
        (_, Some(id)) => planner.backend().fetch_schema(id).await?,
        _ => planner.schema_of(&load_table(planner, &args).await?),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_table(planner: &Planner, source: &SourceArgs) -> anyhow::Result<Table> {
    match (&source.csv, &source.csv_id) {
        (Some(path), _) => {
            let delimiter = planner.config().table.delimiter_byte();
            Table::from_csv_path(path, delimiter)
                .with_context(|| format!("reading {}", path.display()))
        }
        (None, Some(id)) => Ok(planner.backend().fetch_table(id).await?),
        (None, None) => anyhow::bail!("either --csv or --csv-id is required"),
    }
}

async fn open_transcript(path: &Path) -> anyhow::Result<ChunkStream> {
    if path.as_os_str() == "-" {
        return Ok(transcript::stdin());
    }
    transcript::open(path)
        .await
        .with_context(|| format!("opening transcript {}", path.display()))
}
