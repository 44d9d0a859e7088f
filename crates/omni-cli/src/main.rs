//! Omni - composite build model inspector
//!
//! The `omni` command drives the tooling client against builds described by
//! a JSON fixture: raw Eclipse models keyed by participant directory.
//!
//! ## Commands
//!
//! - `inspect`: fetch and print the composite project tree of some participants
//! - `cache-demo`: run fetch strategies against a caching repository

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use omni_client::fakes::MemoryBuildConnector;
use omni_client::{
    init_tracing, ActionExecutor, EclipseProjectResults, ModelType, ToolingClient, METRICS,
};
use omni_model::RawEclipseModel;
use omni_repository::{
    CompositeModelRepository, FetchStrategy, FixedRequestAttributes, TransientRequestAttributes,
};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "omni")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect composite build models", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the composite project tree of some participants
    Inspect {
        /// Fixture with raw models keyed by participant directory
        fixture: PathBuf,

        /// Participant root directory (default: every fixture entry)
        #[arg(short, long = "participant")]
        participants: Vec<PathBuf>,

        /// Model type to request
        #[arg(short, long, default_value = "EclipseProject")]
        model: String,

        /// Calling convention used for the fetch
        #[arg(long, value_enum, default_value_t = FetchMode::Async)]
        mode: FetchMode,

        /// Task to run before the model is built
        #[arg(short, long = "task")]
        tasks: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Run fetch strategies against a caching repository and show its events
    CacheDemo {
        /// Fixture with raw models keyed by participant directory
        fixture: PathBuf,

        /// Project directory of the cached request (default: first fixture entry)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Strategy to run, in order (default: cache-only, load twice, reload)
        #[arg(short, long = "strategy", value_parser = parse_strategy)]
        strategies: Vec<FetchStrategy>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FetchMode {
    Blocking,
    Callback,
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_strategy(s: &str) -> Result<FetchStrategy, String> {
    s.parse::<FetchStrategy>().map_err(|e| e.to_string())
}

const DEMO_STRATEGIES: [FetchStrategy; 4] = [
    FetchStrategy::FromCacheOnly,
    FetchStrategy::LoadIfNotCached,
    FetchStrategy::LoadIfNotCached,
    FetchStrategy::ForceReload,
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Inspect {
            fixture,
            participants,
            model,
            mode,
            tasks,
            output,
        } => cmd_inspect(&fixture, &participants, &model, mode, &tasks, output).await,
        Commands::CacheDemo {
            fixture,
            project,
            strategies,
        } => cmd_cache_demo(&fixture, project.as_deref(), &strategies).await,
    };

    METRICS.flush();
    outcome
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

type Fixture = BTreeMap<PathBuf, RawEclipseModel>;

fn load_fixture(path: &Path) -> Result<Fixture> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse fixture {}", path.display()))?;
    if fixture.is_empty() {
        bail!("Fixture {} describes no builds", path.display());
    }
    Ok(fixture)
}

/// Serve every fixture build, for its own directory and for the directory of
/// each of its projects.
fn connector_for(fixture: &Fixture) -> Arc<MemoryBuildConnector> {
    let connector = MemoryBuildConnector::new();
    for model in fixture.values() {
        for project in &model.projects {
            if !fixture.contains_key(&project.project_directory) {
                connector.insert_build(project.project_directory.clone(), model.clone());
            }
        }
    }
    for (dir, model) in fixture {
        connector.insert_build(dir.clone(), model.clone());
    }
    Arc::new(connector)
}

fn client_for(connector: &Arc<MemoryBuildConnector>) -> Result<ToolingClient> {
    let executor = ActionExecutor::current()?;
    Ok(ToolingClient::new(executor, connector.clone()))
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ProjectRow {
    participant: PathBuf,
    name: String,
    path: String,
    project_directory: PathBuf,
    source_directories: usize,
    /// `None` when the build tool cannot report task selectors.
    task_selectors: Option<usize>,
}

impl ProjectRow {
    fn from_results(results: &EclipseProjectResults) -> Vec<ProjectRow> {
        results
            .iter()
            .map(|result| {
                let project = result.model();
                ProjectRow {
                    participant: result.participant().to_path_buf(),
                    name: project.name.clone(),
                    path: project.path.clone(),
                    project_directory: project.project_directory.clone(),
                    source_directories: project.source_directories.len(),
                    task_selectors: project.task_selectors.as_ref().map(Vec::len),
                }
            })
            .collect()
    }
}

async fn fetch_projects(
    client: &ToolingClient,
    participants: &[PathBuf],
    model: &str,
    mode: FetchMode,
    tasks: &[String],
) -> Result<EclipseProjectResults> {
    let model = ModelType::from_name(model)?;
    let mut composite = client.new_composite_connector();
    for dir in participants {
        composite.add_participant(dir);
    }
    let builder = composite
        .connect()?
        .models(model)?
        .for_tasks(tasks.iter().cloned());
    info!(operation_id = %builder.operation_id(), mode = ?mode, "Fetching composite model");

    let results = match mode {
        FetchMode::Blocking => tokio::task::spawn_blocking(move || builder.get())
            .await
            .context("Blocking fetch did not complete")??,
        FetchMode::Callback => {
            let (tx, rx) = oneshot::channel();
            builder.get_with(move |outcome| {
                let _ = tx.send(outcome);
            });
            rx.await.context("Fetch ended without reporting an outcome")??
        }
        FetchMode::Async => builder.fetch().await?,
    };
    Ok(results)
}

async fn cmd_inspect(
    fixture_path: &Path,
    participants: &[PathBuf],
    model: &str,
    mode: FetchMode,
    tasks: &[String],
    output: OutputFormat,
) -> Result<()> {
    let fixture = load_fixture(fixture_path)?;
    let participants: Vec<PathBuf> = if participants.is_empty() {
        fixture.keys().cloned().collect()
    } else {
        participants.to_vec()
    };
    let connector = connector_for(&fixture);
    let client = client_for(&connector)?;

    let results = fetch_projects(&client, &participants, model, mode, tasks).await?;
    let rows = ProjectRow::from_results(&results);

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            println!(
                "Fetched {} project(s) from {} participant(s)",
                rows.len(),
                participants.len()
            );
            for row in &rows {
                let selectors = row
                    .task_selectors
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "  {:<20} {:<16} {} (via {}, {} source dir(s), {} task selector(s))",
                    row.path,
                    row.name,
                    row.project_directory.display(),
                    row.participant.display(),
                    row.source_directories,
                    selectors,
                );
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// cache-demo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct DemoStep {
    strategy: FetchStrategy,
    /// Projects returned, `None` when nothing was cached.
    projects: Option<usize>,
    fetches: usize,
    /// Publication times of the events received during this step.
    events: Vec<String>,
}

async fn run_cache_demo(
    fixture: &Fixture,
    project: &Path,
    strategies: &[FetchStrategy],
) -> Result<Vec<DemoStep>> {
    let connector = connector_for(fixture);
    let client = client_for(&connector)?;
    let repository =
        CompositeModelRepository::new(vec![FixedRequestAttributes::new(project)], client)?;
    let mut events = repository.subscribe();
    let transient = TransientRequestAttributes::default();

    let mut steps = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        let before = connector.fetches();
        let workspace = repository
            .fetch_eclipse_workspace(&transient, strategy)
            .await
            .with_context(|| format!("Fetch with strategy {strategy} failed"))?;

        let mut published = Vec::new();
        while let Ok(event) = events.try_recv() {
            published.push(event.published_at.to_rfc3339());
        }
        steps.push(DemoStep {
            strategy,
            projects: workspace.map(|w| w.len()),
            fetches: connector.fetches() - before,
            events: published,
        });
    }
    Ok(steps)
}

async fn cmd_cache_demo(
    fixture_path: &Path,
    project: Option<&Path>,
    strategies: &[FetchStrategy],
) -> Result<()> {
    let fixture = load_fixture(fixture_path)?;
    let project = match project {
        Some(project) => project.to_path_buf(),
        None => fixture
            .keys()
            .next()
            .cloned()
            .context("Fixture describes no builds")?,
    };
    let strategies = if strategies.is_empty() {
        &DEMO_STRATEGIES[..]
    } else {
        strategies
    };

    println!("Caching composite workspace of {}", project.display());
    for step in run_cache_demo(&fixture, &project, strategies).await? {
        let outcome = match step.projects {
            Some(n) => format!("{n} project(s)"),
            None => "nothing cached".to_string(),
        };
        println!(
            "  {:<20} {:<16} {} fetch(es)",
            step.strategy.as_str(),
            outcome,
            step.fetches
        );
        for published_at in &step.events {
            println!("    workspace published at {published_at}");
        }
    }
    Ok(())
}
