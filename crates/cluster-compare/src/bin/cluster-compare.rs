//! Scenario comparison CLI
//!
//! ```bash
//! cargo run -p cluster-compare -- \
//!     --original runs/baseline.json \
//!     --scenario runs/water_plus_20.json \
//!     --changes runs/changes.json \
//!     --correlations-for water_access
//! ```
//!
//! Prints the comparison report as JSON on stdout. Logs go to stderr
//! (`RUST_LOG=cluster_compare=debug` for matcher decisions).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cluster_compare::{
    AnalysisSession, ClusterSummary, CompareConfig, ComparisonEngine, ComparisonInput,
    FeatureAnalysisProvider, FeatureChanges, FeatureSelector, HttpAnalysisProvider,
    JsonFileStore, LocalAnalysisProvider,
};

/// Compare a scenario clustering run against its baseline
#[derive(Debug, Parser)]
#[command(name = "cluster-compare", version, about)]
struct Args {
    /// Baseline clusters (JSON array, or object with a `clusters` array)
    #[arg(long)]
    original: PathBuf,

    /// Scenario clusters, same format as --original
    #[arg(long)]
    scenario: PathBuf,

    /// Feature changes: {"feature": 0.2} or [{"feature", "percentChange"}]
    #[arg(long)]
    changes: Option<PathBuf>,

    /// Features to report on (comma separated); defaults to the saved selection
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// Save --features as the feature selection for later runs
    #[arg(long, requires = "features")]
    remember: bool,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the analysis service base URL
    #[arg(long)]
    analysis_url: Option<String>,

    /// Compute the feature analysis in-process
    #[arg(long, conflicts_with = "offline")]
    local: bool,

    /// Skip the feature analysis; sensitivity is estimated from the changes
    #[arg(long)]
    offline: bool,

    /// List every correlation of this feature
    #[arg(long)]
    correlations_for: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClusterFile {
    Bare(Vec<ClusterSummary>),
    Wrapped { clusters: Vec<ClusterSummary> },
}

fn read_clusters(path: &Path) -> Result<Vec<ClusterSummary>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: ClusterFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing clusters in {}", path.display()))?;
    Ok(match file {
        ClusterFile::Bare(clusters) | ClusterFile::Wrapped { clusters } => clusters,
    })
}

fn read_changes(path: Option<&Path>) -> Result<FeatureChanges> {
    let Some(path) = path else {
        return Ok(FeatureChanges::new());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing feature changes in {}", path.display()))
}

fn selected_features(
    args: &Args,
    config: &CompareConfig,
    changes: &FeatureChanges,
) -> Result<Vec<String>> {
    let columns: Vec<String> = changes.features().map(str::to_string).collect();
    let store = Arc::new(JsonFileStore::new(config.selection.storage_path.clone()));
    let features = FeatureSelector::resolve(&columns, &args.features, args.remember, store)?;
    if args.remember {
        tracing::info!(
            "Saved feature selection to {}",
            config.selection.storage_path.display()
        );
    }
    Ok(features)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cluster_compare=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CompareConfig::from_file(path)?,
        None => CompareConfig::default(),
    };
    if let Some(url) = &args.analysis_url {
        config.analysis.base_url = url.clone();
    }

    let changes = read_changes(args.changes.as_deref())?;
    let features = selected_features(&args, &config, &changes)?;
    let mut input = ComparisonInput::from_summaries(
        read_clusters(&args.original)?,
        read_clusters(&args.scenario)?,
        changes,
    )
    .with_selected_features(features);
    if let Some(feature) = &args.correlations_for {
        input = input.with_correlations_for(feature.clone());
    }

    tracing::info!(
        "Comparing {} original against {} scenario clusters",
        input.original.len(),
        input.scenario.len()
    );

    let engine = ComparisonEngine::new(config.comparison.clone());
    let report = if args.offline || !config.analysis.enabled {
        tracing::info!("Feature analysis disabled, using fallback estimates");
        engine.compare(&input, None)
    } else {
        let local = args.local || config.analysis.prefer_local;
        let provider: Box<dyn FeatureAnalysisProvider> = if local {
            Box::new(LocalAnalysisProvider::new())
        } else {
            Box::new(HttpAnalysisProvider::new(&config.analysis)?)
        };
        let session = AnalysisSession::new();
        engine.run(&session, provider.as_ref(), &input).await
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
