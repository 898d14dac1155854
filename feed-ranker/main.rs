use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use feed_ranker::candidate_pipeline::candidate::{Origin, PostRecord};
use feed_ranker::candidate_pipeline::feed_candidate_pipeline::PipelineClients;
use feed_ranker::candidate_pipeline::query_features::ViewerProfile;
use feed_ranker::candidate_pipeline::signals::SignalVector;
use feed_ranker::clients::content_analyzer_model::ContentAnalyzerModel;
use feed_ranker::clients::post_store::{InMemoryPostStore, RetrievalClient};
use feed_ranker::clients::viewer_store::InMemoryViewerStore;
use feed_ranker::clients::visibility_client::{FilteredReason, StaticVisibilityClient};
use feed_ranker::config::RankingConfig;
use feed_ranker::scorers::author_diversity_scorer::AuthorDiversityScorer;
use feed_ranker::scorers::oon_scorer::OONScorer;
use feed_ranker::scorers::weighted_scorer::{combine, contributions};
use feed_ranker::util::reach::ReachTier;
use feed_ranker::{FeedRanker, RankingRequest};

#[derive(Parser, Debug)]
#[command(about = "Feed ranking pipeline")]
struct Args {
    /// TOML file with every ranking parameter; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank a JSON request and print the JSON response.
    Rank {
        #[arg(long)]
        request: PathBuf,
        /// JSON array of viewer profiles.
        #[arg(long)]
        viewers: PathBuf,
        /// JSON object of post id to visibility verdict.
        #[arg(long)]
        verdicts: Option<PathBuf>,
        /// JSON array of posts to retrieve from, in addition to the request pool.
        #[arg(long)]
        posts: Option<PathBuf>,
    },
    /// Combine one signal vector and print the score breakdown.
    Score {
        /// JSON object of channel name to probability; all 19 are required.
        #[arg(long)]
        signals: PathBuf,
        #[arg(long)]
        out_of_network: bool,
        /// Rank of the post among its author's posts in the batch.
        #[arg(long, default_value_t = 1)]
        position: usize,
    },
    /// Print the author diversity multiplier for the first N posts.
    Diversity {
        #[arg(long, default_value_t = 6)]
        posts: usize,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<RankingConfig> {
    match path {
        Some(path) => RankingConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(RankingConfig::default()),
    }
}

async fn rank(
    config: RankingConfig,
    request: &Path,
    viewers: &Path,
    verdicts: Option<&Path>,
    posts: Option<&Path>,
) -> Result<()> {
    let request: RankingRequest = read_json(request)?;
    let profiles: Vec<ViewerProfile> = read_json(viewers)?;
    let verdicts: HashMap<u64, FilteredReason> = match verdicts {
        Some(path) => read_json(path)?,
        None => HashMap::new(),
    };
    let retrieval = match posts {
        Some(path) => {
            let records: Vec<PostRecord> = read_json(path)?;
            let store = InMemoryPostStore::new(0);
            store.insert_posts(records);
            info!("Loaded {} posts for retrieval", store.len());
            Some(Arc::new(store) as Arc<dyn RetrievalClient>)
        }
        None => None,
    };
    info!(
        "Loaded {} viewer profiles, {} visibility verdicts",
        profiles.len(),
        verdicts.len()
    );

    let clients = PipelineClients {
        model: Arc::new(ContentAnalyzerModel),
        retrieval,
        viewer_store: Arc::new(InMemoryViewerStore::new(profiles)),
        visibility: Arc::new(StaticVisibilityClient::new(verdicts)),
    };
    let ranker = FeedRanker::new(config, clients).context("Failed to build ranking pipeline")?;
    let response = ranker.rank(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn score(config: &RankingConfig, signals: &Path, out_of_network: bool, position: usize) -> Result<()> {
    let named: HashMap<String, f64> = read_json(signals)?;
    let vector = SignalVector::from_named(&named).context("Invalid signal vector")?;
    let weights = config.weight_table()?;

    for (signal, contribution) in contributions(&vector, &weights) {
        println!("{:<24} {:>8.4}", signal.name(), contribution);
    }
    let raw = combine(&vector, &weights);
    let diversity = AuthorDiversityScorer::new(config.diversity_base, config.diversity_floor)
        .multiplier(position);
    let origin = OONScorer {
        factor: config.oon_factor,
    }
    .multiplier(if out_of_network {
        Origin::OutOfNetwork
    } else {
        Origin::InNetwork
    });
    let final_score = raw * diversity * origin;
    let tier = ReachTier::from_score(final_score);

    println!("raw score:            {:.4} (max {:.4})", raw, weights.max_score());
    println!("diversity multiplier: {:.4}", diversity);
    println!("origin multiplier:    {:.4}", origin);
    println!("final score:          {:.4}", final_score);
    println!("reach:                {:?}, {}", tier, tier.describe());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Rank {
            request,
            viewers,
            verdicts,
            posts,
        } => {
            rank(
                config,
                &request,
                &viewers,
                verdicts.as_deref(),
                posts.as_deref(),
            )
            .await
        }
        Command::Score {
            signals,
            out_of_network,
            position,
        } => score(&config, &signals, out_of_network, position),
        Command::Diversity { posts } => {
            let scorer = AuthorDiversityScorer::new(config.diversity_base, config.diversity_floor);
            for position in 1..=posts {
                println!("{:>3} {:.4}", position, scorer.multiplier(position));
            }
            Ok(())
        }
    }
}
