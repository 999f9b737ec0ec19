use anyhow::Result;
use clap::Parser;
use shoprec::models::fixtures::sample_catalog;
use shoprec::services::providers::{
    BehaviorProvider, CatalogProvider, JsonFileBehavior, JsonFileCatalog, StaticBehaviorStore, StaticCatalog,
};
use shoprec::{init_tracing, AlgorithmChoice, Config, RecommendationContext, RecommendationOptions, RecommendationService};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank catalog products for a visitor", long_about = None)]
struct Args {
    /// JSON array of products; the built-in sample catalog when omitted
    #[arg(long)]
    catalog: Option<String>,

    /// JSON document with visitor profiles and peer profiles
    #[arg(long)]
    behavior: Option<String>,

    #[arg(long)]
    visitor: Option<String>,

    #[arg(short, long, default_value = "auto")]
    algorithm: String,

    #[arg(long)]
    category: Option<String>,

    #[arg(short = 'n', long)]
    limit: Option<usize>,

    #[arg(long)]
    context: Option<String>,

    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &args.log_level);
    }
    init_tracing();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut options = RecommendationOptions::new(
        args.algorithm.parse::<AlgorithmChoice>()?,
        args.limit.unwrap_or(config.recommendation.default_limit),
    );
    if let Some(category) = args.category {
        options = options.with_category(category);
    }
    if let Some(context) = &args.context {
        options = options.with_context(context.parse::<RecommendationContext>()?);
    }

    let catalog: Box<dyn CatalogProvider> = match &args.catalog {
        Some(path) => Box::new(JsonFileCatalog::new(path)),
        None => {
            info!("No catalog given, using the built-in sample catalog");
            Box::new(StaticCatalog::new(sample_catalog()))
        }
    };
    let behavior: Box<dyn BehaviorProvider> = match &args.behavior {
        Some(path) => Box::new(JsonFileBehavior::new(path)),
        None => Box::new(StaticBehaviorStore::new()),
    };

    let service = RecommendationService::new(Arc::new(config))?;
    let result = service
        .recommend_for(catalog.as_ref(), behavior.as_ref(), args.visitor.as_deref(), &options)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
