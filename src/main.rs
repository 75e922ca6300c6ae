//! Listing moderation service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use listing_moderation::{
    config::{Args, NotifierKind},
    db::{MongoClient, MongoListingStore},
    logging,
    notify::{AdminNotifier, LogNotifier, MongoNotifier, NatsClient, NatsNotifier},
    server,
    store::{InMemoryListingStore, ListingStore},
    AppState, ContentScorer, ListingService, ReportService, TermList,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(&args.log_level, args.log_json);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Listing Moderation Service");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} / {}", args.mongodb_uri, args.mongodb_db);
    info!("Notifier: {:?}", args.notifier);
    info!("======================================");

    let terms = match &args.terms_file {
        Some(path) => TermList::from_json_file(path)?,
        None => TermList::default(),
    };
    info!("Prohibited term list: {} terms", terms.len());
    let scorer = Arc::new(ContentScorer::new(terms));

    // Connect to MongoDB (optional in dev mode)
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => Some(client),
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                None
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    let store: Arc<dyn ListingStore> = match &mongo {
        Some(client) => Arc::new(MongoListingStore::new(client).await?),
        None => Arc::new(InMemoryListingStore::new()),
    };

    let notifier = build_notifier(&args, mongo.as_ref()).await?;

    let listings = ListingService::new(store.clone(), scorer);
    let reports = ReportService::new(store, notifier.clone());
    let state = Arc::new(AppState::new(listings, reports, notifier.name()));

    tokio::select! {
        result = server::run(state, args.listen) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn build_notifier(
    args: &Args,
    mongo: Option<&MongoClient>,
) -> anyhow::Result<Arc<dyn AdminNotifier>> {
    let notifier: Arc<dyn AdminNotifier> = match args.notifier {
        NotifierKind::Log => Arc::new(LogNotifier),
        NotifierKind::Mongo => match mongo {
            Some(client) => Arc::new(MongoNotifier::new(client).await?),
            None => {
                warn!("MongoDB unavailable, admin notifications go to the log");
                Arc::new(LogNotifier)
            }
        },
        NotifierKind::Nats => match NatsClient::new(&args.nats, "listing-moderation").await {
            Ok(client) => Arc::new(NatsNotifier::new(client)),
            Err(e) => {
                if args.dev_mode {
                    warn!("NATS connection failed (dev mode, notifying via log): {}", e);
                    Arc::new(LogNotifier)
                } else {
                    error!("NATS connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        },
    };

    Ok(notifier)
}
