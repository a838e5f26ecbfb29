//! vendorscope Server
//!
//! HTTP service answering "does this company use the vendor's software?"
//! from public web evidence.
//!
//! - [`config`]: CLI, credentials and the YAML server configuration
//! - [`search`]: search provider client
//! - [`fetch`] / [`verifier`]: deep-context page fetch and verification
//! - [`engine`]: run orchestration, caching and emergency save
//! - [`routes`]: axum router

pub mod config;
pub mod engine;
pub mod fetch;
pub mod routes;
pub mod search;
pub mod verifier;

pub use config::{Cli, Credentials, ServerConfig};
pub use engine::{EngineSettings, RunError, UsageEngine};
pub use fetch::HttpPageFetcher;
pub use routes::{create_router, AppState, UsageCheckRequest};
pub use search::{SearchClient, SerperClient};
pub use verifier::OpenAiVerifier;

use std::sync::Arc;
use tracing::{info, warn};
use vendorscope_classifiers::{DeepContext, Lexicon, VendorProfile};
use vendorscope_policy::EnginePolicy;
use vendorscope_store::FileStore;

/// Build the engine described by `config`, backed by the file store
pub async fn build_engine(
    config: &ServerConfig,
    credentials: &Credentials,
) -> anyhow::Result<UsageEngine> {
    let profile = match &config.profile_path {
        Some(path) => VendorProfile::from_file(path)?,
        None => VendorProfile::default(),
    };
    let policy = match &config.policy_path {
        Some(path) => EnginePolicy::from_file(path)?,
        None => EnginePolicy::default(),
    };
    info!(
        vendor = %profile.name,
        pools = policy.pools.len(),
        thresholds = policy.thresholds.0.len(),
        "Engine policy loaded"
    );

    let vendor = profile.name.clone();
    let lexicon = Arc::new(Lexicon::new(profile)?);
    let store = Arc::new(FileStore::open(config.store.clone()).await?);
    info!(dir = %store.dir().display(), "Result store opened");

    let mut engine = UsageEngine::new(lexicon, Arc::new(policy), store.clone(), store)
        .with_settings(EngineSettings::from(&config.run));

    match &credentials.search_api_key {
        Some(key) => {
            let client = SerperClient::new(key.clone(), config.search.clone())?;
            engine = engine.with_search(Arc::new(client));
        }
        None => warn!("SERPER_API_KEY not set; usage checks will fail until it is configured"),
    }

    let deep = match &credentials.verifier_api_key {
        Some(key) if config.verifier.enabled => {
            let fetcher = HttpPageFetcher::new(&config.fetch)?;
            let verifier = OpenAiVerifier::new(key.clone(), vendor, config.verifier.clone())?;
            info!(model = %config.verifier.model, "Deep-context verification enabled");
            DeepContext::new(Arc::new(fetcher), Arc::new(verifier))
        }
        _ => {
            info!("Deep-context verification disabled");
            DeepContext::disabled()
        }
    };

    Ok(engine.with_deep_context(deep))
}
