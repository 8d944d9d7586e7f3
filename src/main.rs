//! Pencraft - a small blog backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pencraft::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxCategoryRepository, SqlxPostRepository, SqlxProfileRepository},
    },
    providers::{HttpIdentityProvider, HttpObjectStorage, IdentityProvider, ObjectStorage},
    services::{CategoryService, PostService, ProfileService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pencraft=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pencraft blog backend...");

    // Load configuration (config.yml + PENCRAFT_* env overrides)
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database.url).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // External provider clients. Missing credentials are tolerated here
    // and reported per request instead.
    if config.provider.url.is_none() || config.provider.anon_key.is_none() {
        tracing::warn!(
            "provider credentials not configured; auth and upload endpoints will return 500"
        );
    }
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(HttpIdentityProvider::new(&config.provider)?);
    let storage: Arc<dyn ObjectStorage> = Arc::new(HttpObjectStorage::new(&config.provider)?);

    // Create repositories
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let profile_repo = SqlxProfileRepository::boxed(pool.clone());

    // Build application state
    let state = AppState {
        post_service: Arc::new(PostService::new(post_repo.clone())),
        category_service: Arc::new(CategoryService::new(category_repo, post_repo)),
        profile_service: Arc::new(ProfileService::new(profile_repo.clone())),
        user_service: Arc::new(UserService::new(profile_repo, identity.clone())),
        identity,
        storage,
        upload_config: Arc::new(config.upload.clone()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
