//! Application state for ecocart-server

use std::sync::Arc;

use sqlx::PgPool;

use crate::BoxError;
use crate::config::Config;
use crate::llm::{CompletionClient, OpenAiClient};
use crate::store::{MemoryStore, PgStore, Store};
use crate::stripe::{PaymentGateway, StripeClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog, carts, orders, users
    pub store: Arc<dyn Store>,
    /// Hosted checkout provider
    pub payments: Arc<dyn PaymentGateway>,
    /// Completion API used by the meal planner
    pub completions: Arc<dyn CompletionClient>,
    /// Public storefront URL (checkout redirect base)
    pub app_url: String,
    pub currency: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// HS256 secret for identity-provider tokens
    pub jwt_secret: String,
    /// Identities allowed on admin routes
    pub admin_user_ids: Arc<Vec<String>>,
}

impl AppState {
    /// Create a new AppState, connecting storage and external clients
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let pool = PgPool::connect(url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("PostgreSQL store ready");
                Arc::new(PgStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
                let store = MemoryStore::new();
                if let Some(dir) = &config.seed_dir {
                    let report = crate::seed::seed_from_dir(&store, std::path::Path::new(dir)).await?;
                    tracing::info!(
                        categories = report.categories_created,
                        products = report.products_created,
                        "In-memory catalog seeded"
                    );
                }
                Arc::new(store)
            }
        };

        if config.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, meal planner requests will fail");
        }

        Ok(Self::with_services(
            config,
            store,
            Arc::new(StripeClient::new(config.stripe_secret_key.clone())),
            Arc::new(OpenAiClient::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
            )),
        ))
    }

    /// Assemble state from already-built services
    pub fn with_services(
        config: &Config,
        store: Arc<dyn Store>,
        payments: Arc<dyn PaymentGateway>,
        completions: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            store,
            payments,
            completions,
            app_url: config.app_url.clone(),
            currency: config.currency.clone(),
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            jwt_secret: config.auth_jwt_secret.clone(),
            admin_user_ids: Arc::new(config.admin_user_ids.clone()),
        }
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_ids.iter().any(|id| id == user_id)
    }
}
