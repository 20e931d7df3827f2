//! Storefront server configuration

use crate::BoxError;

/// Storefront server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// PostgreSQL connection URL; `None` selects the in-memory store (development only)
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Public storefront URL, base of checkout redirect targets
    pub app_url: String,
    /// ISO currency code for checkout line items
    pub currency: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// HS256 secret shared with the identity provider
    pub auth_jwt_secret: String,
    /// Identities allowed on the admin dashboard
    pub admin_user_ids: Vec<String>,
    /// Completion API key (planner disabled when absent)
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Directory holding `categories.json` and `products.json`
    pub seed_dir: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        Ok(Self {
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            app_url: std::env::var("APP_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "usd".into()),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            auth_jwt_secret: Self::require_secret("AUTH_JWT_SECRET", &environment)?,
            admin_user_ids: std::env::var("ADMIN_USER_IDS")
                .map(|v| parse_id_list(&v))
                .unwrap_or_default(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
            seed_dir: std::env::var("SEED_DIR").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
