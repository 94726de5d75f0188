use tokio::sync::OnceCell;

use onerecord_core::{AppError, TokenIssuer};
use onerecord_db::Database;

use crate::auth::hash_blocking;
use crate::config::ServerConfig;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub tokens: TokenIssuer,
    /// Hash checked when a login names an unknown user, so that branch costs a
    /// bcrypt verification too.
    dummy_hash: OnceCell<String>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl);
        Self {
            db,
            config,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    /// A bcrypt hash at the configured cost that no password is expected to match.
    pub async fn dummy_hash(&self) -> Result<&str, AppError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| {
                hash_blocking(uuid::Uuid::new_v4().to_string(), self.config.bcrypt_cost)
            })
            .await?;
        Ok(hash.as_str())
    }
}
