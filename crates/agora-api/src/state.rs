use std::sync::Arc;

use agora_auth::TokenIssuer;
use agora_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::media::MediaStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenIssuer,
    pub media: MediaStore,
}

impl AppStateInner {
    pub fn new(db: Database, tokens: TokenIssuer, media: MediaStore) -> AppState {
        Arc::new(Self { db, tokens, media })
    }
}

/// Run blocking database work off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}
