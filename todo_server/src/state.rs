use std::sync::Arc;

use tododb::{
    GoogleVerifier, IdentityVerifier, SessionKeys, TodoDb, TodoDbBuilder, TodoStore, UserStore,
};

use crate::config::Config;

/// Shared by every request. Cloning is cheap: the stores share one pool.
#[derive(Clone)]
pub struct AppState {
    pub db: TodoDb,
    pub todos: TodoStore,
    pub users: UserStore,
    pub keys: SessionKeys,
    pub google: Option<Arc<dyn IdentityVerifier>>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(db: TodoDb, keys: SessionKeys) -> Self {
        Self {
            todos: TodoStore::new(db.clone()),
            users: UserStore::new(db.clone()),
            db,
            keys,
            google: None,
            cookie_secure: false,
        }
    }

    pub fn with_identity_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.google = Some(verifier);
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Connect to the database (running migrations) and set up session keys
    /// and the Google verifier from `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let db = database(config).build().await?;

        let keys = match config.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => SessionKeys::new(secret.as_bytes()),
            _ => {
                log::warn!("JWT_SECRET not set, using a random secret; sessions end on restart");
                SessionKeys::random()
            }
        };

        let mut state = AppState::new(db, keys).with_secure_cookies(config.cookie_secure);
        match config.google_client_id.as_deref() {
            Some(client_id) if !client_id.is_empty() => {
                state = state.with_identity_verifier(Arc::new(GoogleVerifier::new(client_id)));
            }
            _ => log::info!("GOOGLE_CLIENT_ID not set, Google sign-in disabled"),
        }

        Ok(state)
    }
}

/// Database builder with the connection settings from `config`.
pub fn database(config: &Config) -> TodoDbBuilder {
    let builder = TodoDbBuilder::new(&config.database_url).require_tls(config.database_tls);
    match config.database_max_connections {
        Some(max) => builder.max_connections(max),
        None => builder,
    }
}
