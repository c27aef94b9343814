use std::path::PathBuf;

use axum::http::HeaderValue;
use clap::{Parser, Subcommand};

/// Command line and environment configuration for `todo-server`.
#[derive(Parser, Clone)]
#[command(name = "todo-server", version, about = "Multi-user to-do list server")]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// TCP port to listen on (all interfaces)
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// SeaORM connection string (sqlite: or postgres://)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./todos.db?mode=rwc")]
    pub database_url: String,

    /// Upper bound on pooled database connections (driver default when unset)
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: Option<u32>,

    /// Require an encrypted database connection
    #[arg(long, env = "DATABASE_TLS", default_value_t = false)]
    pub database_tls: bool,

    /// Browser origin allowed to call the API with credentials
    #[arg(long, env = "FRONTEND_URL", value_parser = parse_origin)]
    pub frontend_url: Option<HeaderValue>,

    /// HMAC secret for session tokens. A random one is generated when unset.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// OAuth client id; Google sign-in is disabled when unset
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Mark the session cookie `Secure` (HTTPS only)
    #[arg(long, env = "COOKIE_SECURE", default_value_t = false)]
    pub cookie_secure: bool,

    /// Serve a single-page app from this directory, with index.html as fallback
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

/// What to do instead of serving HTTP.
#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Apply pending schema migrations and exit
    Migrate {
        /// Only list the pending migrations
        #[arg(long)]
        status: bool,
    },
}

impl Config {
    /// Defaults plus the given database, ignoring the process environment's flags.
    pub fn with_database(url: &str) -> Self {
        Config {
            command: None,
            port: 0,
            database_url: url.to_string(),
            database_max_connections: None,
            database_tls: false,
            frontend_url: None,
            jwt_secret: None,
            google_client_id: None,
            cookie_secure: false,
            static_dir: None,
        }
    }
}

fn parse_origin(value: &str) -> Result<HeaderValue, String> {
    let origin = value.trim().trim_end_matches('/');
    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        return Err(format!("expected an http(s) origin, got {value:?}"));
    }
    HeaderValue::from_str(origin).map_err(|e| e.to_string())
}
