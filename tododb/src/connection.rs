use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::dialect::DialectType;
use crate::migration;

/// A pooled SeaORM connection whose schema has been brought up to date.
///
/// Cheap to clone; every clone shares the same pool.
#[derive(Clone)]
pub struct TodoDb {
    inner: DatabaseConnection,
}

impl TodoDb {
    /// Get a reference to the underlying SeaORM connection.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// Round-trip to the database. Used by health checks.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.inner.ping().await
    }

    /// Migration versions recorded in this database.
    pub async fn applied_migrations(&self) -> Result<Vec<String>, DbErr> {
        migration::applied(&self.inner).await
    }
}

/// Builder for [`TodoDb`].
pub struct TodoDbBuilder {
    database_url: String,
    require_tls: bool,
    max_connections: Option<u32>,
}

impl TodoDbBuilder {
    pub fn new(url: &str) -> Self {
        Self {
            database_url: url.to_string(),
            require_tls: false,
            max_connections: None,
        }
    }

    /// Demand an encrypted connection. Only meaningful for PostgreSQL.
    pub fn require_tls(mut self, require: bool) -> Self {
        self.require_tls = require;
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Connect, then apply pending migrations.
    pub async fn build(self) -> Result<TodoDb, DbErr> {
        let db = self.connect().await?;

        let applied = migration::migrate(db.inner()).await?;
        if applied.is_empty() {
            log::debug!("Schema already up to date");
        } else {
            log::info!("Applied {} migration(s)", applied.len());
        }

        Ok(db)
    }

    /// Connect without touching the schema.
    pub async fn connect(self) -> Result<TodoDb, DbErr> {
        let dialect = DialectType::from_url(&self.database_url).ok_or_else(|| {
            DbErr::Custom(format!(
                "Unsupported database url scheme: {}",
                scheme_of(&self.database_url)
            ))
        })?;

        let url = self.connection_url(dialect);
        let mut opts = ConnectOptions::new(url);
        opts.sqlx_logging(false)
            .connect_timeout(Duration::from_secs(10));

        if is_in_memory(&self.database_url) {
            // Every SQLite connection to :memory: opens its own empty database,
            // so the single connection must never be recycled.
            opts.max_connections(1)
                .min_connections(1)
                .max_lifetime(None::<Duration>)
                .idle_timeout(None::<Duration>);
        } else if let Some(max) = self.max_connections {
            opts.max_connections(max);
        }

        let inner = Database::connect(opts).await?;
        log::info!(
            "Connected to {:?} database ({})",
            inner.get_database_backend(),
            scheme_of(&self.database_url)
        );

        Ok(TodoDb { inner })
    }

    fn connection_url(&self, dialect: DialectType) -> String {
        match dialect {
            DialectType::PostgreSQL if self.require_tls && !self.database_url.contains("sslmode=") => {
                let separator = if self.database_url.contains('?') { '&' } else { '?' };
                format!("{}{separator}sslmode=require", self.database_url)
            }
            DialectType::SQLite if self.require_tls => {
                log::warn!("TLS requested for a SQLite database, ignoring");
                self.database_url.clone()
            }
            _ => self.database_url.clone(),
        }
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// The part of a connection string that is safe to log.
fn scheme_of(url: &str) -> &str {
    url.split(':').next().unwrap_or_default()
}
