//! Backend-specific SQL fragments used by the migrations.
//!
//! SeaORM hides most dialect differences, but hand-written DDL still has to
//! know how each backend spells an identity column or a timestamp.

use sea_orm::DatabaseBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectType {
    PostgreSQL,
    SQLite,
}

impl DialectType {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres") {
            Some(DialectType::PostgreSQL)
        } else if url.starts_with("sqlite") {
            Some(DialectType::SQLite)
        } else {
            None
        }
    }

    pub fn from_backend(backend: DatabaseBackend) -> Option<Self> {
        match backend {
            DatabaseBackend::Postgres => Some(DialectType::PostgreSQL),
            DatabaseBackend::Sqlite => Some(DialectType::SQLite),
            _ => None,
        }
    }

    /// Auto-assigned integer primary key column definition.
    pub fn identity_column(&self, name: &str) -> String {
        match self {
            DialectType::PostgreSQL => {
                format!("{name} INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY")
            }
            DialectType::SQLite => format!("{name} INTEGER PRIMARY KEY AUTOINCREMENT"),
        }
    }

    pub fn timestamp_type(&self) -> &'static str {
        match self {
            DialectType::PostgreSQL => "TIMESTAMPTZ",
            DialectType::SQLite => "TIMESTAMP",
        }
    }

    pub fn now(&self) -> &'static str {
        match self {
            DialectType::PostgreSQL => "now()",
            DialectType::SQLite => "CURRENT_TIMESTAMP",
        }
    }

    /// SQLite refuses `ALTER TABLE … ADD COLUMN` with a non-constant default.
    pub fn can_add_column_with_dynamic_default(&self) -> bool {
        matches!(self, DialectType::PostgreSQL)
    }

    /// SQLite cannot drop a `NOT NULL` constraint in place.
    pub fn can_alter_nullability(&self) -> bool {
        matches!(self, DialectType::PostgreSQL)
    }
}
