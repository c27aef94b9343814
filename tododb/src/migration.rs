//! Forward-only schema migrations.
//!
//! Every step in [`MIGRATIONS`] is identified by a timestamped version and is
//! applied at most once. The `_todo_migrations` table records which versions a
//! database has seen, so that:
//! - [`migrate`] can run on every startup and only apply what is missing
//! - [`pending`] can report outstanding steps without touching the schema
//!
//! Each step runs inside its own transaction together with its bookkeeping row.
//! There is no `down`: a bad step is fixed by a newer one.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, ExecResult, FromQueryResult, Statement,
    TransactionTrait,
};

use crate::dialect::DialectType;

/// One named schema step. `up` renders the statements for a given backend.
pub struct Migration {
    pub version: &'static str,
    up: fn(DialectType) -> Vec<String>,
}

impl Migration {
    pub fn statements(&self, dialect: DialectType) -> Vec<String> {
        (self.up)(dialect)
    }
}

/// All known migrations, oldest first. Append only.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20260224062400_create_todos",
        up: create_todos,
    },
    Migration {
        version: "20260224140500_add_timestamp_to_todos",
        up: add_timestamp_to_todos,
    },
    Migration {
        version: "20260226164805_create_users_and_link_todos",
        up: create_users_and_link_todos,
    },
    Migration {
        version: "20260227095450_update_users_for_oauth",
        up: update_users_for_oauth,
    },
];

fn create_todos(d: DialectType) -> Vec<String> {
    vec![format!(
        "CREATE TABLE todos (
            {},
            text TEXT NOT NULL,
            done BOOLEAN NOT NULL DEFAULT FALSE
        )",
        d.identity_column("id")
    )]
}

fn add_timestamp_to_todos(d: DialectType) -> Vec<String> {
    if d.can_add_column_with_dynamic_default() {
        vec![format!(
            "ALTER TABLE todos ADD COLUMN created_at {} NOT NULL DEFAULT {}",
            d.timestamp_type(),
            d.now()
        )]
    } else {
        // Backfill instead of a column default.
        vec![
            format!("ALTER TABLE todos ADD COLUMN created_at {}", d.timestamp_type()),
            format!(
                "UPDATE todos SET created_at = {} WHERE created_at IS NULL",
                d.now()
            ),
        ]
    }
}

fn create_users_and_link_todos(d: DialectType) -> Vec<String> {
    // Where nullability cannot be relaxed later, start out nullable.
    let not_null = if d.can_alter_nullability() { " NOT NULL" } else { "" };
    vec![
        format!(
            "CREATE TABLE users (
                {},
                username TEXT{not_null} UNIQUE,
                password_hash TEXT{not_null}
            )",
            d.identity_column("id")
        ),
        "ALTER TABLE todos ADD COLUMN user_id INTEGER REFERENCES users (id)".to_string(),
        "CREATE INDEX idx_todos_user_id ON todos (user_id)".to_string(),
    ]
}

fn update_users_for_oauth(d: DialectType) -> Vec<String> {
    let mut statements = Vec::new();
    if d.can_alter_nullability() {
        statements.push("ALTER TABLE users ALTER COLUMN username DROP NOT NULL".to_string());
        statements.push("ALTER TABLE users ALTER COLUMN password_hash DROP NOT NULL".to_string());
    }
    statements.push("ALTER TABLE users ADD COLUMN google_id TEXT".to_string());
    statements.push("ALTER TABLE users ADD COLUMN email TEXT".to_string());
    statements.push("CREATE UNIQUE INDEX idx_users_google_id ON users (google_id)".to_string());
    statements.push("CREATE INDEX idx_users_email ON users (email)".to_string());
    statements
}

/// Create the `_todo_migrations` table if it does not already exist.
pub async fn create_migrations_table(
    db: &impl ConnectionTrait,
    dialect: DialectType,
) -> Result<ExecResult, DbErr> {
    db.execute_unprepared(&format!(
        "CREATE TABLE IF NOT EXISTS _todo_migrations (
            version TEXT PRIMARY KEY,
            applied_at {} NOT NULL DEFAULT {}
        )",
        dialect.timestamp_type(),
        dialect.now()
    ))
    .await
}

#[derive(Debug, FromQueryResult)]
struct AppliedRow {
    version: String,
}

/// Versions already recorded in `_todo_migrations`, oldest first.
pub async fn applied(db: &impl ConnectionTrait) -> Result<Vec<String>, DbErr> {
    let rows = AppliedRow::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        "SELECT version FROM _todo_migrations ORDER BY version ASC",
    ))
    .all(db)
    .await?;

    Ok(rows.into_iter().map(|r| r.version).collect())
}

/// Migrations not yet applied to this database, in application order.
pub async fn pending(db: &DatabaseConnection) -> Result<Vec<&'static Migration>, DbErr> {
    let dialect = dialect_of(db)?;
    create_migrations_table(db, dialect).await?;
    let done = applied(db).await?;

    Ok(MIGRATIONS
        .iter()
        .filter(|m| !done.iter().any(|v| v == m.version))
        .collect())
}

/// Apply every pending migration. Returns the versions applied by this call.
///
/// Called automatically by [`TodoDbBuilder::build()`](crate::TodoDbBuilder::build).
pub async fn migrate(db: &DatabaseConnection) -> Result<Vec<&'static str>, DbErr> {
    let dialect = dialect_of(db)?;
    let mut newly_applied = Vec::new();

    for migration in pending(db).await? {
        let txn = db.begin().await?;
        for sql in migration.statements(dialect) {
            txn.execute_unprepared(&sql).await?;
        }
        txn.execute_raw(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO _todo_migrations (version) VALUES ($1)",
            [migration.version.into()],
        ))
        .await?;
        txn.commit().await?;

        log::info!("Applied migration {}", migration.version);
        newly_applied.push(migration.version);
    }

    Ok(newly_applied)
}

fn dialect_of(db: &impl ConnectionTrait) -> Result<DialectType, DbErr> {
    let backend = db.get_database_backend();
    DialectType::from_backend(backend)
        .ok_or_else(|| DbErr::Custom(format!("Unsupported database backend: {backend:?}")))
}
