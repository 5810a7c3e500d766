use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use tracing::log::LevelFilter;

static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");
static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to connect to {dialect}: {source}")]
    Connect {
        dialect: Dialect,
        source: sqlx::Error,
    },
    #[error("migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Sqlite => write!(f, "sqlite3"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite3" | "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("unsupported database dialect: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub dialect: Dialect,
    pub dsn: String,
    /// Log every statement at `info` instead of disabling statement logs.
    pub debug: bool,
    pub auto_migrate: bool,
}

/// Connection handle shared by every repository.
#[derive(Clone, Debug)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Runs `$body` against whichever pool backs `$db`, binding it to `$pool`.
macro_rules! with_pool {
    ($db:expr, |$pool:ident| $body:expr) => {
        match $db {
            $crate::infrastructure::db::pool::Database::Postgres($pool) => $body,
            $crate::infrastructure::db::pool::Database::Sqlite($pool) => $body,
        }
    };
}
pub(crate) use with_pool;

fn statement_level(debug: bool) -> LevelFilter {
    if debug { LevelFilter::Info } else { LevelFilter::Off }
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let db = match config.dialect {
            Dialect::Postgres => Self::postgres(&config.dsn, config.debug).await?,
            Dialect::Sqlite => Self::sqlite(&config.dsn, config.debug).await?,
        };

        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    pub async fn postgres(dsn: &str, debug: bool) -> Result<Self, DatabaseError> {
        let connect_err = |source| DatabaseError::Connect {
            dialect: Dialect::Postgres,
            source,
        };
        let options = PgConnectOptions::from_str(dsn)
            .map_err(connect_err)?
            .log_statements(statement_level(debug));

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await
            .map_err(connect_err)?;

        info!("✅ Connected to PostgreSQL");
        Ok(Database::Postgres(pool))
    }

    pub async fn sqlite(dsn: &str, debug: bool) -> Result<Self, DatabaseError> {
        let connect_err = |source| DatabaseError::Connect {
            dialect: Dialect::Sqlite,
            source,
        };
        let options = SqliteConnectOptions::from_str(dsn)
            .map_err(connect_err)?
            .create_if_missing(true)
            .foreign_keys(true)
            .log_statements(statement_level(debug));

        // Every connection to an in-memory database sees its own empty
        // database, so the pool must hold exactly one connection forever.
        let in_memory = dsn.contains(":memory:") || dsn.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(5))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(connect_err)?;

        info!("✅ Connected to SQLite ({})", dsn);
        Ok(Database::Sqlite(pool))
    }

    /// Fresh, migrated in-memory SQLite database.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let db = Self::sqlite("sqlite::memory:", false).await?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        match self {
            Database::Postgres(pool) => POSTGRES_MIGRATOR.run(pool).await?,
            Database::Sqlite(pool) => SQLITE_MIGRATOR.run(pool).await?,
        }
        info!("Database schema is up to date ({})", self.dialect());
        Ok(())
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Database::Postgres(_) => Dialect::Postgres,
            Database::Sqlite(_) => Dialect::Sqlite,
        }
    }

    pub async fn close(&self) {
        with_pool!(self, |pool| pool.close().await);
        info!("Closed {} connection pool", self.dialect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_strings_parse_once() {
        assert_eq!("postgres".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("sqlite3".parse::<Dialect>(), Ok(Dialect::Sqlite));
        assert_eq!("sqlite".parse::<Dialect>(), Ok(Dialect::Sqlite));
        assert!("Postgres".parse::<Dialect>().is_err());
        assert!("mysql".parse::<Dialect>().is_err());
    }

    #[tokio::test]
    async fn connect_applies_migrations_when_requested() {
        let config = DatabaseConfig {
            dialect: Dialect::Sqlite,
            dsn: "sqlite::memory:".to_string(),
            debug: true,
            auto_migrate: true,
        };

        let db = Database::connect(&config).await.unwrap();
        assert_eq!(db.dialect(), Dialect::Sqlite);

        let Database::Sqlite(pool) = &db else {
            panic!("expected sqlite pool");
        };
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('videos', 'jobs') ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["jobs", "videos"]);

        db.close().await;
    }
}
