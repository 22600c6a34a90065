use std::path::PathBuf;

use async_trait::async_trait;
use quote_core::db::{DbConfig, QuoteRepository, RepositoryError, RepositoryFactory};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`QUOTE_DB_SQLITE_SEEDS_DIR`**, if set.
/// 2. **`./seeds`**, if the directory exists in the current working directory.
/// 3. **Crate manifest dir**: `$CARGO_MANIFEST_DIR/seeds` as last resort.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QUOTE_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// Map a connection string from config onto a sqlx URL.
///
/// * `":memory:"` becomes `sqlite::memory:`.
/// * Anything already starting with `sqlite:` is passed through.
/// * A bare file path becomes `sqlite:<path>?mode=rwc` so the file is created
///   on first use.
fn database_url(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        "sqlite::memory:".to_string()
    } else if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", connection_string)
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`quote_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use quote_core::db::RepositoryRegistry;
/// use quote_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, apply
    /// migrations, and load the demo seeds into a database with no quotes.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        debug!(%url, "opening sqlite database");

        let repo = if is_in_memory(&url) {
            // Every pooled connection to :memory: would see its own database.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&url)
                .await
                .map_err(|e| RepositoryError::Connection(e.to_string()))?;
            SqliteRepository::new_with_pool(pool).await
        } else {
            SqliteRepository::new(&url)
                .await
                .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?
        };

        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        if seeds.is_dir() && repo.count_quotes().await? == 0 {
            repo.run_seeds(&seeds)
                .await
                .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        } else {
            info!(seeds = %seeds.display(), "skipping seed data");
        }

        Ok(Box::new(repo))
    }
}
