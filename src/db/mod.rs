pub mod error;
pub mod queries;
pub mod repository;
pub mod schema;
pub mod transfer;
mod value;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use error::{StoreError, StoreResult};
pub use queries::categories::Category;
pub use queries::questions::Question;
pub use repository::{Attributes, Filter, OrderBy, Resource};
pub use value::Value;

const FIXTURE: &str = include_str!("../../fixtures/trivia.sql");

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

pub async fn establish_connection(url: &str) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
    let pool = if is_in_memory(url) {
        // every connection to `:memory:` is a database of its own
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new().connect_with(options).await?
    };
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Loads the bundled trivia data set (6 categories, 19 questions).
pub async fn seed(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::raw_sql(FIXTURE).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = establish_connection("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    seed(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://trivia?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:trivia.db?mode=rwc"));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();
        assert_eq!(repository::count_all::<Category>(&pool).await.unwrap(), 6);
    }
}
