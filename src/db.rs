use crate::error::StoreError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Upper bound on pooled connections. The load pipeline shares this pool
/// across all workers; the pool, not the worker count, caps store-side
/// concurrency.
const MAX_CONNECTIONS: u32 = 16;

/// Open a connection pool using the `DATABASE_URL` environment variable.
pub async fn connect() -> Result<PgPool, StoreError> {
    let url = std::env::var("DATABASE_URL").map_err(|_| StoreError::MissingDatabaseUrl)?;
    connect_to(&url).await
}

/// Open a connection pool against an explicit database URL.
pub async fn connect_to(url: &str) -> Result<PgPool, StoreError> {
    log::info!("connecting to store");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(url)
        .await?;

    log::info!("store connection established");
    Ok(pool)
}

/// Close the pool, waiting for in-flight statements to finish.
pub async fn close(pool: PgPool) {
    log::info!("closing store connection");
    pool.close().await;
}
