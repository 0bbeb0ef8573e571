pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod store;

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    //! Ephemeral database provisioning for integration tests.

    use log::LevelFilter;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use sqlx::{ConnectOptions, PgPool};
    use testcontainers_modules::postgres::Postgres;
    use testcontainers_modules::testcontainers::{
        ContainerAsync, core::error::TestcontainersError, runners::AsyncRunner,
    };
    use thiserror::Error;
    use uuid::Uuid;

    static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

    #[derive(Debug, Error)]
    pub enum TestDatabaseError {
        #[error("database error: {0}")]
        Sqlx(#[from] sqlx::Error),
        #[error("migration error: {0}")]
        Migration(#[from] sqlx::migrate::MigrateError),
        #[error("container error: {0}")]
        Container(#[from] TestcontainersError),
    }

    /// Ephemeral database factory for integration tests.
    ///
    /// Uses `TEST_DATABASE_URL` as the admin connection when set; otherwise
    /// launches a disposable Postgres container. Either way each instance
    /// gets a uniquely named database with migrations applied, so tests
    /// never observe each other's rows.
    pub struct TestDatabase {
        pool: Option<PgPool>,
        admin_options: PgConnectOptions,
        database_name: String,
        container: Option<ContainerAsync<Postgres>>,
    }

    impl TestDatabase {
        /// Provision a fresh, fully migrated database.
        pub async fn new() -> Result<Self, TestDatabaseError> {
            let (admin_url, container) = match std::env::var("TEST_DATABASE_URL") {
                Ok(url) => (url, None),
                Err(_) => {
                    let container = Postgres::default().start().await?;
                    let host = container.get_host().await?.to_string();
                    let port = container.get_host_port_ipv4(5432).await?;
                    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
                    (url, Some(container))
                }
            };

            let base_options: PgConnectOptions =
                admin_url.parse().map_err(TestDatabaseError::Sqlx)?;
            let base_options = base_options.log_statements(LevelFilter::Off);

            let admin_options = base_options.clone().database("postgres");
            let admin_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(admin_options.clone())
                .await?;

            let database_name = format!("review_store_test_{}", Uuid::new_v4().simple());
            let create_sql = format!("CREATE DATABASE \"{}\" TEMPLATE template0", database_name);
            sqlx::query(&create_sql).execute(&admin_pool).await?;

            let pool = PgPoolOptions::new()
                .max_connections(8)
                .connect_with(base_options.database(&database_name))
                .await?;

            MIGRATOR.run(&pool).await?;

            Ok(Self {
                pool: Some(pool),
                admin_options,
                database_name,
                container,
            })
        }

        pub fn pool(&self) -> &PgPool {
            self.pool.as_ref().expect("test database pool is available")
        }

        /// Clone of the pooled connection handle.
        pub fn pool_clone(&self) -> PgPool {
            self.pool().clone()
        }

        /// Close pool connections and drop the ephemeral database.
        pub async fn close(mut self) -> Result<(), TestDatabaseError> {
            if let Some(pool) = self.pool.take() {
                pool.close().await;
            }

            let admin_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(self.admin_options.clone())
                .await?;

            let drop_sql = format!("DROP DATABASE IF EXISTS \"{}\"", self.database_name);
            sqlx::query(&drop_sql).execute(&admin_pool).await?;

            if let Some(container) = self.container.take() {
                drop(container);
            }

            Ok(())
        }
    }
}
