//! Setup for tests running against a live PostgreSQL server.
//!
//! The server is read from `PGBULK_TEST_POSTGRES_URL`, falling back to a
//! local `pgbulk_test` database.

use crate::{isolation::TestIsolation, DbTest, LoggingDriver};

use pgbulk_driver_postgresql::PostgreSQL;
use tokio_postgres::{Client, NoTls};

type SetupResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub fn url() -> String {
    std::env::var("PGBULK_TEST_POSTGRES_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/pgbulk_test".to_string())
}

/// A fixture connection, separate from the one under test, used to create
/// tables and read back what was written.
pub struct SetupPostgreSQL {
    isolation: TestIsolation,
    client: Client,
}

impl SetupPostgreSQL {
    pub async fn new() -> SetupResult<Self> {
        let (client, connection) = tokio_postgres::connect(&url(), NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("PostgreSQL fixture connection error: {e}");
            }
        });

        client
            .batch_execute("CREATE EXTENSION IF NOT EXISTS hstore")
            .await?;

        Ok(Self {
            isolation: TestIsolation::new(),
            client,
        })
    }

    /// Name of a table owned by this test.
    pub fn table_name(&self, name: &str) -> String {
        self.isolation.table_name(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn execute(&self, sql: &str) -> SetupResult<()> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    /// Connects a recording driver to the test server.
    pub async fn connect(&self) -> SetupResult<DbTest> {
        let driver = PostgreSQL::connect(&url()).await?;
        Ok(DbTest::with_driver(LoggingDriver::wrap(driver)))
    }

    /// Drops every table created by this test.
    pub async fn cleanup_my_tables(&self) -> SetupResult<()> {
        let rows = self
            .client
            .query(
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public'",
                &[],
            )
            .await?;

        for row in rows {
            let table: String = row.get(0);
            if self.isolation.owns_table(&table) {
                self.client
                    .batch_execute(&format!(r#"DROP TABLE IF EXISTS "{table}" CASCADE"#))
                    .await?;
            }
        }

        Ok(())
    }
}
