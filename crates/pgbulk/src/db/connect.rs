use pgbulk_core::{driver::Driver, Error, Result};

use std::sync::Arc;
use url::Url;

/// Opens a connection to the database at `url`, picking the driver from the
/// URL scheme.
pub async fn connect(url: &str) -> Result<Arc<dyn Driver>> {
    let url = Url::parse(url)?;

    match url.scheme() {
        "postgresql" | "postgres" => connect_postgresql(&url).await,
        scheme => Err(Error::precondition(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "postgresql")]
async fn connect_postgresql(url: &Url) -> Result<Arc<dyn Driver>> {
    let driver = pgbulk_driver_postgresql::PostgreSQL::connect(url.as_str()).await?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "postgresql"))]
async fn connect_postgresql(_url: &Url) -> Result<Arc<dyn Driver>> {
    Err(Error::precondition("`postgresql` feature not enabled"))
}
