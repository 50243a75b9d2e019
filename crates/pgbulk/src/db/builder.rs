use super::{connect, Db, Shared, DEFAULT_ALIAS};

use pgbulk_core::{
    driver::Driver,
    schema::Type,
    stmt::Value,
    Error, Result,
};
use pgbulk_sql::NullDefaults;

use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    /// Drivers by connection alias
    drivers: IndexMap<String, Arc<dyn Driver>>,

    null_defaults: NullDefaults,
}

impl Builder {
    /// Registers `driver` under `alias`, replacing any driver registered
    /// under the same alias.
    pub fn driver(&mut self, alias: impl Into<String>, driver: impl Driver) -> &mut Self {
        self.drivers.insert(alias.into(), Arc::new(driver));
        self
    }

    /// Registers `driver` as the default connection.
    pub fn default_driver(&mut self, driver: impl Driver) -> &mut Self {
        self.driver(DEFAULT_ALIAS, driver)
    }

    /// Connects to `url` and registers the connection under `alias`.
    pub async fn connect_alias(&mut self, alias: impl Into<String>, url: &str) -> Result<&mut Self> {
        let driver = connect(url).await?;
        self.drivers.insert(alias.into(), driver);
        Ok(self)
    }

    /// Replaces the value NULL columns of type `ty` are combined from.
    pub fn null_default(&mut self, ty: Type, value: impl Into<Value>) -> &mut Self {
        self.null_defaults.set(ty, value);
        self
    }

    pub fn null_defaults(&mut self, null_defaults: NullDefaults) -> &mut Self {
        self.null_defaults = null_defaults;
        self
    }

    /// Connects to `url` as the default connection and builds the handle.
    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        self.connect_alias(DEFAULT_ALIAS, url).await?;
        self.build()
    }

    pub fn build(&mut self) -> Result<Db> {
        if !self.drivers.contains_key(DEFAULT_ALIAS) {
            return Err(Error::precondition(format!(
                "no '{DEFAULT_ALIAS}' connection is registered"
            )));
        }

        Ok(Db {
            shared: Arc::new(Shared {
                drivers: self.drivers.clone(),
                null_defaults: self.null_defaults.clone(),
            }),
        })
    }
}
