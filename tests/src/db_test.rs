use crate::{ExecLog, LoggingDriver};
use pgbulk::Db;

/// A database handle whose default connection records every operation.
pub struct DbTest {
    pub db: Db,
    log: ExecLog,
}

impl DbTest {
    /// A handle on a scripted driver reporting a recent server.
    pub fn new() -> Self {
        Self::with_driver(LoggingDriver::scripted())
    }

    pub fn with_driver(driver: LoggingDriver) -> Self {
        crate::init_tracing();

        let log = ExecLog::new(driver.ops_log_handle(), driver.script_handle());
        let db = Db::builder()
            .default_driver(driver)
            .build()
            .expect("a default driver is registered");

        Self { db, log }
    }

    pub fn log(&mut self) -> &mut ExecLog {
        &mut self.log
    }
}

impl Default for DbTest {
    fn default() -> Self {
        Self::new()
    }
}
