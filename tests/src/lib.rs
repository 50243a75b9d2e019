mod db_test;
pub use db_test::DbTest;

mod exec_log;
pub use exec_log::ExecLog;

mod logging_driver;
pub use logging_driver::{DriverOp, LoggingDriver};


pub mod isolation;

#[cfg(feature = "postgresql")]
pub mod postgresql;

/// Installs a log subscriber when `RUST_LOG` is set, so a failing test can
/// be rerun with the generated SQL printed.
pub fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_some() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
