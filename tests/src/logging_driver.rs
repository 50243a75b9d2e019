use pgbulk_core::{
    async_trait,
    driver::{Capability, Operation, Response, ServerVersion},
    Driver, Result,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// A driver that records every operation it executes.
///
/// With an inner driver the operations are forwarded to it. Without one,
/// replies come from a script of responses, falling back to an empty
/// result shaped like the operation.
#[derive(Debug)]
pub struct LoggingDriver {
    inner: Option<Box<dyn Driver>>,

    capability: Capability,

    version: ServerVersion,

    /// Log of all operations executed through this driver
    /// Using Arc<Mutex> for thread-safe access from tests
    ops_log: Arc<Mutex<Vec<DriverOp>>>,

    /// Results returned in order, for scripted drivers
    script: Arc<Mutex<VecDeque<Result<Response>>>>,
}

#[derive(Debug)]
pub struct DriverOp {
    pub operation: Operation,
    pub response: Result<Response>,
}

impl LoggingDriver {
    /// A scripted driver reporting a recent PostgreSQL server.
    pub fn scripted() -> Self {
        Self {
            inner: None,
            capability: Capability::POSTGRESQL,
            version: ServerVersion::new(16, 2, 0),
            ops_log: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn wrap(driver: impl Driver) -> Self {
        Self {
            inner: Some(Box::new(driver)),
            ..Self::scripted()
        }
    }

    pub fn with_version(mut self, version: ServerVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }

    /// Get a handle to access the operations log
    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<DriverOp>>> {
        self.ops_log.clone()
    }

    pub fn script_handle(&self) -> Arc<Mutex<VecDeque<Result<Response>>>> {
        self.script.clone()
    }

    fn scripted_response(&self, operation: &Operation) -> Result<Response> {
        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return response;
        }

        Ok(match operation {
            Operation::QuerySql(query) if query.ret.is_some() => Response::empty_values(),
            Operation::Insert(insert) if insert.returning.is_some() => Response::empty_values(),
            Operation::Insert(insert) => Response::count(insert.rows.len() as u64),
            _ => Response::count(0),
        })
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    fn capability(&self) -> &Capability {
        match &self.inner {
            Some(inner) => inner.capability(),
            None => &self.capability,
        }
    }

    async fn server_version(&self) -> Result<ServerVersion> {
        match &self.inner {
            Some(inner) => inner.server_version().await,
            None => Ok(self.version),
        }
    }

    async fn exec(&self, operation: Operation) -> Result<Response> {
        // Clone the operation for logging
        let operation_clone = operation.clone();

        let response = match &self.inner {
            Some(inner) => inner.exec(operation).await,
            None => self.scripted_response(&operation),
        };

        self.ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(DriverOp {
                operation: operation_clone,
                response: response.clone(),
            });

        response
    }
}
