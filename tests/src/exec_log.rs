use crate::logging_driver::DriverOp;
use pgbulk_core::{
    driver::{
        operation::{Insert, QuerySql, Transaction},
        Operation, Response,
    },
    Result,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// A wrapper around the operations log that provides a clean API for tests
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
    script: Arc<Mutex<VecDeque<Result<Response>>>>,
}

impl ExecLog {
    pub(crate) fn new(
        ops: Arc<Mutex<Vec<DriverOp>>>,
        script: Arc<Mutex<VecDeque<Result<Response>>>>,
    ) -> Self {
        Self { ops, script }
    }

    /// Queues the result of the next operation without a scripted reply.
    pub fn respond(&self, response: Result<Response>) {
        self.script.lock().unwrap().push_back(response);
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Count operations matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(&op.operation))
            .count()
    }

    /// Number of SQL statements sent
    pub fn statements(&self) -> usize {
        self.count(|op| matches!(op, Operation::QuerySql(_)))
    }

    /// Check if there's an Insert operation
    pub fn has_insert(&self) -> bool {
        self.count(|op| matches!(op, Operation::Insert(_))) > 0
    }

    /// Transaction lifecycle operations, in order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter_map(|op| op.operation.as_transaction().copied())
            .collect()
    }

    /// Clear the log
    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first operation from the log
    /// Returns None if the log is empty
    pub fn pop(&mut self) -> Option<(Operation, Result<Response>)> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            let driver_op = ops.remove(0);
            Some((driver_op.operation, driver_op.response))
        }
    }

    /// Remove the first operation, which must be a SQL statement
    pub fn pop_query(&mut self) -> QuerySql {
        match self.pop() {
            Some((Operation::QuerySql(query), _)) => query,
            other => panic!("expected a SQL statement, got {other:#?}"),
        }
    }

    /// Remove the first operation, which must be an insert
    pub fn pop_insert(&mut self) -> Insert {
        match self.pop() {
            Some((Operation::Insert(insert), _)) => insert,
            other => panic!("expected an insert, got {other:#?}"),
        }
    }

    /// Remove the first operation, which must be a transaction step
    pub fn pop_transaction(&mut self) -> Transaction {
        match self.pop() {
            Some((Operation::Transaction(op), _)) => op,
            other => panic!("expected a transaction step, got {other:#?}"),
        }
    }

    /// Get access to all operations for custom assertions
    /// This is an escape hatch for complex assertions
    pub fn with_ops<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[DriverOp]) -> R,
    {
        let ops = self.ops.lock().unwrap();
        f(&ops)
    }
}
