use std::sync::atomic::{AtomicU32, Ordering};

/// Generates unique table names so tests sharing a database don't see each
/// other's rows.
///
/// Names have the form `test_{process_id}_{test_counter}_{name}`.
#[derive(Debug, Clone)]
pub struct TestIsolation {
    process_id: u32,
    test_counter: u32,
}

// Global counter shared across all tests in this process
static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

impl TestIsolation {
    pub fn new() -> Self {
        Self {
            process_id: std::process::id(),
            test_counter: TEST_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn table_prefix(&self) -> String {
        format!("test_{}_{}_", self.process_id, self.test_counter)
    }

    pub fn table_name(&self, name: &str) -> String {
        format!("{}{name}", self.table_prefix())
    }

    pub fn owns_table(&self, table_name: &str) -> bool {
        table_name.starts_with(&self.table_prefix())
    }
}

impl Default for TestIsolation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique() {
        let isolation1 = TestIsolation::new();
        let isolation2 = TestIsolation::new();

        assert_ne!(isolation1.table_prefix(), isolation2.table_prefix());
        assert!(isolation1.table_prefix().starts_with("test_"));
    }

    #[test]
    fn table_names_carry_the_prefix() {
        let isolation = TestIsolation::new();
        let name = isolation.table_name("documents");

        assert!(isolation.owns_table(&name));
        assert!(!TestIsolation::new().owns_table(&name));
    }
}
