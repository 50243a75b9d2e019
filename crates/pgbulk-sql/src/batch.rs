use pgbulk_core::stmt::{Key, ValueRecord};

use indexmap::IndexMap;

/// Canonical input of one statement: key tuple to the values written for
/// that key.
///
/// Every record holds the same fields. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    records: IndexMap<Key, ValueRecord>,
}

impl Batch {
    pub fn new() -> Batch {
        Batch::default()
    }

    /// Adds a record, replacing the one stored for the same key.
    pub fn insert(&mut self, key: Key, record: ValueRecord) -> Option<ValueRecord> {
        self.records.insert(key, record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&ValueRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.records.contains_key(key)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Key, &ValueRecord)> + '_ {
        self.records.iter()
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Key> + '_ {
        self.records.keys()
    }

    /// Splits the batch into consecutive batches of at most `size` records.
    /// A `size` of zero keeps the batch whole.
    pub fn chunks(self, size: usize) -> Vec<Batch> {
        if size == 0 || self.len() <= size {
            return vec![self];
        }

        let mut chunks = vec![];
        let mut current = Batch::new();
        for (key, record) in self.records {
            current.insert(key, record);
            if current.len() == size {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Splits the records by whether `pred` holds for their key.
    pub fn partition(self, mut pred: impl FnMut(&Key) -> bool) -> (Batch, Batch) {
        let mut matched = Batch::new();
        let mut rest = Batch::new();
        for (key, record) in self.records {
            if pred(&key) {
                matched.insert(key, record);
            } else {
                rest.insert(key, record);
            }
        }
        (matched, rest)
    }
}

impl FromIterator<(Key, ValueRecord)> for Batch {
    fn from_iter<T: IntoIterator<Item = (Key, ValueRecord)>>(iter: T) -> Self {
        Batch {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Batch {
    type Item = (Key, ValueRecord);
    type IntoIter = indexmap::map::IntoIter<Key, ValueRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
