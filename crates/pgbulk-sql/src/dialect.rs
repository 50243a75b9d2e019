use pgbulk_core::driver::{Capability, ServerVersion};

/// What the connected database accepts, negotiated once per call.
///
/// Statement shapes and function rendering consult this value instead of
/// querying the driver while SQL is being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// `INSERT ... ON CONFLICT` is available
    pub insert_on_conflict: bool,

    /// `RETURNING` is available on write statements
    pub returning: bool,

    /// `SELECT ... FOR UPDATE` is available
    pub select_for_update: bool,

    /// `jsonb || jsonb` merges objects. When unset, JSON concatenation calls
    /// the merge function installed by [`crate::migration`].
    pub jsonb_concat: bool,

    pub version: ServerVersion,
}

impl Dialect {
    pub fn new(capability: &Capability, version: ServerVersion) -> Dialect {
        let modern = version >= capability.upsert_min_version;

        Dialect {
            insert_on_conflict: capability.insert_on_conflict && modern,
            returning: capability.returning,
            select_for_update: capability.select_for_update,
            jsonb_concat: modern,
            version,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::new(&Capability::POSTGRESQL, ServerVersion::new(16, 0, 0))
    }
}
