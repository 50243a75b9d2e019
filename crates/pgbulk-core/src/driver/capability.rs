use super::ServerVersion;

#[derive(Debug, Clone)]
pub struct Capability {
    /// Supports `INSERT ... ON CONFLICT`, given a new enough server.
    pub insert_on_conflict: bool,

    /// Supports `RETURNING` on write statements.
    pub returning: bool,

    /// Supports row-level locking with `SELECT ... FOR UPDATE`.
    pub select_for_update: bool,

    /// Oldest server version accepting `ON CONFLICT` and `jsonb || jsonb`.
    pub upsert_min_version: ServerVersion,
}

impl Capability {
    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        insert_on_conflict: true,
        returning: true,
        select_for_update: true,
        upsert_min_version: ServerVersion::new(9, 5, 0),
    };
}
