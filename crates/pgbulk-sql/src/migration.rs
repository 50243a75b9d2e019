//! SQL installing the JSONB merge function.
//!
//! Servers older than 9.5 have no `jsonb || jsonb`. On those servers JSON
//! concatenation calls [`JSONB_MERGE_FUNCTION`] instead, which must be
//! created once, e.g. from a schema migration, before it is used.

pub const JSONB_MERGE_FUNCTION: &str = "pgbulk_jsonb_merge";

/// Creates (or replaces) the merge function. Keys of the right operand win.
pub fn create_jsonb_merge_function() -> String {
    format!(
        "CREATE OR REPLACE FUNCTION {JSONB_MERGE_FUNCTION}(lhs JSONB, rhs JSONB) \
         RETURNS JSONB LANGUAGE sql IMMUTABLE AS $$ \
         SELECT COALESCE(json_object_agg(merged.key, merged.value)::JSONB, '{{}}'::JSONB) \
         FROM ( \
         SELECT key, value FROM jsonb_each(lhs) WHERE NOT rhs ? key \
         UNION ALL \
         SELECT key, value FROM jsonb_each(rhs) \
         ) AS merged \
         $$"
    )
}

pub fn drop_jsonb_merge_function() -> String {
    format!("DROP FUNCTION IF EXISTS {JSONB_MERGE_FUNCTION}(lhs JSONB, rhs JSONB)")
}
