//! `SQLite` schema for the local key-value store.
//!
//! The store mirrors browser local storage: a flat `key -> text` table.
//! Schema changes are expressed as numbered migrations.

/// Metadata table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Version 1: the item table.
pub const MIGRATION_V1: &str = r"
CREATE TABLE IF NOT EXISTS items (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
";

/// Version 2: track when each item was last written.
pub const MIGRATION_V2: &str = r"
ALTER TABLE items ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
CREATE INDEX IF NOT EXISTS idx_items_updated_at ON items(updated_at DESC);
";

/// All migrations as `(version, sql)`, in ascending order.
pub const MIGRATIONS: &[(i32, &str)] = &[(1, MIGRATION_V1), (2, MIGRATION_V2)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|(v, _)| *v).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
        assert_eq!(versions.first(), Some(&1));
    }

    #[test]
    fn test_items_table_columns() {
        assert!(MIGRATION_V1.contains("key TEXT PRIMARY KEY"));
        assert!(MIGRATION_V1.contains("value TEXT NOT NULL"));
        assert!(MIGRATION_V2.contains("updated_at"));
    }
}
