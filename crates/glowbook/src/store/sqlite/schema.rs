//! SQL statements for the key-value table.

/// Creates the key-value table.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

pub const SELECT_VALUE: &str = r#"
SELECT value FROM kv_store WHERE key = ?1
"#;

/// Upsert: writes always overwrite.
pub const UPSERT_VALUE: &str = r#"
INSERT INTO kv_store (key, value) VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#;

pub const DELETE_VALUE: &str = r#"
DELETE FROM kv_store WHERE key = ?1
"#;

pub const SELECT_KEYS: &str = r#"
SELECT key FROM kv_store ORDER BY key ASC
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_valid_sql() {
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS kv_store"));
    }

    #[test]
    fn test_upsert_overwrites() {
        assert!(UPSERT_VALUE.contains("ON CONFLICT(key) DO UPDATE"));
    }
}
