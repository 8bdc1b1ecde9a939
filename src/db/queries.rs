use chrono::Utc;
use rusqlite::{params, Connection};

/// Scope shared by every session, the equivalent of browser local storage.
pub const LOCAL_SCOPE: &str = "local";

// ── Storage items ──

pub fn get_item(conn: &Connection, scope: &str, key: &str) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT value FROM storage_items WHERE scope = ?1 AND key = ?2",
        params![scope, key],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_item(conn: &Connection, scope: &str, key: &str, value: &str) -> anyhow::Result<()> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    conn.execute(
        "INSERT INTO storage_items (scope, key, value, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(scope, key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![scope, key, value, now],
    )?;
    Ok(())
}

pub fn remove_item(conn: &Connection, scope: &str, key: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM storage_items WHERE scope = ?1 AND key = ?2",
        params![scope, key],
    )?;
    Ok(count > 0)
}
