use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

const UPSERT_CONTACT: &str = "INSERT INTO contacts (user_id, last_contacted_at) VALUES (?1, ?2)
    ON CONFLICT(user_id) DO UPDATE SET last_contacted_at = excluded.last_contacted_at";
const SELECT_CONTACT: &str = "SELECT last_contacted_at FROM contacts WHERE user_id = ?1";

/// Last answered call per user.
pub struct Contacts<'a> {
    conn: &'a Connection,
}

impl<'a> Contacts<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Contacts { conn }
    }

    pub fn upsert(&self, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(UPSERT_CONTACT, params![user_id, at])?;
        Ok(())
    }

    pub fn get(&self, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        self.conn.query_row(SELECT_CONTACT, [user_id], |row| row.get(0)).optional()
    }
}
