use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

// Takes a free or expired lease; a live lease of another holder leaves the row untouched.
const CLAIM_LEASE: &str = "INSERT INTO job_leases (name, holder, expires_at) VALUES (?1, ?2, ?4)
    ON CONFLICT(name) DO UPDATE SET holder = excluded.holder, expires_at = excluded.expires_at
    WHERE job_leases.expires_at <= ?3";
const RENEW_LEASE: &str = "UPDATE job_leases SET expires_at = ?3 WHERE name = ?1 AND holder = ?2";
const RELEASE_LEASE: &str = "DELETE FROM job_leases WHERE name = ?1 AND holder = ?2";

/// Job run leases.
pub struct Leases<'a> {
    conn: &'a Connection,
}

impl<'a> Leases<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Leases { conn }
    }

    pub fn claim(&self, name: &str, holder: &str, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<bool> {
        Ok(self.conn.execute(CLAIM_LEASE, params![name, holder, now, expires_at])? == 1)
    }

    pub fn renew(&self, name: &str, holder: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        Ok(self.conn.execute(RENEW_LEASE, params![name, holder, expires_at])? == 1)
    }

    pub fn release(&self, name: &str, holder: &str) -> Result<()> {
        self.conn.execute(RELEASE_LEASE, params![name, holder])?;
        Ok(())
    }
}
