use crate::libs::user::{PriorityClass, User};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

const INSERT_USER: &str = "INSERT INTO users (phone_number, priority_class, created_at) VALUES (?1, ?2, ?3)";
const UPDATE_USER: &str = "UPDATE users SET phone_number = ?2, priority_class = ?3 WHERE id = ?1";
const SELECT_USERS: &str = "SELECT id, phone_number, priority_class, created_at FROM users";

impl ToSql for PriorityClass {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for PriorityClass {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        PriorityClass::try_from(value.as_i64()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn map_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        priority_class: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub struct Users<'a> {
    conn: &'a Connection,
}

impl<'a> Users<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Users { conn }
    }

    pub fn insert(&self, user: &User, now: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(INSERT_USER, params![user.phone_number, user.priority_class, now])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, user: &User) -> Result<usize> {
        self.conn.execute(UPDATE_USER, params![id, user.phone_number, user.priority_class])
    }

    pub fn get(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_USERS), [id], map_user)
            .optional()
    }

    pub fn get_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        self.conn
            .query_row(&format!("{} WHERE phone_number = ?1", SELECT_USERS), [phone_number], map_user)
            .optional()
    }

    pub fn fetch_all(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY priority_class, id", SELECT_USERS))?;
        let users = stmt.query_map([], map_user)?.collect::<Result<Vec<_>>>()?;
        Ok(users)
    }
}
