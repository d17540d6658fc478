use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::User;

use super::{now_text, parse_datetime};

pub fn insert_user(
    conn: &Connection,
    username: &str,
    token_hash: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (username, token_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, token_hash, now_text()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_token_hash(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<User>, DatabaseError> {
    query_user(
        conn,
        "SELECT id, username, token_hash, created_at FROM users WHERE token_hash = ?1",
        token_hash,
    )
}

pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    query_user(
        conn,
        "SELECT id, username, token_hash, created_at FROM users WHERE username = ?1",
        username,
    )
}

/// Idempotent bootstrap: make sure `username` exists with exactly this
/// token hash. Returns the user id.
pub fn ensure_user_token(
    conn: &Connection,
    username: &str,
    token_hash: &str,
) -> Result<i64, DatabaseError> {
    match get_user_by_username(conn, username)? {
        Some(user) => {
            if user.token_hash != token_hash {
                conn.execute(
                    "UPDATE users SET token_hash = ?1 WHERE id = ?2",
                    params![token_hash, user.id],
                )?;
            }
            Ok(user.id)
        }
        None => insert_user(conn, username, token_hash),
    }
}

fn query_user(conn: &Connection, sql: &str, key: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let result = stmt.query_row(params![key], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    });

    match result {
        Ok((id, username, token_hash, created_at)) => Ok(Some(User {
            id,
            username,
            token_hash,
            created_at: parse_datetime(&created_at).unwrap_or_default(),
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
