use rusqlite::{params, Connection, Row};

use super::{optional, parse_column, server_timestamp};
use crate::db::DatabaseError;
use crate::models::Account;

const ACCOUNT_COLUMNS: &str =
    "uid, email, provider, password_hash, password_salt, display_name, created_at, last_sign_in";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        uid: row.get(0)?,
        email: row.get(1)?,
        provider: parse_column(2, row.get(2)?)?,
        password_hash: row.get(3)?,
        password_salt: row.get(4)?,
        display_name: row.get(5)?,
        created_at: row.get(6)?,
        last_sign_in: row.get(7)?,
    })
}

pub fn insert_account(conn: &Connection, account: &Account) -> Result<(), DatabaseError> {
    let result = conn.execute(
        "INSERT INTO accounts (uid, email, provider, password_hash, password_salt, display_name, created_at, last_sign_in)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            account.uid,
            account.email,
            account.provider.as_str(),
            account.password_hash,
            account.password_salt,
            account.display_name,
            account.created_at,
            account.last_sign_in,
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(DatabaseError::ConstraintViolation(format!(
                "account already exists for {}",
                account.email
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Lookup by email. Emails are stored lowercased.
pub fn get_account_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Account>, DatabaseError> {
    optional(conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
        params![email.to_lowercase()],
        account_from_row,
    ))
}

pub fn get_account(conn: &Connection, uid: &str) -> Result<Option<Account>, DatabaseError> {
    optional(conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE uid = ?1"),
        params![uid],
        account_from_row,
    ))
}

pub fn record_sign_in(conn: &Connection, uid: &str) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE accounts SET last_sign_in = ?1 WHERE uid = ?2",
        params![server_timestamp(), uid],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Account".into(),
            id: uid.into(),
        });
    }
    Ok(())
}
