//! Repository layer: per-collection database operations.
//!
//! Every function takes a borrowed `Connection`; callers own the
//! connection lifetime. Writes stamp a server-assigned timestamp.

mod account;
mod chat_message;
mod medication;
mod metrics;
mod mood;
mod profile;
mod water;

use chrono::NaiveDateTime;

use super::DatabaseError;

pub use account::*;
pub use chat_message::*;
pub use medication::*;
pub use metrics::*;
pub use mood::*;
pub use profile::*;
pub use water::*;

/// Timestamp assigned by the store on every write.
pub(crate) fn server_timestamp() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Map a "no rows" result to `None`.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>, DatabaseError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Decode a stored enum column, surfacing bad values as a row conversion error.
pub(crate) fn parse_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = DatabaseError>,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
