//! One file per resource. Every function takes a `&Connection` and runs
//! a single parameterized statement; zero affected rows on an update or
//! delete surfaces as `DatabaseError::NotFound`.

pub mod client;
pub mod inspection;
pub mod notification;
pub mod product;
pub mod schedule;
pub mod service;
pub mod station;
pub mod user;

use rusqlite::types::Type;

/// Wrap a domain parse failure (uuid, enum, JSON) into the rusqlite error
/// channel so row-mapping closures stay `rusqlite::Result`.
pub(crate) fn conversion_err<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
