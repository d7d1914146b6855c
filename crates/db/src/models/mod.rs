//! Row types returned by the PostgreSQL queries.
//!
//! Each row flattens the joined projections (branch, account, member)
//! into prefixed columns and converts into the core model with `TryFrom`,
//! which is where stored text enums are parsed.

pub mod account;
pub mod branch;
pub mod employee;
pub mod member;
pub mod service_record;

use std::str::FromStr;

use backoffice_core::status::UnknownVariant;

use crate::error::StoreError;

/// Parse a stored text enum, reporting unknown values as corrupt rows.
pub(crate) fn parse_text<T>(raw: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.parse().map_err(|e: UnknownVariant| StoreError::Corrupt(e.to_string()))
}
