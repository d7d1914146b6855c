use backoffice_core::models::account::Account;
use backoffice_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::parse_text;
use crate::error::StoreError;

#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub status: String,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            status: parse_text(&row.status)?,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        })
    }
}
