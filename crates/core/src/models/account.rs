//! Login accounts (`users` table).

use serde::{Deserialize, Serialize};

use crate::status::AccountStatus;
use crate::types::{DbId, Timestamp};

/// Full account row. Holds the password hash, so it is deliberately not
/// `Serialize`; use [`AccountSummary`] in responses.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Account projection embedded in employee responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: DbId,
    pub email: String,
    pub status: AccountStatus,
    pub last_login_at: Option<Timestamp>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            status: account.status,
            last_login_at: account.last_login_at,
        }
    }
}

/// Credentials for a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Account fields an employee update may change.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none()
    }
}
