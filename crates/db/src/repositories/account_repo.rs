//! `users` table (login accounts).

use async_trait::async_trait;
use backoffice_core::models::account::Account;
use backoffice_core::types::DbId;

use super::PgStore;
use crate::error::StoreResult;
use crate::models::account::AccountRow;
use crate::store::AccountStore;

const COLUMNS: &str = "id, email, password_hash, status, last_login_at, created_at";

#[async_trait]
impl AccountStore for PgStore {
    async fn find_account(&self, id: DbId) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn record_login(&self, id: DbId) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
