//! `branches` table.

use async_trait::async_trait;
use backoffice_core::models::branch::Branch;
use backoffice_core::types::DbId;

use super::PgStore;
use crate::error::StoreResult;
use crate::models::branch::BranchRow;
use crate::store::BranchStore;

const COLUMNS: &str = "id, name, code, address, phone";

#[async_trait]
impl BranchStore for PgStore {
    async fn list_active_branches(&self) -> StoreResult<Vec<Branch>> {
        let query =
            format!("SELECT {COLUMNS} FROM branches WHERE status = 'active' ORDER BY name ASC");
        let rows = sqlx::query_as::<_, BranchRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Branch::from).collect())
    }

    async fn find_branch(&self, id: DbId) -> StoreResult<Option<Branch>> {
        let query = format!("SELECT {COLUMNS} FROM branches WHERE id = $1");
        let row = sqlx::query_as::<_, BranchRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Branch::from))
    }
}
