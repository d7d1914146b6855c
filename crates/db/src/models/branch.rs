use backoffice_core::models::branch::Branch;
use backoffice_core::types::DbId;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct BranchRow {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Branch {
            id: row.id,
            name: row.name,
            code: row.code,
            address: row.address,
            phone: row.phone,
        }
    }
}
