//! `service_records` table (read-only).

use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::types::DbId;

use super::PgStore;
use crate::error::StoreResult;
use crate::models::service_record::ServiceRecordRow;

const COLUMNS: &str = "s.id, s.member_id, s.employee_id, s.branch_id, s.service_date, \
                       s.service_type, s.notes, s.created_at, \
                       m.name AS member_name, m.member_number, \
                       e.name AS employee_name, e.employee_number, \
                       b.name AS branch_name, b.code AS branch_code";

impl PgStore {
    /// Records whose `owner_column` equals `id`, newest first.
    ///
    /// `LIMIT NULL` means no limit in PostgreSQL.
    pub(crate) async fn service_records_for(
        &self,
        owner_column: &'static str,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_records s \
             JOIN members m ON m.id = s.member_id \
             LEFT JOIN employees e ON e.id = s.employee_id \
             JOIN branches b ON b.id = s.branch_id \
             WHERE {owner_column} = $1 \
             ORDER BY s.service_date DESC \
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ServiceRecordRow>(&query)
            .bind(id)
            .bind(limit.map(i64::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ServiceRecord::from).collect())
    }
}
