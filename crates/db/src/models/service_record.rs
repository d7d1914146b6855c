use backoffice_core::models::branch::BranchSummary;
use backoffice_core::models::service_record::{EmployeeRef, MemberRef, ServiceRecord};
use backoffice_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct ServiceRecordRow {
    pub id: DbId,
    pub member_id: DbId,
    pub employee_id: Option<DbId>,
    pub branch_id: DbId,
    pub service_date: Timestamp,
    pub service_type: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub member_name: String,
    pub member_number: String,
    pub employee_name: Option<String>,
    pub employee_number: Option<String>,
    pub branch_name: String,
    pub branch_code: String,
}

impl From<ServiceRecordRow> for ServiceRecord {
    fn from(row: ServiceRecordRow) -> Self {
        let employee = match (row.employee_id, row.employee_name, row.employee_number) {
            (Some(id), Some(name), Some(employee_number)) => Some(EmployeeRef {
                id,
                name,
                employee_number,
            }),
            _ => None,
        };
        ServiceRecord {
            id: row.id,
            member_id: row.member_id,
            employee_id: row.employee_id,
            branch_id: row.branch_id,
            service_date: row.service_date,
            service_type: row.service_type,
            notes: row.notes,
            created_at: row.created_at,
            member: MemberRef {
                id: row.member_id,
                name: row.member_name,
                member_number: row.member_number,
            },
            employee,
            branch: BranchSummary {
                id: row.branch_id,
                name: row.branch_name,
                code: row.branch_code,
            },
        }
    }
}
