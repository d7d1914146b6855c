use backoffice_core::models::account::AccountSummary;
use backoffice_core::models::branch::BranchSummary;
use backoffice_core::models::employee::Employee;
use backoffice_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use sqlx::FromRow;

use super::parse_text;
use crate::error::StoreError;

#[derive(Debug, FromRow)]
pub struct EmployeeRow {
    pub id: DbId,
    pub user_id: DbId,
    pub employee_number: String,
    pub name: String,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub branch_id: DbId,
    pub hire_date: Option<NaiveDate>,
    pub status: String,
    pub resignation_date: Option<Timestamp>,
    pub resignation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_email: String,
    pub user_status: String,
    pub user_last_login_at: Option<Timestamp>,
    pub branch_name: String,
    pub branch_code: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: row.id,
            user_id: row.user_id,
            employee_number: row.employee_number,
            name: row.name,
            title: row.title,
            phone: row.phone,
            branch_id: row.branch_id,
            hire_date: row.hire_date,
            status: parse_text(&row.status)?,
            resignation_date: row.resignation_date,
            resignation_reason: row.resignation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: AccountSummary {
                id: row.user_id,
                email: row.user_email,
                status: parse_text(&row.user_status)?,
                last_login_at: row.user_last_login_at,
            },
            branch: BranchSummary {
                id: row.branch_id,
                name: row.branch_name,
                code: row.branch_code,
            },
        })
    }
}
