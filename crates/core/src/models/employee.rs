//! Employee models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{Field, Searchable};
use crate::models::account::AccountSummary;
use crate::models::branch::BranchSummary;
use crate::models::service_record::ServiceRecord;
use crate::status::EmployeeStatus;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: DbId,
    pub user_id: DbId,
    /// Sequential code (`E000001`). Immutable after creation.
    pub employee_number: String,
    pub name: String,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub branch_id: DbId,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub resignation_date: Option<Timestamp>,
    pub resignation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user: AccountSummary,
    pub branch: BranchSummary,
}

/// Employee plus its most recent service records (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    pub service_records: Vec<ServiceRecord>,
}

#[derive(Debug, Clone)]
pub struct CreateEmployee {
    pub name: String,
    pub branch_id: DbId,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

/// Partial employee update. `None` leaves the stored value untouched.
///
/// `status` must already have passed [`EmployeeStatus::check_update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub branch_id: Option<DbId>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

impl UpdateEmployee {
    /// Apply the patch to an in-memory copy.
    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(branch_id) = self.branch_id {
            employee.branch_id = branch_id;
        }
        if let Some(title) = &self.title {
            employee.title = Some(title.clone());
        }
        if let Some(phone) = &self.phone {
            employee.phone = Some(phone.clone());
        }
        if let Some(hire_date) = self.hire_date {
            employee.hire_date = Some(hire_date);
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
    }
}

/// Resignation metadata recorded when an employee leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resignation {
    pub date: Timestamp,
    pub reason: String,
}

impl Searchable for Employee {
    fn text_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Phone => self.phone.as_deref(),
            Field::Code => Some(&self.employee_number),
            Field::AccountEmail => Some(&self.user.email),
            Field::Status => Some(self.status.as_str()),
            Field::Email | Field::BranchId => None,
        }
    }

    fn id_field(&self, field: Field) -> Option<DbId> {
        match field {
            Field::BranchId => Some(self.branch_id),
            _ => None,
        }
    }
}
