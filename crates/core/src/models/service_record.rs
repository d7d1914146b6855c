//! Service records: visits/treatments performed for a member at a branch.

use serde::{Deserialize, Serialize};

use crate::models::branch::BranchSummary;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub id: DbId,
    pub name: String,
    pub member_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    pub id: DbId,
    pub name: String,
    pub employee_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: DbId,
    pub member_id: DbId,
    pub employee_id: Option<DbId>,
    pub branch_id: DbId,
    pub service_date: Timestamp,
    pub service_type: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub member: MemberRef,
    pub employee: Option<EmployeeRef>,
    pub branch: BranchSummary,
}
