//! Member (customer) models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{Field, Searchable};
use crate::models::branch::BranchSummary;
use crate::models::service_record::ServiceRecord;
use crate::status::{Gender, MemberStatus};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: DbId,
    /// Sequential code (`M000001`). Immutable after creation.
    pub member_number: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub home_branch_id: DbId,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub status: MemberStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub home_branch: BranchSummary,
}

/// Member plus its service history (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    pub service_records: Vec<ServiceRecord>,
}

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub home_branch_id: DbId,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Partial member update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMember {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub home_branch_id: Option<DbId>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub status: Option<MemberStatus>,
}

impl UpdateMember {
    /// Apply the patch to an in-memory copy.
    pub fn apply_to(&self, member: &mut Member) {
        if let Some(name) = &self.name {
            member.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            member.phone = Some(phone.clone());
        }
        if let Some(email) = &self.email {
            member.email = Some(email.clone());
        }
        if let Some(branch_id) = self.home_branch_id {
            member.home_branch_id = branch_id;
        }
        if let Some(birth_date) = self.birth_date {
            member.birth_date = Some(birth_date);
        }
        if let Some(gender) = self.gender {
            member.gender = Some(gender);
        }
        if let Some(status) = self.status {
            member.status = status;
        }
    }
}

impl Searchable for Member {
    fn text_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Phone => self.phone.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Code => Some(&self.member_number),
            Field::Status => Some(self.status.as_str()),
            Field::AccountEmail | Field::BranchId => None,
        }
    }

    fn id_field(&self, field: Field) -> Option<DbId> {
        match field {
            Field::BranchId => Some(self.home_branch_id),
            _ => None,
        }
    }
}
