use backoffice_core::models::branch::BranchSummary;
use backoffice_core::models::member::Member;
use backoffice_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use sqlx::FromRow;

use super::parse_text;
use crate::error::StoreError;

#[derive(Debug, FromRow)]
pub struct MemberRow {
    pub id: DbId,
    pub member_number: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub home_branch_id: DbId,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub branch_name: String,
    pub branch_code: String,
}

impl TryFrom<MemberRow> for Member {
    type Error = StoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let gender = row.gender.as_deref().map(parse_text).transpose()?;
        Ok(Member {
            id: row.id,
            member_number: row.member_number,
            name: row.name,
            phone: row.phone,
            email: row.email,
            home_branch_id: row.home_branch_id,
            birth_date: row.birth_date,
            gender,
            status: parse_text(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            home_branch: BranchSummary {
                id: row.home_branch_id,
                name: row.branch_name,
                code: row.branch_code,
            },
        })
    }
}
