//! Branch (store location) models.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Branch row as listed by `GET /branches` (active branches only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Branch projection embedded in members, employees and service records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSummary {
    pub id: DbId,
    pub name: String,
    pub code: String,
}

impl From<&Branch> for BranchSummary {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name.clone(),
            code: branch.code.clone(),
        }
    }
}
