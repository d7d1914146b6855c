//! Shared query parameter types for API handlers.

use backoffice_core::filter::ListFilter;
use backoffice_core::pagination::PageRequest;
use backoffice_core::status::EmployeeStatus;
use backoffice_core::types::DbId;
use serde::Deserialize;

use crate::error::AppError;

/// List parameters (`?page=&limit=&search=&branchId=&status=`).
///
/// Everything arrives as text. `page` and `limit` go through
/// [`PageRequest::from_raw`], so junk falls back to the defaults instead of
/// failing the request. `branchId` and `status` are exact filters and a
/// malformed value is a `400`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub branch_id: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }

    /// Filter for member listings. `status` is not a member filter and is ignored.
    pub fn member_filter(&self) -> Result<ListFilter, AppError> {
        Ok(ListFilter {
            search: self.search.clone(),
            branch_id: self.branch_id()?,
            status: None,
        })
    }

    /// Filter for employee listings, with `status` checked against the enum.
    pub fn employee_filter(&self) -> Result<ListFilter, AppError> {
        let status = match non_empty(self.status.as_deref()) {
            Some(raw) => Some(
                raw.parse::<EmployeeStatus>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };
        Ok(ListFilter {
            search: self.search.clone(),
            branch_id: self.branch_id()?,
            status,
        })
    }

    fn branch_id(&self) -> Result<Option<DbId>, AppError> {
        non_empty(self.branch_id.as_deref())
            .map(|raw| {
                raw.parse::<DbId>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid branchId '{raw}'")))
            })
            .transpose()
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
