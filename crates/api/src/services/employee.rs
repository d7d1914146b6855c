//! Employee use cases: account-backed creation, the status machine and
//! resignation.

use std::sync::Arc;

use backoffice_core::error::{CoreError, CoreResult};
use backoffice_core::filter::{self, ListFilter};
use backoffice_core::models::account::{AccountPatch, NewAccount};
use backoffice_core::models::employee::{
    CreateEmployee, Employee, EmployeeDetail, Resignation, UpdateEmployee,
};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::{paginate, PageRequest, PageResult};
use backoffice_core::status::{
    validate_resignation_reason, TransitionError, LEGACY_RESIGNATION_REASON,
};
use backoffice_core::types::{DbId, EntityKind, Timestamp};
use backoffice_db::{AccountStore, EmployeeStore, ResignOutcome, StoreError, UpdateOutcome};

use crate::auth::password::hash_password;

/// Login credentials for a new employee. The password is plaintext here
/// and hashed before it reaches the store.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Optional account changes made through an employee update.
#[derive(Debug, Clone, Default)]
pub struct CredentialChange {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    accounts: Arc<dyn AccountStore>,
    history_limit: Option<u32>,
    retry_attempts: u32,
}

impl EmployeeService {
    pub fn new(
        store: Arc<dyn EmployeeStore>,
        accounts: Arc<dyn AccountStore>,
        history_limit: Option<u32>,
        retry_attempts: u32,
    ) -> Self {
        Self {
            store,
            accounts,
            history_limit,
            retry_attempts: retry_attempts.max(1),
        }
    }

    /// Create the login account and the employee with the next `E` code.
    pub async fn create(
        &self,
        credentials: &Credentials,
        input: &CreateEmployee,
    ) -> CoreResult<Employee> {
        self.ensure_email_free(&credentials.email, None).await?;
        let account = NewAccount {
            email: credentials.email.clone(),
            password_hash: hash(&credentials.password)?,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.create_employee(&account, input).await {
                Ok(employee) => {
                    tracing::info!(
                        employee_id = %employee.id,
                        employee_number = %employee.employee_number,
                        user_id = %employee.user_id,
                        "Employee created"
                    );
                    return Ok(employee);
                }
                Err(StoreError::Conflict(code)) if attempt < self.retry_attempts => {
                    tracing::warn!(attempt, code = %code, "Employee code collision, retrying");
                }
                Err(StoreError::Conflict(code)) => {
                    return Err(CoreError::Conflict(format!(
                        "Could not reserve an employee code after {attempt} attempts (last tried {code})"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One page of employees matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &ListFilter,
        request: PageRequest,
    ) -> CoreResult<PageResult<Employee>> {
        let predicate = filter::build(EntityKind::Employee, filter);
        let total = self.store.count_employees(&predicate).await?;
        let page = paginate(request, total);
        let data = self.store.list_employees(&predicate, page.window).await?;
        Ok(PageResult {
            data,
            pagination: page.meta,
        })
    }

    /// An employee with its most recent service records.
    pub async fn get(&self, id: DbId) -> CoreResult<EmployeeDetail> {
        let employee = self.find(id).await?;
        let service_records = self
            .store
            .employee_service_records(id, self.history_limit)
            .await?;
        Ok(EmployeeDetail {
            employee,
            service_records,
        })
    }

    /// Partial update of the employee and, optionally, its login account.
    ///
    /// Status changes go through the status machine: `resigned` can neither
    /// be entered nor left here.
    pub async fn update(
        &self,
        id: DbId,
        patch: &UpdateEmployee,
        credentials: &CredentialChange,
    ) -> CoreResult<Employee> {
        let current = self.find(id).await?;

        if let Some(to) = patch.status {
            current
                .status
                .check_update(to)
                .map_err(|e| transition_error(e, &current))?;
        }

        let mut account = AccountPatch::default();
        if let Some(email) = &credentials.email {
            if *email != current.user.email {
                self.ensure_email_free(email, Some(current.user_id)).await?;
                account.email = Some(email.clone());
            }
        }
        if let Some(password) = &credentials.password {
            account.password_hash = Some(hash(password)?);
        }

        // The store re-checks the status under its lock: a resignation may
        // have landed since `current` was read.
        match self.store.update_employee(id, patch, &account).await? {
            UpdateOutcome::Updated(employee) => {
                tracing::info!(employee_id = %id, account_changed = !account.is_empty(), "Employee updated");
                Ok(employee)
            }
            UpdateOutcome::AlreadyResigned(employee) => {
                tracing::info!(employee_id = %id, "Status change refused: employee resigned meanwhile");
                Err(CoreError::AlreadyResigned(employee.name))
            }
            UpdateOutcome::NotFound => Err(CoreError::NotFound {
                entity: "Employee",
                id,
            }),
        }
    }

    /// Mark an employee resigned and deactivate its login account. `date`
    /// defaults to now.
    ///
    /// A second resignation fails with `AlreadyResigned` and keeps the
    /// reason and date recorded the first time.
    pub async fn resign(
        &self,
        id: DbId,
        reason: &str,
        date: Option<Timestamp>,
    ) -> CoreResult<Employee> {
        validate_resignation_reason(reason).map_err(CoreError::Validation)?;
        let resignation = Resignation {
            date: date.unwrap_or_else(chrono::Utc::now),
            reason: reason.to_string(),
        };

        match self.store.resign_employee(id, &resignation).await? {
            ResignOutcome::Resigned(employee) => {
                tracing::info!(
                    employee_id = %id,
                    employee_number = %employee.employee_number,
                    resignation_date = %resignation.date,
                    "Employee resigned"
                );
                Ok(employee)
            }
            ResignOutcome::AlreadyResigned(employee) => {
                Err(CoreError::AlreadyResigned(employee.name))
            }
            ResignOutcome::NotFound => Err(CoreError::NotFound {
                entity: "Employee",
                id,
            }),
        }
    }

    /// Deprecated delete path: resigns with a generic reason.
    pub async fn remove(&self, id: DbId) -> CoreResult<Employee> {
        tracing::warn!(
            employee_id = %id,
            "DELETE /employees/{{id}} is deprecated; use POST /employees/{{id}}/resign"
        );
        self.resign(id, LEGACY_RESIGNATION_REASON, None).await
    }

    /// Full service history handled by an employee, newest first.
    pub async fn service_records(&self, id: DbId) -> CoreResult<Vec<ServiceRecord>> {
        self.find(id).await?;
        Ok(self.store.employee_service_records(id, None).await?)
    }

    async fn find(&self, id: DbId) -> CoreResult<Employee> {
        self.store
            .find_employee(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Employee",
                id,
            })
    }

    /// Fail with `DuplicateIdentifier` if another account uses `email`.
    async fn ensure_email_free(&self, email: &str, owner: Option<DbId>) -> CoreResult<()> {
        match self.accounts.find_account_by_email(email).await? {
            Some(account) if Some(account.id) != owner => Err(CoreError::DuplicateIdentifier(
                format!("Email {email} is already in use"),
            )),
            _ => Ok(()),
        }
    }
}

fn hash(password: &str) -> CoreResult<String> {
    hash_password(password).map_err(|e| CoreError::Internal(format!("Password hashing failed: {e}")))
}

fn transition_error(err: TransitionError, employee: &Employee) -> CoreError {
    match err {
        TransitionError::AlreadyResigned => CoreError::AlreadyResigned(employee.name.clone()),
        TransitionError::ResignationRequiresReason => CoreError::Validation(
            "Status 'resigned' can only be set through POST /employees/{id}/resign".into(),
        ),
    }
}
