//! Store traits: the persistence seams the services are written against.
//!
//! Two backends implement them: [`crate::repositories::PgStore`] for
//! PostgreSQL and [`crate::memory::MemoryStore`] for demos and tests.
//! Listing takes a [`Predicate`] built by the core so both backends agree
//! on filter semantics.

use async_trait::async_trait;
use backoffice_core::filter::Predicate;
use backoffice_core::models::account::{Account, AccountPatch, NewAccount};
use backoffice_core::models::branch::Branch;
use backoffice_core::models::employee::{CreateEmployee, Employee, Resignation, UpdateEmployee};
use backoffice_core::models::member::{CreateMember, Member, UpdateMember};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::PageWindow;
use backoffice_core::types::DbId;

use crate::error::StoreResult;

/// Result of a conditional resignation.
#[derive(Debug, Clone)]
pub enum ResignOutcome {
    Resigned(Employee),
    /// The employee was already resigned; stored metadata is untouched.
    AlreadyResigned(Employee),
    NotFound,
}

/// Result of an employee update.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Updated(Employee),
    /// A status change was requested but the employee is resigned;
    /// nothing was written.
    AlreadyResigned(Employee),
    NotFound,
}

#[async_trait]
pub trait BranchStore: Send + Sync {
    /// Active branches ordered by name.
    async fn list_active_branches(&self) -> StoreResult<Vec<Branch>>;

    async fn find_branch(&self, id: DbId) -> StoreResult<Option<Branch>>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Reserve the next member code and insert the member as one atomic unit.
    ///
    /// Fails with `Conflict` if the code was taken concurrently.
    async fn create_member(&self, input: &CreateMember) -> StoreResult<Member>;

    async fn count_members(&self, predicate: &Predicate) -> StoreResult<u64>;

    /// One page of matching members, newest first.
    async fn list_members(&self, predicate: &Predicate, window: PageWindow)
        -> StoreResult<Vec<Member>>;

    async fn find_member(&self, id: DbId) -> StoreResult<Option<Member>>;

    async fn update_member(&self, id: DbId, patch: &UpdateMember) -> StoreResult<Option<Member>>;

    /// Hard delete. Service records cascade. Returns `false` if absent.
    async fn delete_member(&self, id: DbId) -> StoreResult<bool>;

    /// Service history of a member, newest first, optionally capped.
    async fn member_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Reserve the next employee code and insert the login account and the
    /// employee as one atomic unit.
    ///
    /// Fails with `Conflict` on a code collision and `DuplicateIdentifier`
    /// if the account e-mail is taken.
    async fn create_employee(
        &self,
        account: &NewAccount,
        input: &CreateEmployee,
    ) -> StoreResult<Employee>;

    async fn count_employees(&self, predicate: &Predicate) -> StoreResult<u64>;

    /// One page of matching employees, newest first.
    async fn list_employees(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> StoreResult<Vec<Employee>>;

    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>>;

    async fn find_employee_by_user(&self, user_id: DbId) -> StoreResult<Option<Employee>>;

    /// Apply the employee and account patches atomically.
    ///
    /// A patch that sets a status is refused once the employee is resigned.
    /// The check and the write happen under the same lock, so a concurrent
    /// resignation cannot be overwritten.
    async fn update_employee(
        &self,
        id: DbId,
        patch: &UpdateEmployee,
        account: &AccountPatch,
    ) -> StoreResult<UpdateOutcome>;

    /// Mark an employee resigned unless it already is.
    async fn resign_employee(
        &self,
        id: DbId,
        resignation: &Resignation,
    ) -> StoreResult<ResignOutcome>;

    /// Service history handled by an employee, newest first, optionally capped.
    async fn employee_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(&self, id: DbId) -> StoreResult<Option<Account>>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Stamp `last_login_at` with the current time.
    async fn record_login(&self, id: DbId) -> StoreResult<()>;
}

/// Everything the API needs from a backend.
#[async_trait]
pub trait Store: BranchStore + MemberStore + EmployeeStore + AccountStore {
    /// Cheap reachability probe.
    async fn health_check(&self) -> StoreResult<()>;
}
