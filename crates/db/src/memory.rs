//! In-process store used for local demos (no `DATABASE_URL`) and tests.
//!
//! All state sits behind one [`RwLock`]. Every write, including code
//! reservation plus insertion, happens under a single write guard, which
//! gives the same atomicity the PostgreSQL store gets from transactions.

use async_trait::async_trait;
use backoffice_core::code::{max_code, next_code, SequentialCode};
use backoffice_core::filter::Predicate;
use backoffice_core::models::account::{Account, AccountPatch, AccountSummary, NewAccount};
use backoffice_core::models::branch::{Branch, BranchSummary};
use backoffice_core::models::employee::{CreateEmployee, Employee, Resignation, UpdateEmployee};
use backoffice_core::models::member::{CreateMember, Member, UpdateMember};
use backoffice_core::models::service_record::{EmployeeRef, MemberRef, ServiceRecord};
use backoffice_core::pagination::PageWindow;
use backoffice_core::status::{AccountStatus, EmployeeStatus, MemberStatus};
use backoffice_core::types::{DbId, EntityKind, Timestamp};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{
    AccountStore, BranchStore, EmployeeStore, MemberStore, ResignOutcome, Store, UpdateOutcome,
};

/// Branch to register in the store.
#[derive(Debug, Clone)]
pub struct NewBranch {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
}

/// Service record to register in the store.
#[derive(Debug, Clone)]
pub struct NewServiceRecord {
    pub member_id: DbId,
    pub employee_id: Option<DbId>,
    pub branch_id: DbId,
    pub service_date: Timestamp,
    pub service_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
struct BranchEntry {
    branch: Branch,
    active: bool,
}

#[derive(Debug, Clone)]
struct ServiceRecordEntry {
    id: DbId,
    record: NewServiceRecord,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
struct State {
    branches: Vec<BranchEntry>,
    accounts: Vec<Account>,
    /// Insertion order; listing walks it backwards for newest first.
    members: Vec<Member>,
    employees: Vec<Employee>,
    service_records: Vec<ServiceRecordEntry>,
    /// Highest number ever issued per kind. Deleted codes stay counted.
    member_high_water: Option<u32>,
    employee_high_water: Option<u32>,
}

impl State {
    fn branch_summary(&self, id: DbId) -> StoreResult<BranchSummary> {
        self.branches
            .iter()
            .find(|b| b.branch.id == id)
            .map(|b| BranchSummary::from(&b.branch))
            .ok_or_else(|| StoreError::MissingReference {
                entity: "Branch",
                reference: id.to_string(),
            })
    }

    fn email_taken(&self, email: &str, except: Option<DbId>) -> bool {
        self.accounts
            .iter()
            .any(|a| a.email == email && Some(a.id) != except)
    }

    fn next_member_code(&self) -> StoreResult<String> {
        let stored = max_code(
            EntityKind::Member,
            self.members.iter().map(|m| m.member_number.as_str()),
        );
        let current = stored.map(|c| c.number()).max(self.member_high_water);
        let code = next_code(EntityKind::Member, current)?.to_string();
        if self.members.iter().any(|m| m.member_number == code) {
            return Err(StoreError::Conflict(code));
        }
        Ok(code)
    }

    fn next_employee_code(&self) -> StoreResult<String> {
        let stored = max_code(
            EntityKind::Employee,
            self.employees.iter().map(|e| e.employee_number.as_str()),
        );
        let current = stored.map(|c| c.number()).max(self.employee_high_water);
        let code = next_code(EntityKind::Employee, current)?.to_string();
        if self.employees.iter().any(|e| e.employee_number == code) {
            return Err(StoreError::Conflict(code));
        }
        Ok(code)
    }

    fn push_member(&mut self, code: String, input: &CreateMember) -> StoreResult<Member> {
        let home_branch = self.branch_summary(input.home_branch_id)?;
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            member_number: code,
            name: input.name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            home_branch_id: input.home_branch_id,
            birth_date: input.birth_date,
            gender: input.gender,
            status: MemberStatus::Active,
            created_at: now,
            updated_at: now,
            home_branch,
        };
        if let Some(issued) = SequentialCode::parse(EntityKind::Member, &member.member_number) {
            self.member_high_water = self.member_high_water.max(Some(issued.number()));
        }
        self.members.push(member.clone());
        Ok(member)
    }

    fn push_employee(
        &mut self,
        code: String,
        account: &NewAccount,
        input: &CreateEmployee,
    ) -> StoreResult<Employee> {
        if self.email_taken(&account.email, None) {
            return Err(StoreError::DuplicateIdentifier(account.email.clone()));
        }
        let branch = self.branch_summary(input.branch_id)?;
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            status: AccountStatus::Active,
            last_login_at: None,
            created_at: now,
        };
        let employee = Employee {
            id: Uuid::new_v4(),
            user_id: account.id,
            employee_number: code,
            name: input.name.clone(),
            title: input.title.clone(),
            phone: input.phone.clone(),
            branch_id: input.branch_id,
            hire_date: input.hire_date,
            status: EmployeeStatus::Active,
            resignation_date: None,
            resignation_reason: None,
            created_at: now,
            updated_at: now,
            user: AccountSummary::from(&account),
            branch,
        };
        if let Some(issued) = SequentialCode::parse(EntityKind::Employee, &employee.employee_number) {
            self.employee_high_water = self.employee_high_water.max(Some(issued.number()));
        }
        self.accounts.push(account);
        self.employees.push(employee.clone());
        Ok(employee)
    }

    fn service_record(&self, entry: &ServiceRecordEntry) -> Option<ServiceRecord> {
        let record = &entry.record;
        let member = self.members.iter().find(|m| m.id == record.member_id)?;
        let employee = record
            .employee_id
            .and_then(|id| self.employees.iter().find(|e| e.id == id))
            .map(|e| EmployeeRef {
                id: e.id,
                name: e.name.clone(),
                employee_number: e.employee_number.clone(),
            });
        let branch = self.branch_summary(record.branch_id).ok()?;
        Some(ServiceRecord {
            id: entry.id,
            member_id: record.member_id,
            employee_id: employee.as_ref().map(|e| e.id),
            branch_id: record.branch_id,
            service_date: record.service_date,
            service_type: record.service_type.clone(),
            notes: record.notes.clone(),
            created_at: entry.created_at,
            member: MemberRef {
                id: member.id,
                name: member.name.clone(),
                member_number: member.member_number.clone(),
            },
            employee,
            branch,
        })
    }

    fn service_records_where(
        &self,
        owner: impl Fn(&NewServiceRecord) -> bool,
        limit: Option<u32>,
    ) -> Vec<ServiceRecord> {
        let mut records: Vec<ServiceRecord> = self
            .service_records
            .iter()
            .filter(|entry| owner(&entry.record))
            .filter_map(|entry| self.service_record(entry))
            .collect();
        records.sort_by(|a, b| b.service_date.cmp(&a.service_date));
        if let Some(limit) = limit {
            records.truncate(limit as usize);
        }
        records
    }
}

fn window<'a, T: Clone + 'a>(
    items: impl DoubleEndedIterator<Item = &'a T>,
    window: PageWindow,
) -> Vec<T> {
    let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
    let take = usize::try_from(window.take).unwrap_or(usize::MAX);
    items.rev().skip(skip).take(take).cloned().collect()
}

/// Store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a branch, or return the existing one with the same code.
    pub async fn upsert_branch(&self, input: &NewBranch) -> Branch {
        let mut state = self.state.write().await;
        if let Some(existing) = state.branches.iter().find(|b| b.branch.code == input.code) {
            return existing.branch.clone();
        }
        let branch = Branch {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            code: input.code.clone(),
            address: input.address.clone(),
            phone: input.phone.clone(),
        };
        state.branches.push(BranchEntry {
            branch: branch.clone(),
            active: input.active,
        });
        branch
    }

    /// Insert a member under an explicit code unless that code exists.
    pub async fn import_member(&self, code: &str, input: &CreateMember) -> StoreResult<Member> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.members.iter().find(|m| m.member_number == code) {
            return Ok(existing.clone());
        }
        state.push_member(code.to_string(), input)
    }

    /// Insert an account and employee under an explicit code unless the
    /// account e-mail already exists.
    pub async fn import_employee(
        &self,
        code: &str,
        account: &NewAccount,
        input: &CreateEmployee,
    ) -> StoreResult<Employee> {
        let mut state = self.state.write().await;
        let existing_user = state
            .accounts
            .iter()
            .find(|a| a.email == account.email)
            .map(|a| a.id);
        if let Some(user_id) = existing_user {
            if let Some(existing) = state.employees.iter().find(|e| e.user_id == user_id) {
                return Ok(existing.clone());
            }
        }
        state.push_employee(code.to_string(), account, input)
    }

    /// Register a service record for an existing member.
    pub async fn add_service_record(&self, input: NewServiceRecord) -> StoreResult<ServiceRecord> {
        let mut state = self.state.write().await;
        if !state.members.iter().any(|m| m.id == input.member_id) {
            return Err(StoreError::MissingReference {
                entity: "Member",
                reference: input.member_id.to_string(),
            });
        }
        state.branch_summary(input.branch_id)?;
        let entry = ServiceRecordEntry {
            id: Uuid::new_v4(),
            record: input,
            created_at: Utc::now(),
        };
        let record = state
            .service_record(&entry)
            .ok_or_else(|| StoreError::Corrupt("service record references vanished".into()))?;
        state.service_records.push(entry);
        Ok(record)
    }

    /// Change an account's status (used to lock accounts out of login).
    pub async fn set_account_status(&self, id: DbId, status: AccountStatus) -> bool {
        let mut state = self.state.write().await;
        let Some(account) = state.accounts.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        account.status = status;
        for employee in state.employees.iter_mut().filter(|e| e.user_id == id) {
            employee.user.status = status;
        }
        true
    }
}

#[async_trait]
impl BranchStore for MemoryStore {
    async fn list_active_branches(&self) -> StoreResult<Vec<Branch>> {
        let state = self.state.read().await;
        let mut branches: Vec<Branch> = state
            .branches
            .iter()
            .filter(|b| b.active)
            .map(|b| b.branch.clone())
            .collect();
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    async fn find_branch(&self, id: DbId) -> StoreResult<Option<Branch>> {
        let state = self.state.read().await;
        Ok(state
            .branches
            .iter()
            .find(|b| b.branch.id == id)
            .map(|b| b.branch.clone()))
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn create_member(&self, input: &CreateMember) -> StoreResult<Member> {
        let mut state = self.state.write().await;
        let code = state.next_member_code()?;
        state.push_member(code, input)
    }

    async fn count_members(&self, predicate: &Predicate) -> StoreResult<u64> {
        let state = self.state.read().await;
        let count = state.members.iter().filter(|m| predicate.matches(*m)).count();
        Ok(count as u64)
    }

    async fn list_members(
        &self,
        predicate: &Predicate,
        page: PageWindow,
    ) -> StoreResult<Vec<Member>> {
        let state = self.state.read().await;
        Ok(window(
            state.members.iter().filter(|m| predicate.matches(*m)),
            page,
        ))
    }

    async fn find_member(&self, id: DbId) -> StoreResult<Option<Member>> {
        let state = self.state.read().await;
        Ok(state.members.iter().find(|m| m.id == id).cloned())
    }

    async fn update_member(&self, id: DbId, patch: &UpdateMember) -> StoreResult<Option<Member>> {
        let mut state = self.state.write().await;
        let home_branch = match patch.home_branch_id {
            Some(branch_id) => Some(state.branch_summary(branch_id)?),
            None => None,
        };
        let Some(member) = state.members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        patch.apply_to(member);
        if let Some(home_branch) = home_branch {
            member.home_branch = home_branch;
        }
        member.updated_at = Utc::now();
        Ok(Some(member.clone()))
    }

    async fn delete_member(&self, id: DbId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.members.len();
        state.members.retain(|m| m.id != id);
        if state.members.len() == before {
            return Ok(false);
        }
        state.service_records.retain(|r| r.record.member_id != id);
        Ok(true)
    }

    async fn member_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        let state = self.state.read().await;
        Ok(state.service_records_where(|r| r.member_id == id, limit))
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn create_employee(
        &self,
        account: &NewAccount,
        input: &CreateEmployee,
    ) -> StoreResult<Employee> {
        let mut state = self.state.write().await;
        let code = state.next_employee_code()?;
        state.push_employee(code, account, input)
    }

    async fn count_employees(&self, predicate: &Predicate) -> StoreResult<u64> {
        let state = self.state.read().await;
        let count = state
            .employees
            .iter()
            .filter(|e| predicate.matches(*e))
            .count();
        Ok(count as u64)
    }

    async fn list_employees(
        &self,
        predicate: &Predicate,
        page: PageWindow,
    ) -> StoreResult<Vec<Employee>> {
        let state = self.state.read().await;
        Ok(window(
            state.employees.iter().filter(|e| predicate.matches(*e)),
            page,
        ))
    }

    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>> {
        let state = self.state.read().await;
        Ok(state.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_employee_by_user(&self, user_id: DbId) -> StoreResult<Option<Employee>> {
        let state = self.state.read().await;
        Ok(state.employees.iter().find(|e| e.user_id == user_id).cloned())
    }

    async fn update_employee(
        &self,
        id: DbId,
        patch: &UpdateEmployee,
        account: &AccountPatch,
    ) -> StoreResult<UpdateOutcome> {
        let mut state = self.state.write().await;
        let Some(current) = state.employees.iter().find(|e| e.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if patch.status.is_some() && current.status.is_terminal() {
            return Ok(UpdateOutcome::AlreadyResigned(current.clone()));
        }
        let user_id = current.user_id;
        if let Some(email) = &account.email {
            if state.email_taken(email, Some(user_id)) {
                return Err(StoreError::DuplicateIdentifier(email.clone()));
            }
        }
        let branch = match patch.branch_id {
            Some(branch_id) => Some(state.branch_summary(branch_id)?),
            None => None,
        };

        let mut summary = None;
        if let Some(stored) = state.accounts.iter_mut().find(|a| a.id == user_id) {
            if let Some(email) = &account.email {
                stored.email = email.clone();
            }
            if let Some(hash) = &account.password_hash {
                stored.password_hash = hash.clone();
            }
            summary = Some(AccountSummary::from(&*stored));
        }

        let Some(employee) = state.employees.iter_mut().find(|e| e.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        patch.apply_to(employee);
        if let Some(branch) = branch {
            employee.branch = branch;
        }
        if let Some(summary) = summary {
            employee.user = summary;
        }
        employee.updated_at = Utc::now();
        Ok(UpdateOutcome::Updated(employee.clone()))
    }

    async fn resign_employee(
        &self,
        id: DbId,
        resignation: &Resignation,
    ) -> StoreResult<ResignOutcome> {
        let mut state = self.state.write().await;
        let Some(employee) = state.employees.iter_mut().find(|e| e.id == id) else {
            return Ok(ResignOutcome::NotFound);
        };
        if employee.status.is_terminal() {
            return Ok(ResignOutcome::AlreadyResigned(employee.clone()));
        }
        employee.status = EmployeeStatus::Resigned;
        employee.resignation_date = Some(resignation.date);
        employee.resignation_reason = Some(resignation.reason.clone());
        employee.user.status = AccountStatus::Inactive;
        employee.updated_at = Utc::now();
        let user_id = employee.user_id;
        let resigned = employee.clone();

        if let Some(account) = state.accounts.iter_mut().find(|a| a.id == user_id) {
            account.status = AccountStatus::Inactive;
        }
        Ok(ResignOutcome::Resigned(resigned))
    }

    async fn employee_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        let state = self.state.read().await;
        Ok(state.service_records_where(|r| r.employee_id == Some(id), limit))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account(&self, id: DbId) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn record_login(&self, id: DbId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        if let Some(account) = state.accounts.iter_mut().find(|a| a.id == id) {
            account.last_login_at = Some(now);
        }
        for employee in state.employees.iter_mut().filter(|e| e.user_id == id) {
            employee.user.last_login_at = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
