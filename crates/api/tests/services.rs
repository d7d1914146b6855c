//! Service tests run directly against the services without HTTP: code
//! collisions, concurrent numbering, credentials and status races.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use backoffice_api::services::employee::{CredentialChange, Credentials, EmployeeService};
use backoffice_api::services::member::MemberService;
use backoffice_core::error::CoreError;
use backoffice_core::filter::{ListFilter, Predicate};
use backoffice_core::models::account::{AccountPatch, NewAccount};
use backoffice_core::models::employee::{CreateEmployee, Employee, Resignation, UpdateEmployee};
use backoffice_core::models::member::{CreateMember, Member, UpdateMember};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::{PageRequest, PageWindow};
use backoffice_core::status::EmployeeStatus;
use backoffice_core::types::DbId;
use backoffice_db::memory::NewBranch;
use backoffice_db::{
    AccountStore, EmployeeStore, MemberStore, MemoryStore, ResignOutcome, StoreError, StoreResult,
    UpdateOutcome,
};
use chrono::Utc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Member store that reports a code collision for the first `failures`
/// creates, then delegates to a real store.
struct CollidingMembers {
    inner: MemoryStore,
    failures: AtomicU32,
    attempts: AtomicU32,
}

impl CollidingMembers {
    fn new(inner: MemoryStore, failures: u32) -> Self {
        Self {
            inner,
            failures: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl MemberStore for CollidingMembers {
    async fn create_member(&self, input: &CreateMember) -> StoreResult<Member> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let collide = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if collide {
            return Err(StoreError::Conflict("M000001".into()));
        }
        self.inner.create_member(input).await
    }

    async fn count_members(&self, predicate: &Predicate) -> StoreResult<u64> {
        self.inner.count_members(predicate).await
    }

    async fn list_members(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> StoreResult<Vec<Member>> {
        self.inner.list_members(predicate, window).await
    }

    async fn find_member(&self, id: DbId) -> StoreResult<Option<Member>> {
        self.inner.find_member(id).await
    }

    async fn update_member(&self, id: DbId, patch: &UpdateMember) -> StoreResult<Option<Member>> {
        self.inner.update_member(id, patch).await
    }

    async fn delete_member(&self, id: DbId) -> StoreResult<bool> {
        self.inner.delete_member(id).await
    }

    async fn member_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        self.inner.member_service_records(id, limit).await
    }
}

/// Employee store that lands a resignation just before every update
/// reaches the real store, as if another request committed in between.
struct ResignsBeforeUpdate {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl EmployeeStore for ResignsBeforeUpdate {
    async fn create_employee(
        &self,
        account: &NewAccount,
        input: &CreateEmployee,
    ) -> StoreResult<Employee> {
        self.inner.create_employee(account, input).await
    }

    async fn count_employees(&self, predicate: &Predicate) -> StoreResult<u64> {
        self.inner.count_employees(predicate).await
    }

    async fn list_employees(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> StoreResult<Vec<Employee>> {
        self.inner.list_employees(predicate, window).await
    }

    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>> {
        self.inner.find_employee(id).await
    }

    async fn find_employee_by_user(&self, user_id: DbId) -> StoreResult<Option<Employee>> {
        self.inner.find_employee_by_user(user_id).await
    }

    async fn update_employee(
        &self,
        id: DbId,
        patch: &UpdateEmployee,
        account: &AccountPatch,
    ) -> StoreResult<UpdateOutcome> {
        let resignation = Resignation {
            date: Utc::now(),
            reason: "left mid-update".into(),
        };
        self.inner.resign_employee(id, &resignation).await?;
        self.inner.update_employee(id, patch, account).await
    }

    async fn resign_employee(
        &self,
        id: DbId,
        resignation: &Resignation,
    ) -> StoreResult<ResignOutcome> {
        self.inner.resign_employee(id, resignation).await
    }

    async fn employee_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        self.inner.employee_service_records(id, limit).await
    }
}

async fn store_with_branch() -> (MemoryStore, DbId) {
    let store = MemoryStore::new();
    let branch = store
        .upsert_branch(&NewBranch {
            name: "Main".into(),
            code: "MAIN".into(),
            address: None,
            phone: None,
            active: true,
        })
        .await;
    (store, branch.id)
}

fn member(name: &str, branch_id: DbId) -> CreateMember {
    CreateMember {
        name: name.to_string(),
        phone: None,
        email: None,
        home_branch_id: branch_id,
        birth_date: None,
        gender: None,
    }
}

fn employee(name: &str, branch_id: DbId) -> CreateEmployee {
    CreateEmployee {
        name: name.to_string(),
        branch_id,
        title: None,
        phone: None,
        hire_date: None,
    }
}

fn credentials(email: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: "s3cret-pass".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Code collisions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collisions_are_retried_with_a_fresh_code() {
    let (store, branch) = store_with_branch().await;
    let colliding = Arc::new(CollidingMembers::new(store, 2));
    let service = MemberService::new(colliding.clone(), None, 3);

    let created = service.create(&member("Wang", branch)).await.unwrap();

    assert_eq!(created.member_number, "M000001");
    assert_eq!(colliding.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_as_conflict() {
    let (store, branch) = store_with_branch().await;
    let colliding = Arc::new(CollidingMembers::new(store, 5));
    let service = MemberService::new(colliding.clone(), None, 3);

    let err = service.create(&member("Wang", branch)).await.unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(colliding.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(
        colliding.inner.count_members(&Predicate::match_all()).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn concurrent_service_creates_yield_distinct_codes() {
    let (store, branch) = store_with_branch().await;
    let service = MemberService::new(Arc::new(store), None, 3);

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.create(&member(&format!("m{i}"), branch)).await })
        })
        .collect();

    let mut codes = Vec::new();
    for task in tasks {
        codes.push(task.await.unwrap().unwrap().member_number);
    }
    codes.sort();
    let expected: Vec<String> = (1..=20).map(|n| format!("M{n:06}")).collect();
    assert_eq!(codes, expected);

    let page = service
        .list(&ListFilter::default(), PageRequest::new(2, 15))
        .await
        .unwrap();
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.data.len(), 5);
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn employee_passwords_are_stored_hashed() {
    let (store, branch) = store_with_branch().await;
    let store = Arc::new(store);
    let service = EmployeeService::new(store.clone(), store.clone(), Some(10), 3);

    let created = service
        .create(&credentials("a@example.com"), &employee("A", branch))
        .await
        .unwrap();

    let account = store.find_account(created.user_id).await.unwrap().unwrap();
    assert!(account.password_hash.starts_with("$argon2id$"));
    assert_ne!(account.password_hash, "s3cret-pass");
}

#[tokio::test]
async fn duplicate_email_is_rejected_before_any_write() {
    let (store, branch) = store_with_branch().await;
    let store = Arc::new(store);
    let service = EmployeeService::new(store.clone(), store.clone(), Some(10), 3);

    service
        .create(&credentials("a@example.com"), &employee("A", branch))
        .await
        .unwrap();
    let err = service
        .create(&credentials("a@example.com"), &employee("B", branch))
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::DuplicateIdentifier(_));

    let next = service
        .create(&credentials("b@example.com"), &employee("B", branch))
        .await
        .unwrap();
    assert_eq!(next.employee_number, "E000002");
}

#[tokio::test]
async fn email_change_checks_other_accounts_only() {
    let (store, branch) = store_with_branch().await;
    let store = Arc::new(store);
    let service = EmployeeService::new(store.clone(), store.clone(), Some(10), 3);

    let a = service
        .create(&credentials("a@example.com"), &employee("A", branch))
        .await
        .unwrap();
    service
        .create(&credentials("b@example.com"), &employee("B", branch))
        .await
        .unwrap();

    let taken = CredentialChange {
        email: Some("b@example.com".into()),
        password: None,
    };
    let err = service
        .update(a.id, &UpdateEmployee::default(), &taken)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::DuplicateIdentifier(_));

    let own = CredentialChange {
        email: Some("a@example.com".into()),
        password: None,
    };
    let updated = service
        .update(a.id, &UpdateEmployee::default(), &own)
        .await
        .unwrap();
    assert_eq!(updated.user.email, "a@example.com");
}

#[tokio::test]
async fn resign_validates_before_touching_the_store() {
    let (store, branch) = store_with_branch().await;
    let store = Arc::new(store);
    let service = EmployeeService::new(store.clone(), store.clone(), Some(10), 3);
    let created = service
        .create(&credentials("a@example.com"), &employee("A", branch))
        .await
        .unwrap();

    let err = service.resign(created.id, " ", None).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    let resigned = service.resign(created.id, "moving", None).await.unwrap();
    assert_eq!(resigned.resignation_reason.as_deref(), Some("moving"));

    let err = service.remove(created.id).await.unwrap_err();
    assert_matches!(err, CoreError::AlreadyResigned(name) if name == "A");
}

#[tokio::test]
async fn status_change_loses_to_a_concurrent_resignation() {
    let (store, branch) = store_with_branch().await;
    let store = Arc::new(store);
    let created = EmployeeService::new(store.clone(), store.clone(), Some(10), 3)
        .create(&credentials("a@example.com"), &employee("A", branch))
        .await
        .unwrap();

    let racing = Arc::new(ResignsBeforeUpdate {
        inner: store.clone(),
    });
    let service = EmployeeService::new(racing, store.clone(), Some(10), 3);
    let patch = UpdateEmployee {
        status: Some(EmployeeStatus::Inactive),
        ..Default::default()
    };

    let err = service
        .update(created.id, &patch, &CredentialChange::default())
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::AlreadyResigned(name) if name == "A");

    let stored = store.find_employee(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EmployeeStatus::Resigned);
    assert_eq!(stored.resignation_reason.as_deref(), Some("left mid-update"));
}
