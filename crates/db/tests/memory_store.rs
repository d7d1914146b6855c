//! Behaviour of the in-memory store: code reservation, listing, partial
//! updates, conditional resignation and demo seeding.

use std::sync::Arc;

use assert_matches::assert_matches;
use backoffice_core::filter::{build, ListFilter, Predicate};
use backoffice_core::models::account::{AccountPatch, NewAccount};
use backoffice_core::models::employee::{CreateEmployee, Resignation, UpdateEmployee};
use backoffice_core::models::member::{CreateMember, UpdateMember};
use backoffice_core::pagination::{paginate, PageRequest, PageWindow};
use backoffice_core::status::{AccountStatus, EmployeeStatus};
use backoffice_core::types::{DbId, EntityKind};
use backoffice_db::memory::{NewBranch, NewServiceRecord};
use backoffice_db::seed;
use backoffice_db::store::{
    AccountStore, BranchStore, EmployeeStore, MemberStore, ResignOutcome, UpdateOutcome,
};
use backoffice_db::{MemoryStore, StoreError};
use chrono::{Duration, TimeZone, Utc};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn branch(store: &MemoryStore, code: &str, active: bool) -> DbId {
    store
        .upsert_branch(&NewBranch {
            name: format!("Branch {code}"),
            code: code.to_string(),
            address: None,
            phone: None,
            active,
        })
        .await
        .id
}

fn new_member(name: &str, branch_id: DbId) -> CreateMember {
    CreateMember {
        name: name.to_string(),
        phone: Some("0911000000".to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        home_branch_id: branch_id,
        birth_date: None,
        gender: None,
    }
}

fn new_employee(name: &str, branch_id: DbId) -> CreateEmployee {
    CreateEmployee {
        name: name.to_string(),
        branch_id,
        title: None,
        phone: None,
        hire_date: None,
    }
}

fn account(email: &str) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password_hash: "hash".to_string(),
    }
}

const ALL: PageWindow = PageWindow { skip: 0, take: 100 };

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sequential_member_codes_have_no_gaps() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;

    let mut codes = Vec::new();
    for i in 0..5 {
        let member = store.create_member(&new_member(&format!("m{i}"), b)).await.unwrap();
        codes.push(member.member_number);
    }
    assert_eq!(
        codes,
        ["M000001", "M000002", "M000003", "M000004", "M000005"]
    );
}

#[tokio::test]
async fn legacy_employee_codes_are_skipped() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    store
        .import_employee("EMP001", &account("legacy@example.com"), &new_employee("legacy", b))
        .await
        .unwrap();

    let created = store
        .create_employee(&account("new@example.com"), &new_employee("new", b))
        .await
        .unwrap();
    assert_eq!(created.employee_number, "E000001");
}

#[tokio::test]
async fn codes_continue_after_deletion() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let first = store.create_member(&new_member("a", b)).await.unwrap();
    let second = store.create_member(&new_member("b", b)).await.unwrap();
    assert!(store.delete_member(first.id).await.unwrap());

    let third = store.create_member(&new_member("c", b)).await.unwrap();
    assert_eq!(second.member_number, "M000002");
    assert_eq!(third.member_number, "M000003");
}

#[tokio::test]
async fn deleting_the_newest_member_does_not_free_its_code() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    store.create_member(&new_member("a", b)).await.unwrap();
    let newest = store.create_member(&new_member("b", b)).await.unwrap();
    assert!(store.delete_member(newest.id).await.unwrap());

    let next = store.create_member(&new_member("c", b)).await.unwrap();
    assert_eq!(next.member_number, "M000003");
}

#[tokio::test]
async fn concurrent_creates_never_share_a_code() {
    let store = Arc::new(MemoryStore::new());
    let b = branch(&store, "B1", true).await;

    let tasks: Vec<_> = (0..25)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create_member(&new_member(&format!("c{i}"), b)).await })
        })
        .collect();

    let mut codes = Vec::new();
    for task in tasks {
        codes.push(task.await.unwrap().unwrap().member_number);
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 25);
    assert_eq!(codes.last().map(String::as_str), Some("M000025"));
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_newest_first_and_windowed() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    for i in 0..23 {
        store.create_member(&new_member(&format!("m{i}"), b)).await.unwrap();
    }

    let all = Predicate::match_all();
    let total = store.count_members(&all).await.unwrap();
    let page = paginate(PageRequest::new(3, 10), total);
    let rows = store.list_members(&all, page.window).await.unwrap();

    assert_eq!(total, 23);
    assert_eq!(page.meta.total_pages, 3);
    let codes: Vec<_> = rows.iter().map(|m| m.member_number.as_str()).collect();
    assert_eq!(codes, ["M000003", "M000002", "M000001"]);
}

#[tokio::test]
async fn search_and_branch_filter_combine() {
    let store = MemoryStore::new();
    let b1 = branch(&store, "B1", true).await;
    let b2 = branch(&store, "B2", true).await;
    store.create_member(&new_member("Wang", b1)).await.unwrap();
    store.create_member(&new_member("Wang", b2)).await.unwrap();
    store.create_member(&new_member("Lee", b1)).await.unwrap();

    let filter = ListFilter {
        search: Some("wang".into()),
        branch_id: Some(b1),
        status: None,
    };
    let predicate = build(EntityKind::Member, &filter);
    let rows = store.list_members(&predicate, ALL).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].home_branch_id, b1);
    assert_eq!(store.count_members(&predicate).await.unwrap(), 1);
}

#[tokio::test]
async fn employee_search_matches_account_email_and_status() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let alice = store
        .create_employee(&account("alice@shop.test"), &new_employee("Alice", b))
        .await
        .unwrap();
    store
        .create_employee(&account("bob@shop.test"), &new_employee("Bob", b))
        .await
        .unwrap();
    store
        .resign_employee(
            alice.id,
            &Resignation {
                date: Utc::now(),
                reason: "moving".into(),
            },
        )
        .await
        .unwrap();

    let by_email = build(
        EntityKind::Employee,
        &ListFilter {
            search: Some("ALICE@SHOP".into()),
            ..Default::default()
        },
    );
    assert_eq!(store.count_employees(&by_email).await.unwrap(), 1);

    let active = build(
        EntityKind::Employee,
        &ListFilter {
            status: Some("active".into()),
            ..Default::default()
        },
    );
    let rows = store.list_employees(&active, ALL).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Bob");
}

#[tokio::test]
async fn inactive_branches_are_not_listed() {
    let store = MemoryStore::new();
    branch(&store, "ZZ", true).await;
    branch(&store, "AA", true).await;
    branch(&store, "OLD", false).await;

    let names: Vec<_> = store
        .list_active_branches()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, ["Branch AA", "Branch ZZ"]);
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_member_update_touches_only_given_fields() {
    let store = MemoryStore::new();
    let b1 = branch(&store, "B1", true).await;
    let b2 = branch(&store, "B2", true).await;
    let member = store.create_member(&new_member("Wang", b1)).await.unwrap();

    let patch = UpdateMember {
        home_branch_id: Some(b2),
        ..Default::default()
    };
    let updated = store.update_member(member.id, &patch).await.unwrap().unwrap();

    assert_eq!(updated.home_branch_id, b2);
    assert_eq!(updated.home_branch.code, "B2");
    assert_eq!(updated.name, member.name);
    assert_eq!(updated.phone, member.phone);
    assert_eq!(updated.email, member.email);
    assert_eq!(updated.member_number, member.member_number);
}

#[tokio::test]
async fn update_to_unknown_branch_is_rejected() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let member = store.create_member(&new_member("Wang", b)).await.unwrap();

    let patch = UpdateMember {
        home_branch_id: Some(uuid::Uuid::new_v4()),
        ..Default::default()
    };
    assert_matches!(
        store.update_member(member.id, &patch).await,
        Err(StoreError::MissingReference { entity: "Branch", .. })
    );
}

#[tokio::test]
async fn duplicate_account_email_is_rejected() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    store
        .create_employee(&account("dup@example.com"), &new_employee("a", b))
        .await
        .unwrap();
    let other = store
        .create_employee(&account("other@example.com"), &new_employee("b", b))
        .await
        .unwrap();

    assert_matches!(
        store
            .create_employee(&account("dup@example.com"), &new_employee("c", b))
            .await,
        Err(StoreError::DuplicateIdentifier(email)) if email == "dup@example.com"
    );

    let patch = AccountPatch {
        email: Some("dup@example.com".into()),
        password_hash: None,
    };
    assert_matches!(
        store
            .update_employee(other.id, &UpdateEmployee::default(), &patch)
            .await,
        Err(StoreError::DuplicateIdentifier(_))
    );

    // Keeping one's own e-mail is not a collision.
    let own = AccountPatch {
        email: Some("other@example.com".into()),
        password_hash: Some("new-hash".into()),
    };
    let UpdateOutcome::Updated(updated) = store
        .update_employee(other.id, &UpdateEmployee::default(), &own)
        .await
        .unwrap()
    else {
        panic!("own e-mail should be accepted");
    };
    assert_eq!(updated.user.email, "other@example.com");
    let stored = store.find_account(updated.user_id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "new-hash");
}

// ---------------------------------------------------------------------------
// Resignation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_resignation_keeps_first_metadata() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let employee = store
        .create_employee(&account("e@example.com"), &new_employee("e", b))
        .await
        .unwrap();

    let first_date = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let first = Resignation {
        date: first_date,
        reason: "moving abroad".into(),
    };
    let ResignOutcome::Resigned(resigned) = store.resign_employee(employee.id, &first).await.unwrap()
    else {
        panic!("first resignation should succeed");
    };
    assert_eq!(resigned.status, EmployeeStatus::Resigned);

    let second = Resignation {
        date: Utc::now(),
        reason: "again".into(),
    };
    let ResignOutcome::AlreadyResigned(existing) =
        store.resign_employee(employee.id, &second).await.unwrap()
    else {
        panic!("second resignation should be refused");
    };
    assert_eq!(existing.resignation_reason.as_deref(), Some("moving abroad"));
    assert_eq!(existing.resignation_date, Some(first_date));

    assert_matches!(
        store.resign_employee(uuid::Uuid::new_v4(), &second).await.unwrap(),
        ResignOutcome::NotFound
    );
}

#[tokio::test]
async fn resigned_employee_keeps_its_status_through_updates() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let employee = store
        .create_employee(&account("e@example.com"), &new_employee("e", b))
        .await
        .unwrap();
    let resignation = Resignation {
        date: Utc::now(),
        reason: "retiring".into(),
    };
    store.resign_employee(employee.id, &resignation).await.unwrap();

    let reactivate = UpdateEmployee {
        status: Some(EmployeeStatus::Active),
        title: Some("Manager".into()),
        ..Default::default()
    };
    let UpdateOutcome::AlreadyResigned(existing) = store
        .update_employee(employee.id, &reactivate, &AccountPatch::default())
        .await
        .unwrap()
    else {
        panic!("status change on a resigned employee should be refused");
    };
    assert_eq!(existing.status, EmployeeStatus::Resigned);
    assert_eq!(existing.title, None);

    // Non-status edits are still allowed.
    let retitle = UpdateEmployee {
        title: Some("Former stylist".into()),
        ..Default::default()
    };
    assert_matches!(
        store
            .update_employee(employee.id, &retitle, &AccountPatch::default())
            .await
            .unwrap(),
        UpdateOutcome::Updated(e) if e.status == EmployeeStatus::Resigned
            && e.resignation_reason.as_deref() == Some("retiring")
    );

    assert_matches!(
        store
            .update_employee(uuid::Uuid::new_v4(), &reactivate, &AccountPatch::default())
            .await
            .unwrap(),
        UpdateOutcome::NotFound
    );
}

#[tokio::test]
async fn resignation_deactivates_the_login_account() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let employee = store
        .create_employee(&account("e@example.com"), &new_employee("e", b))
        .await
        .unwrap();
    let resignation = Resignation {
        date: Utc::now(),
        reason: "moving".into(),
    };

    let ResignOutcome::Resigned(resigned) =
        store.resign_employee(employee.id, &resignation).await.unwrap()
    else {
        panic!("resignation should succeed");
    };
    assert_eq!(resigned.user.status, AccountStatus::Inactive);
    let stored = store.find_account(employee.user_id).await.unwrap().unwrap();
    assert_eq!(stored.status, AccountStatus::Inactive);
}

// ---------------------------------------------------------------------------
// Service records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn service_history_is_newest_first_and_capped() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let member = store.create_member(&new_member("Wang", b)).await.unwrap();
    let employee = store
        .create_employee(&account("e@example.com"), &new_employee("Stylist", b))
        .await
        .unwrap();

    let base = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
    for day in [3, 1, 2] {
        store
            .add_service_record(NewServiceRecord {
                member_id: member.id,
                employee_id: Some(employee.id),
                branch_id: b,
                service_date: base + Duration::days(day),
                service_type: format!("visit {day}"),
                notes: None,
            })
            .await
            .unwrap();
    }

    let all = store.member_service_records(member.id, None).await.unwrap();
    let types: Vec<_> = all.iter().map(|r| r.service_type.as_str()).collect();
    assert_eq!(types, ["visit 3", "visit 2", "visit 1"]);
    assert_eq!(all[0].employee.as_ref().map(|e| e.name.as_str()), Some("Stylist"));

    let capped = store.employee_service_records(employee.id, Some(2)).await.unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0].member.member_number, "M000001");
}

#[tokio::test]
async fn deleting_a_member_cascades_its_history() {
    let store = MemoryStore::new();
    let b = branch(&store, "B1", true).await;
    let member = store.create_member(&new_member("Wang", b)).await.unwrap();
    store
        .add_service_record(NewServiceRecord {
            member_id: member.id,
            employee_id: None,
            branch_id: b,
            service_date: Utc::now(),
            service_type: "haircut".into(),
            notes: Some("short".into()),
        })
        .await
        .unwrap();

    assert!(store.delete_member(member.id).await.unwrap());
    assert!(!store.delete_member(member.id).await.unwrap());
    assert!(store.find_member(member.id).await.unwrap().is_none());
    assert!(store
        .member_service_records(member.id, None)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seeding_twice_changes_nothing() {
    let store = MemoryStore::new();
    seed::seed_memory(&store, "hash").await.unwrap();
    seed::seed_memory(&store, "hash").await.unwrap();

    let all = Predicate::match_all();
    assert_eq!(store.list_active_branches().await.unwrap().len(), 3);
    assert_eq!(store.count_members(&all).await.unwrap(), 5);
    assert_eq!(store.count_employees(&all).await.unwrap(), 1);

    let manager = store
        .find_account_by_email(seed::MANAGER_EMAIL)
        .await
        .unwrap()
        .unwrap();
    let employee = store.find_employee_by_user(manager.id).await.unwrap().unwrap();
    assert_eq!(employee.employee_number, seed::MANAGER_EMPLOYEE_NUMBER);

    // The next member continues after the seeded codes.
    let next = store
        .create_member(&new_member("New", employee.branch_id))
        .await
        .unwrap();
    assert_eq!(next.member_number, "M000006");
}
