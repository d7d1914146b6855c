//! Idempotent demo data: three branches, a manager account and employee,
//! and five members `M000001`..`M000005`.
//!
//! Every insert upserts on a natural unique key (branch code, account
//! e-mail, member number), so seeding twice changes nothing.

use backoffice_core::models::account::NewAccount;
use backoffice_core::models::employee::CreateEmployee;
use backoffice_core::models::member::CreateMember;
use backoffice_core::status::Gender;
use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::memory::{MemoryStore, NewBranch};
use crate::DbPool;

/// Login e-mail of the seeded manager.
pub const MANAGER_EMAIL: &str = "manager@example.com";

/// Plaintext password of the seeded manager. Callers hash it before seeding.
pub const MANAGER_PASSWORD: &str = "password123";

/// The manager keeps the legacy code format; code generation skips it.
pub const MANAGER_EMPLOYEE_NUMBER: &str = "EMP001";

struct DemoBranch {
    code: &'static str,
    name: &'static str,
    address: &'static str,
}

const BRANCHES: [DemoBranch; 3] = [
    DemoBranch {
        code: "TP-XINYI",
        name: "台北信義店",
        address: "台北市信義區信義路五段7號",
    },
    DemoBranch {
        code: "HC-GUANGFU",
        name: "新竹光復店",
        address: "新竹市光復路一段100號",
    },
    DemoBranch {
        code: "TC-ZHONGGANG",
        name: "台中中港店",
        address: "台中市西屯區中港路二段200號",
    },
];

struct DemoMember {
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    /// Index into [`BRANCHES`].
    branch: usize,
    gender: Gender,
    birth_date: Option<(i32, u32, u32)>,
}

const MEMBERS: [DemoMember; 5] = [
    DemoMember {
        name: "王小明",
        phone: "0912345678",
        email: "wang@example.com",
        branch: 0,
        gender: Gender::Male,
        birth_date: Some((1985, 5, 15)),
    },
    DemoMember {
        name: "李小華",
        phone: "0923456789",
        email: "lee@example.com",
        branch: 0,
        gender: Gender::Female,
        birth_date: Some((1990, 8, 20)),
    },
    DemoMember {
        name: "張大偉",
        phone: "0934567890",
        email: "chang@example.com",
        branch: 1,
        gender: Gender::Male,
        birth_date: Some((1988, 3, 10)),
    },
    DemoMember {
        name: "陳美麗",
        phone: "0945678901",
        email: "chen@example.com",
        branch: 2,
        gender: Gender::Female,
        birth_date: Some((1992, 12, 5)),
    },
    DemoMember {
        name: "林志明",
        phone: "0956789012",
        email: "lin@example.com",
        branch: 0,
        gender: Gender::Male,
        birth_date: None,
    },
];

fn member_number(index: usize) -> String {
    format!("M{:06}", index + 1)
}

fn birth_date(member: &DemoMember) -> Option<NaiveDate> {
    member
        .birth_date
        .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

/// Seed a PostgreSQL database. `password_hash` is the manager's hashed password.
pub async fn seed_postgres(pool: &DbPool, password_hash: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut branch_ids = Vec::with_capacity(BRANCHES.len());

    for branch in &BRANCHES {
        let id: uuid::Uuid = sqlx::query_scalar(
            "WITH ins AS ( \
                INSERT INTO branches (name, code, address) VALUES ($1, $2, $3) \
                ON CONFLICT ON CONSTRAINT uq_branches_code DO NOTHING \
                RETURNING id \
             ) \
             SELECT id FROM ins UNION ALL SELECT id FROM branches WHERE code = $2 LIMIT 1",
        )
        .bind(branch.name)
        .bind(branch.code)
        .bind(branch.address)
        .fetch_one(&mut *tx)
        .await?;
        branch_ids.push(id);
    }

    let user_id: uuid::Uuid = sqlx::query_scalar(
        "WITH ins AS ( \
            INSERT INTO users (email, password_hash) VALUES ($1, $2) \
            ON CONFLICT ON CONSTRAINT uq_users_email DO NOTHING \
            RETURNING id \
         ) \
         SELECT id FROM ins UNION ALL SELECT id FROM users WHERE email = $1 LIMIT 1",
    )
    .bind(MANAGER_EMAIL)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO employees (user_id, branch_id, employee_number, name, title) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT ON CONSTRAINT uq_employees_user_id DO NOTHING",
    )
    .bind(user_id)
    .bind(branch_ids[0])
    .bind(MANAGER_EMPLOYEE_NUMBER)
    .bind("王經理")
    .bind("店經理")
    .execute(&mut *tx)
    .await?;

    for (index, member) in MEMBERS.iter().enumerate() {
        sqlx::query(
            "INSERT INTO members (member_number, name, phone, email, home_branch_id, gender, birth_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT uq_members_member_number DO NOTHING",
        )
        .bind(member_number(index))
        .bind(member.name)
        .bind(member.phone)
        .bind(member.email)
        .bind(branch_ids[member.branch])
        .bind(member.gender.as_str())
        .bind(birth_date(member))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        branches = BRANCHES.len(),
        members = MEMBERS.len(),
        "Demo data seeded"
    );
    Ok(())
}

/// Seed an in-memory store with the same data as [`seed_postgres`].
pub async fn seed_memory(store: &MemoryStore, password_hash: &str) -> StoreResult<()> {
    let mut branch_ids = Vec::with_capacity(BRANCHES.len());
    for branch in &BRANCHES {
        let stored = store
            .upsert_branch(&NewBranch {
                name: branch.name.to_string(),
                code: branch.code.to_string(),
                address: Some(branch.address.to_string()),
                phone: None,
                active: true,
            })
            .await;
        branch_ids.push(stored.id);
    }

    store
        .import_employee(
            MANAGER_EMPLOYEE_NUMBER,
            &NewAccount {
                email: MANAGER_EMAIL.to_string(),
                password_hash: password_hash.to_string(),
            },
            &CreateEmployee {
                name: "王經理".to_string(),
                branch_id: branch_ids[0],
                title: Some("店經理".to_string()),
                phone: None,
                hire_date: None,
            },
        )
        .await?;

    for (index, member) in MEMBERS.iter().enumerate() {
        store
            .import_member(
                &member_number(index),
                &CreateMember {
                    name: member.name.to_string(),
                    phone: Some(member.phone.to_string()),
                    email: Some(member.email.to_string()),
                    home_branch_id: branch_ids[member.branch],
                    birth_date: birth_date(member),
                    gender: Some(member.gender),
                },
            )
            .await?;
    }

    tracing::info!(
        branches = BRANCHES.len(),
        members = MEMBERS.len(),
        "Demo data seeded (in-memory)"
    );
    Ok(())
}
