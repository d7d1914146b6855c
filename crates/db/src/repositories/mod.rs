//! PostgreSQL store.
//!
//! [`PgStore`] implements the store traits with runtime-checked `sqlx`
//! queries, one file per table group. List predicates built by the core
//! are rendered into `WHERE` clauses by [`render_predicate`].

mod account_repo;
mod branch_repo;
mod employee_repo;
mod member_repo;
mod service_record_repo;

use async_trait::async_trait;
use backoffice_core::code::next_code;
use backoffice_core::filter::{escape_like, Clause, Field, Predicate};
use backoffice_core::types::{DbId, EntityKind};
use sqlx::PgConnection;

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use crate::DbPool;

/// Store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}

/// Advisory lock keys serialising code reservation per kind.
fn code_lock_key(kind: EntityKind) -> i64 {
    match kind {
        EntityKind::Member => 0x4d45_4d42, // "MEMB"
        EntityKind::Employee => 0x454d_504c, // "EMPL"
    }
}

/// Highest in-range numeric suffix among `<prefix><digits>` codes of `kind`.
/// Legacy codes such as `EMP001` do not match the pattern.
fn max_code_query(kind: EntityKind) -> String {
    let (table, column) = match kind {
        EntityKind::Member => ("members", "member_number"),
        EntityKind::Employee => ("employees", "employee_number"),
    };
    let prefix = kind.code_prefix();
    format!(
        "SELECT MAX(n)::BIGINT FROM ( \
             SELECT CAST(SUBSTRING({column} FROM 2) AS NUMERIC) AS n \
             FROM {table} WHERE {column} ~ '^{prefix}[0-9]+$' \
         ) codes WHERE n BETWEEN 1 AND 999999"
    )
}

/// Reserve the next code of `kind` on a connection inside a transaction.
///
/// A transaction-scoped advisory lock queues concurrent creators. The next
/// number follows both the highest stored code and the high-water mark in
/// `code_counters`, so a deleted code is never issued again. The mark is
/// bumped in the same transaction and rolls back with a failed insert.
pub(crate) async fn reserve_code(
    conn: &mut PgConnection,
    kind: EntityKind,
) -> StoreResult<String> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(code_lock_key(kind))
        .execute(&mut *conn)
        .await?;

    let stored: Option<i64> = sqlx::query_scalar(&max_code_query(kind))
        .fetch_one(&mut *conn)
        .await?;
    let issued: Option<i64> =
        sqlx::query_scalar("SELECT last_issued FROM code_counters WHERE kind = $1")
            .bind(kind.code_prefix().to_string())
            .fetch_optional(&mut *conn)
            .await?;

    let current = stored
        .into_iter()
        .chain(issued)
        .max()
        .map(u32::try_from)
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("code counter out of range: {e}")))?;
    let code = next_code(kind, current)?;

    sqlx::query(
        "INSERT INTO code_counters (kind, last_issued) VALUES ($1, $2) \
         ON CONFLICT (kind) DO UPDATE SET last_issued = EXCLUDED.last_issued",
    )
    .bind(kind.code_prefix().to_string())
    .bind(i64::from(code.number()))
    .execute(&mut *conn)
    .await?;

    Ok(code.to_string())
}

/// Page windows are `u64`; PostgreSQL `LIMIT`/`OFFSET` take `BIGINT`.
pub(crate) fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Value bound to a rendered predicate placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Text(String),
    Id(DbId),
}

/// A rendered `WHERE` clause (empty when matching everything) and its binds.
#[derive(Debug, Default)]
pub(crate) struct RenderedPredicate {
    pub where_clause: String,
    pub binds: Vec<BindValue>,
}

impl RenderedPredicate {
    /// Index of the next free `$n` placeholder.
    pub fn next_index(&self) -> usize {
        self.binds.len() + 1
    }
}

fn column(kind: EntityKind, field: Field) -> &'static str {
    match (kind, field) {
        (EntityKind::Member, Field::Name) => "m.name",
        (EntityKind::Member, Field::Phone) => "m.phone",
        (EntityKind::Member, Field::Email) => "m.email",
        (EntityKind::Member, Field::Code) => "m.member_number",
        (EntityKind::Member, Field::BranchId) => "m.home_branch_id",
        (EntityKind::Member, Field::Status) => "m.status",
        // Members have no owning account; fall back to their own e-mail.
        (EntityKind::Member, Field::AccountEmail) => "m.email",
        (EntityKind::Employee, Field::Name) => "e.name",
        (EntityKind::Employee, Field::Phone) => "e.phone",
        (EntityKind::Employee, Field::Code) => "e.employee_number",
        (EntityKind::Employee, Field::AccountEmail) => "u.email",
        (EntityKind::Employee, Field::BranchId) => "e.branch_id",
        (EntityKind::Employee, Field::Status) => "e.status",
        (EntityKind::Employee, Field::Email) => "u.email",
    }
}

/// Render `predicate` for the aliased query of `kind` (`m` for members,
/// `e`/`u` for employees and their accounts). Placeholders start at `$1`.
pub(crate) fn render_predicate(kind: EntityKind, predicate: &Predicate) -> RenderedPredicate {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    for clause in predicate.clauses() {
        let bind_idx = binds.len() + 1;
        match clause {
            Clause::AnyContains { fields, needle } => {
                let alternatives: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{} ILIKE ${bind_idx} ESCAPE '\\'", column(kind, *f)))
                    .collect();
                conditions.push(format!("({})", alternatives.join(" OR ")));
                binds.push(BindValue::Text(format!("%{}%", escape_like(needle))));
            }
            Clause::EqualsId { field, value } => {
                conditions.push(format!("{} = ${bind_idx}", column(kind, *field)));
                binds.push(BindValue::Id(*value));
            }
            Clause::EqualsText { field, value } => {
                conditions.push(format!("{} = ${bind_idx}", column(kind, *field)));
                binds.push(BindValue::Text(value.clone()));
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    RenderedPredicate {
        where_clause,
        binds,
    }
}

/// Bind rendered predicate values onto a query, in placeholder order.
macro_rules! bind_all {
    ($query:expr, $binds:expr) => {{
        let mut q = $query;
        for value in $binds {
            q = match value {
                $crate::repositories::BindValue::Text(text) => q.bind(text.clone()),
                $crate::repositories::BindValue::Id(id) => q.bind(*id),
            };
        }
        q
    }};
}
pub(crate) use bind_all;
