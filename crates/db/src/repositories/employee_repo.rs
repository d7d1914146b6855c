//! `employees` table, joined with the owning `users` row.

use async_trait::async_trait;
use backoffice_core::filter::Predicate;
use backoffice_core::models::account::{AccountPatch, NewAccount};
use backoffice_core::models::employee::{CreateEmployee, Employee, Resignation, UpdateEmployee};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::PageWindow;
use backoffice_core::status::{AccountStatus, EmployeeStatus};
use backoffice_core::types::{DbId, EntityKind};

use super::{bind_all, render_predicate, reserve_code, to_i64, PgStore};
use crate::error::{classify, StoreResult};
use crate::models::employee::EmployeeRow;
use crate::store::{EmployeeStore, ResignOutcome, UpdateOutcome};

/// Employee columns plus account and branch projections, for
/// `employees e JOIN users u JOIN branches b`.
const COLUMNS: &str = "e.id, e.user_id, e.employee_number, e.name, e.title, e.phone, \
                       e.branch_id, e.hire_date, e.status, e.resignation_date, \
                       e.resignation_reason, e.created_at, e.updated_at, \
                       u.email AS user_email, u.status AS user_status, \
                       u.last_login_at AS user_last_login_at, \
                       b.name AS branch_name, b.code AS branch_code";

const JOINS: &str = "JOIN users u ON u.id = e.user_id JOIN branches b ON b.id = e.branch_id";

#[async_trait]
impl EmployeeStore for PgStore {
    async fn create_employee(
        &self,
        account: &NewAccount,
        input: &CreateEmployee,
    ) -> StoreResult<Employee> {
        let mut tx = self.pool.begin().await?;

        let code = reserve_code(&mut tx, EntityKind::Employee).await?;

        let user_id: DbId = sqlx::query_scalar(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify(e, &code, Some(&account.email)))?;

        let query = format!(
            "WITH e AS ( \
                INSERT INTO employees (user_id, employee_number, name, branch_id, title, phone, hire_date) \
                VALUES ($1, $2, $3, $4, $5, $6, $7) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM e {JOINS}"
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&query)
            .bind(user_id)
            .bind(&code)
            .bind(&input.name)
            .bind(input.branch_id)
            .bind(input.title.as_deref())
            .bind(input.phone.as_deref())
            .bind(input.hire_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(e, &code, Some(&account.email)))?;

        tx.commit().await?;
        row.try_into()
    }

    async fn count_employees(&self, predicate: &Predicate) -> StoreResult<u64> {
        let rendered = render_predicate(EntityKind::Employee, predicate);
        let query = format!(
            "SELECT COUNT(*) FROM employees e JOIN users u ON u.id = e.user_id {}",
            rendered.where_clause
        );
        let count: i64 = bind_all!(sqlx::query_scalar::<_, i64>(&query), &rendered.binds)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_employees(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> StoreResult<Vec<Employee>> {
        let rendered = render_predicate(EntityKind::Employee, predicate);
        let limit_idx = rendered.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM employees e {JOINS} \
             {where_clause} \
             ORDER BY e.created_at DESC, e.employee_number DESC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            where_clause = rendered.where_clause,
            offset_idx = limit_idx + 1,
        );
        let rows = bind_all!(sqlx::query_as::<_, EmployeeRow>(&query), &rendered.binds)
            .bind(to_i64(window.take))
            .bind(to_i64(window.skip))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>> {
        let query = format!("SELECT {COLUMNS} FROM employees e {JOINS} WHERE e.id = $1");
        sqlx::query_as::<_, EmployeeRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Employee::try_from)
            .transpose()
    }

    async fn find_employee_by_user(&self, user_id: DbId) -> StoreResult<Option<Employee>> {
        let query = format!("SELECT {COLUMNS} FROM employees e {JOINS} WHERE e.user_id = $1");
        sqlx::query_as::<_, EmployeeRow>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Employee::try_from)
            .transpose()
    }

    async fn update_employee(
        &self,
        id: DbId,
        patch: &UpdateEmployee,
        account: &AccountPatch,
    ) -> StoreResult<UpdateOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock: a resignation committing now waits for this transaction.
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM employees WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(status) = status else {
            return Ok(UpdateOutcome::NotFound);
        };
        if patch.status.is_some() && status == EmployeeStatus::Resigned.as_str() {
            drop(tx);
            return Ok(match self.find_employee(id).await? {
                Some(existing) => UpdateOutcome::AlreadyResigned(existing),
                None => UpdateOutcome::NotFound,
            });
        }

        if !account.is_empty() {
            sqlx::query(
                "UPDATE users SET \
                    email = COALESCE($2, email), \
                    password_hash = COALESCE($3, password_hash) \
                 WHERE id = (SELECT user_id FROM employees WHERE id = $1)",
            )
            .bind(id)
            .bind(account.email.as_deref())
            .bind(account.password_hash.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, "", account.email.as_deref()))?;
        }

        let query = format!(
            "WITH e AS ( \
                UPDATE employees SET \
                    name = COALESCE($2, name), \
                    branch_id = COALESCE($3, branch_id), \
                    title = COALESCE($4, title), \
                    phone = COALESCE($5, phone), \
                    hire_date = COALESCE($6, hire_date), \
                    status = COALESCE($7, status) \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM e {JOINS}"
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&query)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.branch_id)
            .bind(patch.title.as_deref())
            .bind(patch.phone.as_deref())
            .bind(patch.hire_date)
            .bind(patch.status.map(|s| s.as_str()))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| classify(e, "", None))?;

        let Some(row) = row else {
            return Ok(UpdateOutcome::NotFound);
        };
        tx.commit().await?;
        Ok(UpdateOutcome::Updated(row.try_into()?))
    }

    /// Resigning also deactivates the login account.
    async fn resign_employee(
        &self,
        id: DbId,
        resignation: &Resignation,
    ) -> StoreResult<ResignOutcome> {
        let mut tx = self.pool.begin().await?;
        let user_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE employees SET \
                status = $2, \
                resignation_date = $3, \
                resignation_reason = $4 \
             WHERE id = $1 AND status <> $2 \
             RETURNING user_id",
        )
        .bind(id)
        .bind(EmployeeStatus::Resigned.as_str())
        .bind(resignation.date)
        .bind(&resignation.reason)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            drop(tx);
            return Ok(match self.find_employee(id).await? {
                Some(existing) => ResignOutcome::AlreadyResigned(existing),
                None => ResignOutcome::NotFound,
            });
        };

        sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(user_id)
            .bind(AccountStatus::Inactive.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        match self.find_employee(id).await? {
            Some(employee) => Ok(ResignOutcome::Resigned(employee)),
            None => Ok(ResignOutcome::NotFound),
        }
    }

    async fn employee_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        self.service_records_for("s.employee_id", id, limit).await
    }
}
