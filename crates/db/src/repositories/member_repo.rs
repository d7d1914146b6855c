//! `members` table.

use async_trait::async_trait;
use backoffice_core::filter::Predicate;
use backoffice_core::models::member::{CreateMember, Member, UpdateMember};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::PageWindow;
use backoffice_core::types::{DbId, EntityKind};

use super::{bind_all, render_predicate, reserve_code, to_i64, PgStore};
use crate::error::{classify, StoreResult};
use crate::models::member::MemberRow;
use crate::store::MemberStore;

/// Member columns plus the joined home branch, for `members m JOIN branches b`.
const COLUMNS: &str = "m.id, m.member_number, m.name, m.phone, m.email, m.home_branch_id, \
                       m.birth_date, m.gender, m.status, m.created_at, m.updated_at, \
                       b.name AS branch_name, b.code AS branch_code";

#[async_trait]
impl MemberStore for PgStore {
    async fn create_member(&self, input: &CreateMember) -> StoreResult<Member> {
        let mut tx = self.pool.begin().await?;

        let code = reserve_code(&mut tx, EntityKind::Member).await?;

        let query = format!(
            "WITH inserted AS ( \
                INSERT INTO members (member_number, name, phone, email, home_branch_id, birth_date, gender) \
                VALUES ($1, $2, $3, $4, $5, $6, $7) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM inserted m JOIN branches b ON b.id = m.home_branch_id"
        );
        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(&code)
            .bind(&input.name)
            .bind(input.phone.as_deref())
            .bind(input.email.as_deref())
            .bind(input.home_branch_id)
            .bind(input.birth_date)
            .bind(input.gender.map(|g| g.as_str()))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(e, &code, None))?;

        tx.commit().await?;
        row.try_into()
    }

    async fn count_members(&self, predicate: &Predicate) -> StoreResult<u64> {
        let rendered = render_predicate(EntityKind::Member, predicate);
        let query = format!(
            "SELECT COUNT(*) FROM members m {}",
            rendered.where_clause
        );
        let count: i64 = bind_all!(sqlx::query_scalar::<_, i64>(&query), &rendered.binds)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_members(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> StoreResult<Vec<Member>> {
        let rendered = render_predicate(EntityKind::Member, predicate);
        let limit_idx = rendered.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM members m \
             JOIN branches b ON b.id = m.home_branch_id \
             {where_clause} \
             ORDER BY m.created_at DESC, m.member_number DESC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            where_clause = rendered.where_clause,
            offset_idx = limit_idx + 1,
        );
        let rows = bind_all!(sqlx::query_as::<_, MemberRow>(&query), &rendered.binds)
            .bind(to_i64(window.take))
            .bind(to_i64(window.skip))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Member::try_from).collect()
    }

    async fn find_member(&self, id: DbId) -> StoreResult<Option<Member>> {
        let query = format!(
            "SELECT {COLUMNS} FROM members m \
             JOIN branches b ON b.id = m.home_branch_id \
             WHERE m.id = $1"
        );
        sqlx::query_as::<_, MemberRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Member::try_from)
            .transpose()
    }

    async fn update_member(&self, id: DbId, patch: &UpdateMember) -> StoreResult<Option<Member>> {
        let query = format!(
            "WITH updated AS ( \
                UPDATE members SET \
                    name = COALESCE($2, name), \
                    phone = COALESCE($3, phone), \
                    email = COALESCE($4, email), \
                    home_branch_id = COALESCE($5, home_branch_id), \
                    birth_date = COALESCE($6, birth_date), \
                    gender = COALESCE($7, gender), \
                    status = COALESCE($8, status) \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM updated m JOIN branches b ON b.id = m.home_branch_id"
        );
        sqlx::query_as::<_, MemberRow>(&query)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.phone.as_deref())
            .bind(patch.email.as_deref())
            .bind(patch.home_branch_id)
            .bind(patch.birth_date)
            .bind(patch.gender.map(|g| g.as_str()))
            .bind(patch.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "", None))?
            .map(Member::try_from)
            .transpose()
    }

    async fn delete_member(&self, id: DbId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn member_service_records(
        &self,
        id: DbId,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ServiceRecord>> {
        self.service_records_for("s.member_id", id, limit).await
    }
}
