//! Member use cases: numbering, listing, history and hard delete.

use std::sync::Arc;

use backoffice_core::error::{CoreError, CoreResult};
use backoffice_core::filter::{self, ListFilter};
use backoffice_core::models::member::{CreateMember, Member, MemberDetail, UpdateMember};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::{paginate, PageRequest, PageResult};
use backoffice_core::types::{DbId, EntityKind};
use backoffice_db::{MemberStore, StoreError};

#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn MemberStore>,
    history_limit: Option<u32>,
    retry_attempts: u32,
}

impl MemberService {
    pub fn new(
        store: Arc<dyn MemberStore>,
        history_limit: Option<u32>,
        retry_attempts: u32,
    ) -> Self {
        Self {
            store,
            history_limit,
            retry_attempts: retry_attempts.max(1),
        }
    }

    /// Create a member with the next `M` code.
    ///
    /// A code taken concurrently is retried with a fresh code until the
    /// configured attempts run out, then surfaces as `Conflict`.
    pub async fn create(&self, input: &CreateMember) -> CoreResult<Member> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.create_member(input).await {
                Ok(member) => {
                    tracing::info!(
                        member_id = %member.id,
                        member_number = %member.member_number,
                        "Member created"
                    );
                    return Ok(member);
                }
                Err(StoreError::Conflict(code)) if attempt < self.retry_attempts => {
                    tracing::warn!(attempt, code = %code, "Member code collision, retrying");
                }
                Err(StoreError::Conflict(code)) => {
                    return Err(CoreError::Conflict(format!(
                        "Could not reserve a member code after {attempt} attempts (last tried {code})"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One page of members matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &ListFilter,
        request: PageRequest,
    ) -> CoreResult<PageResult<Member>> {
        let predicate = filter::build(EntityKind::Member, filter);
        let total = self.store.count_members(&predicate).await?;
        let page = paginate(request, total);
        let data = self.store.list_members(&predicate, page.window).await?;
        Ok(PageResult {
            data,
            pagination: page.meta,
        })
    }

    /// A member with its service history, capped by the configured limit.
    pub async fn get(&self, id: DbId) -> CoreResult<MemberDetail> {
        let member = self.find(id).await?;
        let service_records = self
            .store
            .member_service_records(id, self.history_limit)
            .await?;
        Ok(MemberDetail {
            member,
            service_records,
        })
    }

    pub async fn update(&self, id: DbId, patch: &UpdateMember) -> CoreResult<Member> {
        let member = self
            .store
            .update_member(id, patch)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Member",
                id,
            })?;
        tracing::info!(member_id = %id, "Member updated");
        Ok(member)
    }

    /// Hard delete. Returns the removed member's number for the response message.
    pub async fn remove(&self, id: DbId) -> CoreResult<String> {
        let member = self.find(id).await?;
        if !self.store.delete_member(id).await? {
            return Err(CoreError::NotFound {
                entity: "Member",
                id,
            });
        }
        tracing::info!(member_id = %id, member_number = %member.member_number, "Member deleted");
        Ok(member.member_number)
    }

    /// Full service history of a member, newest first.
    pub async fn service_records(&self, id: DbId) -> CoreResult<Vec<ServiceRecord>> {
        self.find(id).await?;
        Ok(self.store.member_service_records(id, None).await?)
    }

    async fn find(&self, id: DbId) -> CoreResult<Member> {
        self.store
            .find_member(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Member",
                id,
            })
    }
}
