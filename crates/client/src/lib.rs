//! Typed client for the back office HTTP API.
//!
//! Every call takes the caller's [`Session`] explicitly. A successful
//! [`ApiClient::login`] authenticates it; any `401` response clears it.
//!
//! ```ignore
//! let client = ApiClient::new("http://localhost:3000");
//! let mut session = Session::new();
//! client.login(&mut session, "manager@example.com", "password123").await?;
//! let members = client.list_members(&mut session, &ListParams::default()).await?;
//! ```

mod error;
mod session;
mod types;

pub use error::{ClientError, Result};
pub use session::Session;
pub use types::{
    EmployeeChanges, ListParams, MemberChanges, Message, MessageWith, NewEmployee, NewMember,
    Profile,
};

use backoffice_core::models::branch::Branch;
use backoffice_core::models::employee::{Employee, EmployeeDetail};
use backoffice_core::models::member::{Member, MemberDetail};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::PageResult;
use backoffice_core::types::{DbId, Timestamp};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::types::{ErrorBody, LoginRequest, LoginResponse, ResignBody};

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    // ---- Auth ---------------------------------------------------------

    /// Exchange credentials for a token and store it in `session`.
    pub async fn login(&self, session: &mut Session, email: &str, password: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let login: LoginResponse = self.send(session, request).await?;
        session.authenticate(login.access_token, login.expires_in);
        debug!(email, "Logged in");
        Ok(())
    }

    /// Tokens are stateless, so logging out only forgets the token.
    pub fn logout(&self, session: &mut Session) {
        session.clear();
    }

    pub async fn profile(&self, session: &mut Session) -> Result<Profile> {
        self.get(session, "/auth/profile", &[]).await
    }

    pub async fn branches(&self, session: &mut Session) -> Result<Vec<Branch>> {
        self.get(session, "/branches", &[]).await
    }

    // ---- Members ------------------------------------------------------

    pub async fn list_members(
        &self,
        session: &mut Session,
        params: &ListParams,
    ) -> Result<PageResult<Member>> {
        self.get(session, "/members", &params.query()).await
    }

    pub async fn get_member(&self, session: &mut Session, id: DbId) -> Result<MemberDetail> {
        self.get(session, &format!("/members/{id}"), &[]).await
    }

    pub async fn create_member(&self, session: &mut Session, input: &NewMember) -> Result<Member> {
        self.send_json(session, Method::POST, "/members", input).await
    }

    pub async fn update_member(
        &self,
        session: &mut Session,
        id: DbId,
        changes: &MemberChanges,
    ) -> Result<Member> {
        self.send_json(session, Method::PATCH, &format!("/members/{id}"), changes)
            .await
    }

    pub async fn delete_member(&self, session: &mut Session, id: DbId) -> Result<Message> {
        self.delete(session, &format!("/members/{id}")).await
    }

    pub async fn member_services(
        &self,
        session: &mut Session,
        id: DbId,
    ) -> Result<Vec<ServiceRecord>> {
        self.get(session, &format!("/members/{id}/services"), &[]).await
    }

    // ---- Employees ----------------------------------------------------

    pub async fn list_employees(
        &self,
        session: &mut Session,
        params: &ListParams,
    ) -> Result<PageResult<Employee>> {
        self.get(session, "/employees", &params.query()).await
    }

    pub async fn get_employee(&self, session: &mut Session, id: DbId) -> Result<EmployeeDetail> {
        self.get(session, &format!("/employees/{id}"), &[]).await
    }

    pub async fn create_employee(
        &self,
        session: &mut Session,
        input: &NewEmployee,
    ) -> Result<Employee> {
        self.send_json(session, Method::POST, "/employees", input).await
    }

    pub async fn update_employee(
        &self,
        session: &mut Session,
        id: DbId,
        changes: &EmployeeChanges,
    ) -> Result<Employee> {
        self.send_json(session, Method::PATCH, &format!("/employees/{id}"), changes)
            .await
    }

    /// Resign an employee. `date` defaults to the server's current time.
    pub async fn resign_employee(
        &self,
        session: &mut Session,
        id: DbId,
        reason: &str,
        date: Option<Timestamp>,
    ) -> Result<MessageWith<Employee>> {
        let body = ResignBody {
            resignation_reason: reason,
            resignation_date: date,
        };
        self.send_json(session, Method::POST, &format!("/employees/{id}/resign"), &body)
            .await
    }

    /// Deprecated server-side alias for resigning without a reason.
    pub async fn delete_employee(&self, session: &mut Session, id: DbId) -> Result<Message> {
        self.delete(session, &format!("/employees/{id}")).await
    }

    pub async fn employee_services(
        &self,
        session: &mut Session,
        id: DbId,
    ) -> Result<Vec<ServiceRecord>> {
        self.get(session, &format!("/employees/{id}/services"), &[]).await
    }

    // ---- Plumbing -----------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{API_PREFIX}{path}", self.base_url))
    }

    fn authorized(&self, session: &Session, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = session.token().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let request = self.authorized(session, Method::GET, path)?.query(query);
        self.send(session, request).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        session: &mut Session,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.authorized(session, method, path)?.json(body);
        self.send(session, request).await
    }

    async fn delete<T: DeserializeOwned>(&self, session: &mut Session, path: &str) -> Result<T> {
        let request = self.authorized(session, Method::DELETE, path)?;
        self.send(session, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        request: RequestBuilder,
    ) -> Result<T> {
        let resp = request.send().await?;
        let resp = check_status(session, resp).await?;
        Ok(resp.json().await?)
    }
}

/// Turn a non-success response into a [`ClientError`], clearing the
/// session on `401`.
async fn check_status(session: &mut Session, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => (status.as_str().to_string(), text),
    };

    if status == StatusCode::UNAUTHORIZED {
        session.clear();
        return Err(ClientError::Unauthorized(message));
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}
