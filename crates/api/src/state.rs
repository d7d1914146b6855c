use std::sync::Arc;

use backoffice_db::Store;

use crate::config::ServerConfig;
use crate::services::employee::EmployeeService;
use crate::services::member::MemberService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL or in-memory).
    pub store: Arc<dyn Store>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    pub members: MemberService,
    pub employees: EmployeeService,
}

impl AppState {
    /// Wire services onto `store` using the limits in `config`.
    pub fn new<S: Store + 'static>(store: Arc<S>, config: ServerConfig) -> Self {
        let members = MemberService::new(
            store.clone(),
            config.history.member,
            config.code_retry_attempts,
        );
        let employees = EmployeeService::new(
            store.clone(),
            store.clone(),
            config.history.employee,
            config.code_retry_attempts,
        );
        Self {
            store,
            config: Arc::new(config),
            members,
            employees,
        }
    }
}
