//! Explicit token lifecycle for API callers.
//!
//! A [`Session`] starts [`Session::Anonymous`], becomes
//! [`Session::Authenticated`] on login and drops back on logout or on any
//! `401` response. Every [`ApiClient`](crate::ApiClient) call takes the
//! session as an argument, so there is no hidden token storage.

use backoffice_core::types::Timestamp;
use chrono::{Duration, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        token: String,
        expires_at: Timestamp,
    },
}

impl Session {
    pub fn new() -> Self {
        Self::Anonymous
    }

    /// Store a freshly issued token valid for `expires_in_secs`.
    pub fn authenticate(&mut self, token: String, expires_in_secs: i64) {
        *self = Session::Authenticated {
            token,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        };
    }

    pub fn clear(&mut self) {
        *self = Session::Anonymous;
    }

    /// The bearer token, unless the session is anonymous or expired.
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, expires_at } if *expires_at > Utc::now() => {
                Some(token)
            }
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
