//! Entity services: the member and employee use cases the handlers call.
//!
//! Services hold the store behind `Arc<dyn ...>` so they can run against
//! PostgreSQL, the in-memory store, or a test double. They return
//! [`CoreError`](backoffice_core::error::CoreError) and leave HTTP mapping
//! to [`crate::error::AppError`].

pub mod employee;
pub mod member;
