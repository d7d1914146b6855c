//! Domain models shared by the stores, the API and the client.
//!
//! Field names serialize in camelCase to match the admin client.

pub mod account;
pub mod branch;
pub mod employee;
pub mod member;
pub mod service_record;
