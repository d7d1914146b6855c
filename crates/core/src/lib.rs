//! Domain core of the store back office.
//!
//! Pure logic with no I/O: sequential codes, list filters, pagination,
//! status rules and the shared models. Both store backends and the HTTP
//! layer build on these types.

pub mod code;
pub mod error;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod status;
pub mod types;
