pub mod auth;
pub mod branches;
pub mod employees;
pub mod members;
