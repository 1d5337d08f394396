//! Integration tests for battle-admin.

pub mod procedure_test;
pub mod routes_test;
