//! Common test utilities for all integration tests.
//!
//! Provides shared test database setup, cleanup, and helper functions.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod test_db;
