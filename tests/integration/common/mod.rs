//! Common utilities for integration tests.
//!
//! Shared LocalStack setup and Kafka sink style test data.

pub mod localstack;

pub use localstack::{gzip, LocalStackTestContext};
