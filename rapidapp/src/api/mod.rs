//! Rapidapp REST API client

pub mod client;
pub mod error;
pub mod postgres;

pub use client::{Client, RetryConfig, DEFAULT_ENDPOINT};
pub use error::ApiError;
pub use postgres::{PostgresApi, PostgresDatabase, STATUS_RUNNING};
