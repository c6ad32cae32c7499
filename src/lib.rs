// Library interface for the binary and integration tests

pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod mapper;
pub mod queries;
pub mod record;
pub mod register;
pub mod repository;
pub mod schema;
pub mod session;

// Re-export the expected database version for convenience
pub use constants::EXPECTED_DB_VERSION;
