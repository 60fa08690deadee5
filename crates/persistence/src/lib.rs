//! Persistence layer for the TeamMove backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - The PostgreSQL feature toggle store

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
