//! Domain layer for the TeamMove backend.
//!
//! This crate contains:
//! - Feature toggle models and request/response types
//! - The toggle store abstraction and an in-memory implementation
//! - The feature toggle cache and service

pub mod models;
pub mod services;
