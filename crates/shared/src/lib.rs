//! Shared utilities for the TeamMove backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing helpers for the admin key check
//! - Common validation logic

pub mod crypto;
pub mod validation;
