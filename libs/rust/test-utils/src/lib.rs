//! Shared test utilities for pact-ledger.
//!
//! This crate provides:
//! - Proptest generators for requests, responses and pact identities
//! - An in-memory pact store
//! - Test fixtures with sample todo-service interactions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
