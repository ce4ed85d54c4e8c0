//! Core types and trait definitions for Veritas.
//!
//! This crate has no HTTP or model dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod export;
pub mod history;
pub mod record;
pub mod session;
pub mod stats;
pub mod store;
pub mod text;

pub use error::{Error, Result};
