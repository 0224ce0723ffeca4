//! Core types and utilities for the FX rate graph
//!
//! This crate provides shared types used across all components:
//! - Currency codes and rate observations
//! - Feed records
//! - Error types
//! - Application configuration

pub mod types;
pub mod config;
pub mod errors;

pub use types::*;
pub use self::config::*;
pub use errors::*;
