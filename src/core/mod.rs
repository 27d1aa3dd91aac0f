//! core
//!
//! Core domain types, output formats, and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, FileMode, Change, the kind-to-sides table
//! - [`format`] - Output container kinds and extension inference
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Format and name validation needs no repository

pub mod config;
pub mod format;
pub mod types;
