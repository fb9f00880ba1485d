//! Shared utilities for the Granary contract suite.
//!
//! This crate provides [`roles`] — the role/permission storage machinery used
//! by the farm contract. Each contract keeps its own operation → role table;
//! this module only knows how to persist and query grants.

#![no_std]

pub mod roles;

pub use roles::*;
