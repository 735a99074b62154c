//! # Selector
//!
//! Finds monitored items whose recorded state is stale or disagrees with
//! their last open event.
//!
//! ## Rules
//! Five read-only rules (see [`rules`]) are combined by set union with an
//! optional row cap. Rules whose time limit is disabled are left out.
//!
//! ## Storage
//! The monitoring database is SQLite, opened read-only. [`schema`] and
//! [`demo`] create and populate databases for tests and local demos.

pub mod demo;
mod error;
pub mod rules;
pub mod schema;
mod selector;
pub mod union;

pub use error::SelectorError;
pub use rules::Rule;
pub use selector::{get_desync, DesyncQuery, DesyncSelector};
