//! Core of an in-memory emulation of a document database client, for use in tests.
//!
//! This crate provides:
//!
//! - **Values** ([`value`], [`timestamp`]) - Tagged field values and the point-in-time type
//! - **Addressing** ([`path`]) - Resolution of slash-delimited document paths
//! - **Query directives** ([`query`]) - Filters, ordering, offset and limit
//! - **Store backend abstraction** ([`backend`]) - The trait every store implements
//! - **Handles** ([`database`], [`collection`], [`document`], [`batch`]) - The client surface
//! - **Snapshots** ([`snapshot`]) - Materialized read results
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docmock::prelude::*;
//!
//! let db = create_mock(&Seed::new()).await?;
//! let alice = db.doc("users/alice")?;
//! alice.set(fields_from_json(json!({ "name": "Alice" }))?).await?;
//! assert!(alice.get().await?.exists());
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmock_core;

pub mod backend;
pub mod batch;
pub mod collection;
pub mod database;
pub mod document;
pub mod error;
pub mod path;
pub mod query;
pub mod snapshot;
pub mod timestamp;
pub mod value;

#[cfg(test)]
mod testing;
