//! Metadata caching with TTL support.
//!
//! This crate keeps an in-memory snapshot of the machines, operators and
//! supervisors tables so that range queries can enumerate machines and join
//! names without re-reading the reference files on every request.

#![warn(missing_docs)]

mod cache;

pub use cache::{MetadataCache, MetadataCacheConfig, MetadataCacheConfigBuilder, MetadataSource};
