// src/archive/mod.rs
// =============================================================================
// This module persists page summaries.
//
// Currently implements:
// - A PostgreSQL store, cleared at the start of every run
// - A disabled store for runs without a connection string
// - A cap on the number of summaries that reach the store
//
// Submodules:
// - sink: the ArchiveSink trait, PageSummary and the wrappers
// - postgres: the PostgreSQL implementation
// =============================================================================

mod postgres;
mod sink;

use std::sync::Arc;

pub use postgres::PostgresArchive;
pub use sink::{ArchiveSink, CappedArchive, DisabledArchive, PageSummary};

#[cfg(test)]
pub use sink::MemoryArchive;

// Picks the archive for this run
//
// A missing connection string is not an error: the crawl simply runs without
// persistence.
pub fn open_archive(database_url: Option<&str>) -> anyhow::Result<Arc<dyn ArchiveSink>> {
    match database_url {
        Some(url) if !url.trim().is_empty() => Ok(Arc::new(PostgresArchive::new(url)?)),
        _ => Ok(Arc::new(DisabledArchive)),
    }
}
