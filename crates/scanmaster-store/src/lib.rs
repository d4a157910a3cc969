// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanmaster-store — Local persistence for ScanMaster.
//
// A small key-value blob store interface with in-memory and SQLite backends,
// SHA-256 checksums on every stored value, and the persisted application
// state (document library, plan, daily usage counters) layered on top.

pub mod blob;
pub mod integrity;
pub mod sqlite;
pub mod state;

pub use blob::{BlobStore, MemoryBlobStore};
pub use integrity::{hash_bytes, verify_hash};
pub use sqlite::SqliteBlobStore;
pub use state::PersistedState;
