// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persisted application state — the document library, the user's plan, daily
// usage counters, and whether onboarding has been seen — mapped onto four keys
// of a `BlobStore`.

use chrono::NaiveDate;
use scanmaster_core::error::Result;
use scanmaster_core::types::{DocumentRecord, UsageStats, UserPlan};
use tracing::{debug, info, instrument, warn};

use crate::blob::BlobStore;

/// JSON array of `DocumentRecord`.
pub const DOCUMENTS_KEY: &str = "scanmaster.docs";
/// Plain text `FREE` or `PRO`.
pub const PLAN_KEY: &str = "scanmaster.plan";
/// JSON `UsageStats`.
pub const STATS_KEY: &str = "scanmaster.stats";
/// Present (`true`) once onboarding has been completed.
pub const ONBOARDING_KEY: &str = "scanmaster.intro";

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub documents: Vec<DocumentRecord>,
    pub plan: UserPlan,
    pub stats: UsageStats,
    pub onboarding_done: bool,
}

impl PersistedState {
    /// First-run state.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            documents: Vec::new(),
            plan: UserPlan::Free,
            stats: UsageStats::new(today),
            onboarding_done: false,
        }
    }

    /// Read the state back, zeroing usage counters stored on another day.
    ///
    /// A damaged plan or stats value is replaced by its default with a
    /// warning. A damaged document list is an error: silently dropping the
    /// library would lose the user's scans on the next save.
    #[instrument(skip(store))]
    pub fn load<S: BlobStore + ?Sized>(store: &S, today: NaiveDate) -> Result<Self> {
        let documents = match store.get(DOCUMENTS_KEY)? {
            Some(bytes) => serde_json::from_slice::<Vec<DocumentRecord>>(&bytes)?,
            None => Vec::new(),
        };

        let plan = match store.get(PLAN_KEY) {
            Ok(Some(bytes)) => match std::str::from_utf8(&bytes).ok().map(str::parse::<UserPlan>) {
                Some(Ok(plan)) => plan,
                _ => {
                    warn!("stored plan unreadable, using FREE");
                    UserPlan::Free
                }
            },
            Ok(None) => UserPlan::Free,
            Err(err) => {
                warn!(%err, "stored plan unavailable, using FREE");
                UserPlan::Free
            }
        };

        let mut stats = match store.get(STATS_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice::<UsageStats>(&bytes).unwrap_or_else(|err| {
                warn!(%err, "stored usage counters unreadable, starting fresh");
                UsageStats::new(today)
            }),
            Ok(None) => UsageStats::new(today),
            Err(err) => {
                warn!(%err, "stored usage counters unavailable, starting fresh");
                UsageStats::new(today)
            }
        };
        if stats.roll_over(today) {
            info!(%today, "Daily usage counters reset");
        }

        let onboarding_done = store
            .get(ONBOARDING_KEY)?
            .is_some_and(|value| value == b"true");

        debug!(
            documents = documents.len(),
            plan = %plan,
            onboarding_done,
            "State loaded"
        );
        Ok(Self {
            documents,
            plan,
            stats,
            onboarding_done,
        })
    }

    /// Write every key in one batch.
    #[instrument(skip(self, store), fields(documents = self.documents.len()))]
    pub fn save<S: BlobStore + ?Sized>(&self, store: &S) -> Result<()> {
        let documents = serde_json::to_vec(&self.documents)?;
        let stats = serde_json::to_vec(&self.stats)?;
        let onboarding: &[u8] = if self.onboarding_done { b"true" } else { b"false" };
        store.put_many(&[
            (DOCUMENTS_KEY, documents.as_slice()),
            (PLAN_KEY, self.plan.as_str().as_bytes()),
            (STATS_KEY, stats.as_slice()),
            (ONBOARDING_KEY, onboarding),
        ])?;
        debug!("State saved");
        Ok(())
    }

    /// Delete everything and return the first-run state.
    pub fn reset<S: BlobStore + ?Sized>(store: &S, today: NaiveDate) -> Result<Self> {
        store.clear()?;
        info!("All local data deleted");
        Ok(Self::new(today))
    }
}
