// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application state — one explicit container for the library, plan, usage
// counters, and the scan in progress, passed to whatever needs it.

use scanmaster_assist::UsageGate;
use scanmaster_core::AppConfig;
use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::{DocumentId, DocumentRecord, ScannedPage, UsageStats, UserPlan};
use scanmaster_store::PersistedState;
use tracing::info;

/// Everything the app works with between loads and saves.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Saved documents, newest first.
    pub documents: Vec<DocumentRecord>,
    pub plan: UserPlan,
    pub stats: UsageStats,
    /// Pages captured but not yet saved as a document.
    pub current_scan: Vec<ScannedPage>,
    /// Document open in the viewer, if any.
    pub selected_document: Option<DocumentId>,
    pub onboarding_done: bool,
    /// Application settings.
    pub config: AppConfig,
}

impl AppState {
    pub fn from_persisted(persisted: PersistedState, config: AppConfig) -> Self {
        Self {
            documents: persisted.documents,
            plan: persisted.plan,
            stats: persisted.stats,
            current_scan: Vec::new(),
            selected_document: None,
            onboarding_done: persisted.onboarding_done,
            config,
        }
    }

    /// The parts of the state that survive a restart.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            documents: self.documents.clone(),
            plan: self.plan,
            stats: self.stats.clone(),
            onboarding_done: self.onboarding_done,
        }
    }

    /// Quota gate for the current plan.
    pub fn usage_gate(&self) -> UsageGate {
        UsageGate::new(self.plan, self.config.free_limits)
    }

    /// Whether exports carry the free-tier caption.
    pub fn export_footer(&self) -> bool {
        !self.plan.is_pro()
    }

    // -- Library --------------------------------------------------------------

    pub fn document(&self, id: DocumentId) -> Result<&DocumentRecord> {
        self.documents
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ScanmasterError::NotFound(format!("document {id}")))
    }

    pub fn document_mut(&mut self, id: DocumentId) -> Result<&mut DocumentRecord> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ScanmasterError::NotFound(format!("document {id}")))
    }

    /// Save the pages captured so far as a new document at the top of the
    /// library and select it.
    pub fn finish_current_scan(&mut self) -> Result<DocumentId> {
        if self.current_scan.is_empty() {
            return Err(ScanmasterError::InvalidParameter(
                "no pages have been captured".into(),
            ));
        }
        let pages = std::mem::take(&mut self.current_scan);
        let document = DocumentRecord::new(pages);
        let id = document.id;
        info!(document = %id, pages = document.pages.len(), "Document saved");

        self.documents.insert(0, document);
        self.selected_document = Some(id);
        self.onboarding_done = true;
        Ok(id)
    }

    /// Replace a document after editing, keeping its place in the list.
    pub fn update_document(&mut self, mut document: DocumentRecord) -> Result<()> {
        document.refresh_size();
        let slot = self.document_mut(document.id)?;
        *slot = document;
        Ok(())
    }

    pub fn delete_document(&mut self, id: DocumentId) -> Result<DocumentRecord> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ScanmasterError::NotFound(format!("document {id}")))?;
        if self.selected_document == Some(id) {
            self.selected_document = None;
        }
        Ok(self.documents.remove(index))
    }
}
