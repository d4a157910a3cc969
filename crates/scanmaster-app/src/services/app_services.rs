// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — opens the store, loads settings, and moves the
// application state in and out of persistence.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use scanmaster_core::AppConfig;
use scanmaster_core::error::Result;
use scanmaster_store::{BlobStore, MemoryBlobStore, PersistedState, SqliteBlobStore};
use tracing::{info, warn};

use super::data_dir;
use crate::state::AppState;

const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "scanmaster.db";

/// Backend services for one run of the app.
pub struct AppServices {
    store: Box<dyn BlobStore>,
    data_dir: PathBuf,
    config: AppConfig,
}

impl AppServices {
    /// Open the store in the platform data directory. Call once at startup.
    pub fn init() -> Result<Self> {
        Self::open_at(data_dir::data_dir())
    }

    /// Open the store and settings under `dir`.
    pub fn open_at(dir: PathBuf) -> Result<Self> {
        info!(path = %dir.display(), "initialising app services");
        std::fs::create_dir_all(&dir)?;
        let store = SqliteBlobStore::open(dir.join(STORE_FILE))?;
        let config = load_config(&dir).unwrap_or_default();
        Ok(Self {
            store: Box::new(store),
            data_dir: dir,
            config,
        })
    }

    /// In-memory services for when the data directory cannot be used.
    /// Nothing survives the process.
    pub fn in_memory() -> Self {
        warn!("using in-memory storage, changes will not be kept");
        Self {
            store: Box::new(MemoryBlobStore::new()),
            data_dir: std::env::temp_dir(),
            config: AppConfig::default(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replace the settings and write them to `config.json`.
    pub fn update_config(&mut self, config: AppConfig) -> Result<()> {
        persist_config(&self.data_dir, &config)?;
        self.config = config;
        Ok(())
    }

    // -- State ---------------------------------------------------------------

    pub fn load_state(&self, today: NaiveDate) -> Result<AppState> {
        let persisted = PersistedState::load(self.store.as_ref(), today)?;
        Ok(AppState::from_persisted(persisted, self.config.clone()))
    }

    pub fn save_state(&self, state: &AppState) -> Result<()> {
        state.to_persisted().save(self.store.as_ref())
    }

    /// Wipe all stored data and return the first-run state.
    pub fn reset(&self, today: NaiveDate) -> Result<AppState> {
        let persisted = PersistedState::reset(self.store.as_ref(), today)?;
        Ok(AppState::from_persisted(persisted, self.config.clone()))
    }
}

// -- Config persistence -------------------------------------------------------

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), "ignoring unreadable config: {e}");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
