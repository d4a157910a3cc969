// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

/// Explicit override for the data directory.
pub const DATA_DIR_ENV: &str = "SCANMASTER_DATA_DIR";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = resolve(|name| std::env::var(name).ok());
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Pick the data directory from the environment: the explicit override, then
/// the XDG data dir, then `~/.local/share`, then the system temp dir.
fn resolve(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    let set = |name: &str| env(name).filter(|v| !v.is_empty());

    if let Some(dir) = set(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = set("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("scanmaster");
    }
    if let Some(home) = set("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("scanmaster");
    }
    // Last resort
    std::env::temp_dir().join("scanmaster")
}
