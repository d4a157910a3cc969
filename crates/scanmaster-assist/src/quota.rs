// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Free-plan metering of OCR and translation.

use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::{FreeLimits, MeteredFeature, UsageStats, UserPlan};
use tracing::{debug, info};

/// Enforces the daily allowances for a plan. Pro is unlimited and never
/// counted.
#[derive(Debug, Clone, Copy)]
pub struct UsageGate {
    plan: UserPlan,
    limits: FreeLimits,
}

impl UsageGate {
    pub fn new(plan: UserPlan, limits: FreeLimits) -> Self {
        Self { plan, limits }
    }

    pub fn plan(&self) -> UserPlan {
        self.plan
    }

    /// Runs left today, or `None` when unlimited.
    pub fn remaining(&self, stats: &UsageStats, feature: MeteredFeature) -> Option<u32> {
        if self.plan.is_pro() {
            return None;
        }
        Some(
            self.limits
                .limit_for(feature)
                .saturating_sub(stats.count(feature)),
        )
    }

    /// Fail with `QuotaExceeded` if no run is left.
    pub fn check(&self, stats: &UsageStats, feature: MeteredFeature) -> Result<()> {
        match self.remaining(stats, feature) {
            Some(0) => {
                let limit = self.limits.limit_for(feature);
                info!(%feature, limit, "Daily free allowance used up");
                Err(ScanmasterError::QuotaExceeded { feature, limit })
            }
            _ => Ok(()),
        }
    }

    /// Count one successful run.
    pub fn record(&self, stats: &mut UsageStats, feature: MeteredFeature) {
        if self.plan.is_pro() {
            return;
        }
        stats.increment(feature);
        debug!(%feature, used = stats.count(feature), "Usage recorded");
    }
}
