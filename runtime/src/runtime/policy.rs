// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

use crate::Slot;

/// Chain parameters fixed for the lifetime of a run. Networks override
/// individual fields at genesis; consensus requires every validator to run
/// the same values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Fixed-point scale factor for the usage decay computation.
    pub precision: i64,

    /// Bandwidth window width in milliseconds.
    pub bandwidth_window_ms: i64,

    /// Nominal slot duration in milliseconds.
    pub block_interval_ms: i64,

    /// Synthetic byte surcharge charged to a sender whose transfer
    /// materializes a not-yet-existing recipient.
    pub create_account_bandwidth_cost: i64,

    /// Divisor converting frozen balance to net weight.
    pub stake_divisor: i64,
}

impl Policy {
    /// Bandwidth window width in slots.
    pub fn bandwidth_window_slots(&self) -> Slot {
        self.bandwidth_window_ms / self.block_interval_ms
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            precision: policy_constants::PRECISION,
            bandwidth_window_ms: policy_constants::BANDWIDTH_WINDOW_MS,
            block_interval_ms: policy_constants::BLOCK_INTERVAL_MS,
            create_account_bandwidth_cost: policy_constants::CREATE_ACCOUNT_BANDWIDTH_COST,
            stake_divisor: policy_constants::STAKE_DIVISOR,
        }
    }
}

pub mod policy_constants {
    pub const PRECISION: i64 = 1_000_000;

    /// 24 hours.
    pub const BANDWIDTH_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

    pub const BLOCK_INTERVAL_MS: i64 = 3_000;

    pub const CREATE_ACCOUNT_BANDWIDTH_COST: i64 = 1_000;

    pub const STAKE_DIVISOR: i64 = 1_000_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_window_is_28_800_slots() {
        assert_eq!(Policy::default().bandwidth_window_slots(), 28_800);
    }
}
