// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

use crate::{Slot, TimestampMillis};

/// Chain-wide dynamic properties singleton. Unlike [`crate::runtime::Policy`]
/// these values move while the chain runs: weights track staking, the public
/// pool accumulates usage, and governance can retune the limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicProperties {
    /// System-wide bandwidth distributed across all staked weight.
    pub total_net_limit: i64,
    /// Sum of every account's net weight (frozen balance / stake divisor).
    pub total_net_weight: i64,

    /// Per-account free allowance.
    pub free_net_limit: i64,

    // System-wide free pool.
    pub public_net_limit: i64,
    pub public_net_usage: i64,
    pub public_net_time: Slot,

    /// Wall-clock time of the current head block, in milliseconds.
    pub head_block_timestamp: TimestampMillis,
}

impl Default for DynamicProperties {
    fn default() -> Self {
        Self {
            total_net_limit: 43_200_000_000,
            total_net_weight: 0,
            free_net_limit: 5_000,
            public_net_limit: 14_400_000_000,
            public_net_usage: 0,
            public_net_time: 0,
            head_block_timestamp: 0,
        }
    }
}
