// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Address, Slot, TimestampMillis};

/// Account record as the account store persists it.
///
/// Each `(usage, time)` pair is one bandwidth bucket: the usage recorded as
/// if spread evenly over the window ending at `time`. Per-asset buckets are
/// keyed by asset name; absent entries read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,

    /// Stake backing the staked bandwidth bucket, in base token units.
    pub frozen_balance: i64,

    // Staked bucket.
    pub net_usage: i64,
    pub latest_consume_time: Slot,

    // Per-account free bucket.
    pub free_net_usage: i64,
    pub latest_consume_free_time: Slot,

    // Per-asset free buckets.
    pub free_asset_net_usage: BTreeMap<String, i64>,
    pub latest_asset_operation_time: BTreeMap<String, Slot>,

    /// Block timestamp of the last committed charge. Written on every
    /// commit; the processors never read it back.
    pub latest_operation_time: TimestampMillis,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Self { address, ..Default::default() }
    }

    /// Usage recorded in the free bucket for `asset`.
    pub fn asset_net_usage(&self, asset: &str) -> i64 {
        self.free_asset_net_usage.get(asset).copied().unwrap_or(0)
    }

    pub fn set_asset_net_usage(&mut self, asset: &str, usage: i64) {
        self.free_asset_net_usage.insert(asset.to_string(), usage);
    }

    /// Slot of the last charge against the free bucket for `asset`.
    pub fn asset_operation_time(&self, asset: &str) -> Slot {
        self.latest_asset_operation_time.get(asset).copied().unwrap_or(0)
    }

    pub fn set_asset_operation_time(&mut self, asset: &str, slot: Slot) {
        self.latest_asset_operation_time.insert(asset.to_string(), slot);
    }
}
