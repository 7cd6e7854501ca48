// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

use crate::{Address, Slot};

/// Asset issuance record as the asset-issue store persists it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIssue {
    pub name: String,
    pub owner_address: Address,

    /// Cap on any single holder's free bucket for this asset.
    pub free_asset_net_limit: i64,

    // Asset-wide free pool shared by all holders.
    pub public_free_asset_net_limit: i64,
    pub public_free_asset_net_usage: i64,
    pub public_latest_free_net_time: Slot,
}

impl AssetIssue {
    pub fn new(name: impl Into<String>, owner_address: Address) -> Self {
        Self { name: name.into(), owner_address, ..Default::default() }
    }
}
