// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Account, Address, AssetIssue, Slot, TimestampMillis};

pub use self::policy::{policy_constants, Policy};

mod policy;

/// Keyed access to account records.
///
/// Lookups return owned copies; a mutation only takes effect once the
/// caller writes the record back with `put_account`.
pub trait AccountStore {
    fn account(&self, address: &Address) -> Option<Account>;

    fn put_account(&mut self, account: Account);

    fn contains_account(&self, address: &Address) -> bool {
        self.account(address).is_some()
    }
}

/// Keyed access to asset issuance records.
pub trait AssetIssueStore {
    fn asset_issue(&self, name: &str) -> Option<AssetIssue>;

    fn put_asset_issue(&mut self, asset: AssetIssue);
}

/// Typed access to the dynamic-properties singleton. Only the public free
/// pool is writable from the processors; everything else is maintained by
/// staking and governance subsystems.
pub trait DynamicPropertyStore {
    fn total_net_limit(&self) -> i64;
    fn total_net_weight(&self) -> i64;

    fn free_net_limit(&self) -> i64;

    fn public_net_limit(&self) -> i64;
    fn public_net_usage(&self) -> i64;
    fn set_public_net_usage(&mut self, usage: i64);
    fn public_net_time(&self) -> Slot;
    fn set_public_net_time(&mut self, slot: Slot);

    /// Wall-clock time of the current head block, in milliseconds.
    fn head_block_timestamp(&self) -> TimestampMillis;
}

/// Everything a resource processor sees of the node: the collaborator
/// stores, the chain policy, and the slot clock.
///
/// The block processor serializes transaction application, so an exclusive
/// borrow of the runtime covers the whole of one transaction; no locking
/// exists below this trait.
pub trait Runtime: AccountStore + AssetIssueStore + DynamicPropertyStore {
    /// Opaque capture of the full store state.
    ///
    /// Processors commit per-step and never roll back themselves; a caller
    /// that needs whole-transaction atomicity takes a snapshot before
    /// `consume` and reverts to it on error.
    type Snapshot;

    fn policy(&self) -> &Policy;

    /// The current slot, derived from block height. Monotonically
    /// non-decreasing across blocks.
    fn head_slot(&self) -> Slot;

    fn snapshot(&self) -> Self::Snapshot;

    fn revert(&mut self, snapshot: Self::Snapshot);
}
