// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::runtime::{AccountStore, AssetIssueStore, DynamicPropertyStore, Policy, Runtime};
use crate::{
    Account, Address, AssetIssue, DynamicProperties, ExitCode, ProcessorError, Slot,
    TimestampMillis,
};

/// Enable logging to environment. Returns error if already init.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    pretty_env_logger::try_init()
}

/// In-memory runtime backing processor tests. Stores are plain maps and
/// every field is public so tests can arrange state directly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MockRuntime {
    pub policy: Policy,
    pub head_slot: Slot,
    pub accounts: HashMap<Address, Account>,
    pub asset_issues: BTreeMap<String, AssetIssue>,
    pub dynamic_properties: DynamicProperties,
}

/// Full copy of the mock's store state, returned by [`Runtime::snapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct MockSnapshot {
    accounts: HashMap<Address, Account>,
    asset_issues: BTreeMap<String, AssetIssue>,
    dynamic_properties: DynamicProperties,
}

impl MockRuntime {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_head_slot(&mut self, slot: Slot) {
        self.head_slot = slot;
    }

    pub fn set_head_block_timestamp(&mut self, timestamp: TimestampMillis) {
        self.dynamic_properties.head_block_timestamp = timestamp;
    }

    /// Arranges an account in the store, keyed by its address.
    pub fn add_account(&mut self, account: Account) {
        self.put_account(account);
    }

    pub fn add_asset_issue(&mut self, asset: AssetIssue) {
        self.put_asset_issue(asset);
    }
}

impl AccountStore for MockRuntime {
    fn account(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn put_account(&mut self, account: Account) {
        self.accounts.insert(account.address, account);
    }

    fn contains_account(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }
}

impl AssetIssueStore for MockRuntime {
    fn asset_issue(&self, name: &str) -> Option<AssetIssue> {
        self.asset_issues.get(name).cloned()
    }

    fn put_asset_issue(&mut self, asset: AssetIssue) {
        self.asset_issues.insert(asset.name.clone(), asset);
    }
}

impl DynamicPropertyStore for MockRuntime {
    fn total_net_limit(&self) -> i64 {
        self.dynamic_properties.total_net_limit
    }

    fn total_net_weight(&self) -> i64 {
        self.dynamic_properties.total_net_weight
    }

    fn free_net_limit(&self) -> i64 {
        self.dynamic_properties.free_net_limit
    }

    fn public_net_limit(&self) -> i64 {
        self.dynamic_properties.public_net_limit
    }

    fn public_net_usage(&self) -> i64 {
        self.dynamic_properties.public_net_usage
    }

    fn set_public_net_usage(&mut self, usage: i64) {
        self.dynamic_properties.public_net_usage = usage;
    }

    fn public_net_time(&self) -> Slot {
        self.dynamic_properties.public_net_time
    }

    fn set_public_net_time(&mut self, slot: Slot) {
        self.dynamic_properties.public_net_time = slot;
    }

    fn head_block_timestamp(&self) -> TimestampMillis {
        self.dynamic_properties.head_block_timestamp
    }
}

impl Runtime for MockRuntime {
    type Snapshot = MockSnapshot;

    fn policy(&self) -> &Policy {
        &self.policy
    }

    fn head_slot(&self) -> Slot {
        self.head_slot
    }

    fn snapshot(&self) -> MockSnapshot {
        MockSnapshot {
            accounts: self.accounts.clone(),
            asset_issues: self.asset_issues.clone(),
            dynamic_properties: self.dynamic_properties.clone(),
        }
    }

    fn revert(&mut self, snapshot: MockSnapshot) {
        self.accounts = snapshot.accounts;
        self.asset_issues = snapshot.asset_issues;
        self.dynamic_properties = snapshot.dynamic_properties;
    }
}

pub fn expect_abort_contains_message<T: fmt::Debug>(
    expect_exit_code: ExitCode,
    expect_msg: &str,
    res: Result<T, ProcessorError>,
) {
    let err = res.expect_err(&format!(
        "expected abort with exit code {}, but call succeeded",
        expect_exit_code
    ));
    assert_eq!(
        err.exit_code(),
        expect_exit_code,
        "expected failure with exit code {}, but failed with exit code {}; error message: {}",
        expect_exit_code,
        err.exit_code(),
        err.msg(),
    );
    let err_msg = err.msg();
    assert!(
        err.msg().contains(expect_msg),
        "expected err message '{}' to contain '{}'",
        err_msg,
        expect_msg,
    );
}

pub fn expect_abort<T: fmt::Debug>(exit_code: ExitCode, res: Result<T, ProcessorError>) {
    expect_abort_contains_message(exit_code, "", res);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips() {
        let mut rt = MockRuntime::new();
        rt.add_account(Account::new(Address::new_id(1)));
        let snapshot = rt.snapshot();

        rt.add_account(Account::new(Address::new_id(2)));
        rt.set_public_net_usage(77);
        rt.revert(snapshot);

        assert!(rt.contains_account(&Address::new_id(1)));
        assert!(!rt.contains_account(&Address::new_id(2)));
        assert_eq!(rt.public_net_usage(), 0);
    }

    #[test]
    fn put_account_keys_by_address() {
        let mut rt = MockRuntime::new();
        let mut account = Account::new(Address::new_id(5));
        account.frozen_balance = 42;
        rt.put_account(account.clone());
        assert_eq!(rt.account(&Address::new_id(5)), Some(account));
        assert_eq!(rt.account(&Address::new_id(6)), None);
    }
}
