// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Bandwidth accounting for the transaction admission layer.
//!
//! Every transaction consumes bandwidth, measured as its serialized size in
//! bytes and charged against one of four sources with fixed precedence: a
//! synthetic surcharge when a transfer materializes a new recipient, the
//! asset issuer's buckets for third-party asset transfers, the sender's
//! staked bucket, and the sender's free allowance backed by the system
//! pool. Validators replay this logic when applying blocks, so every
//! rounding and tie-break below is consensus.

use std::collections::BTreeMap;

use ampere_chain_runtime::runtime::{
    AccountStore, AssetIssueStore, DynamicPropertyStore, Policy, Runtime,
};
use ampere_chain_runtime::{processor_error, Account, Address, ExitCode, ProcessorError, Slot};
use log::debug;

pub use self::logic::{global_net_limit, increase};
pub use self::types::*;

mod logic;
pub mod testing;
mod types;

/// No charging tier admitted the contract.
pub const ERR_BANDWIDTH_INSUFFICIENT: ExitCode = ExitCode::new(32);

/// Admission-layer processor charging serialized transaction size against
/// bandwidth buckets.
pub struct BandwidthProcessor;

impl BandwidthProcessor {
    /// Charges the transaction's bandwidth, contract by contract in list
    /// order.
    ///
    /// Each admitted contract commits its store writes before the next one
    /// is considered; a rejection leaves earlier contracts' commits in
    /// place. Callers that need whole-transaction atomicity snapshot the
    /// runtime first and revert on error.
    pub fn consume(rt: &mut impl Runtime, tx: &impl Transaction) -> Result<(), ProcessorError> {
        // The full transaction's size is charged to every contract it
        // carries, not apportioned between them.
        let bytes = tx.serialized_size() as i64;
        for contract in tx.contracts() {
            Self::consume_contract(rt, contract, bytes)?;
        }
        Ok(())
    }

    fn consume_contract(
        rt: &mut impl Runtime,
        contract: &Contract,
        bytes: i64,
    ) -> Result<(), ProcessorError> {
        let mut account = rt.account(&contract.owner).ok_or_else(
            || processor_error!(not_found; "account {} does not exist", contract.owner),
        )?;
        let now = rt.head_slot();

        if Self::contract_creates_new_account(rt, contract) {
            Self::consume_for_new_account(rt, &mut account, now)?;
        }

        if let ContractPayload::TransferAsset(params) = &contract.payload {
            if Self::use_asset_issue_net(rt, &mut account, params, bytes, now)? {
                return Ok(());
            }
        }
        if Self::use_account_net(rt, &mut account, bytes, now)? {
            return Ok(());
        }
        if Self::use_free_net(rt, &mut account, bytes, now)? {
            return Ok(());
        }
        Err(ProcessorError::unchecked(
            ERR_BANDWIDTH_INSUFFICIENT,
            format!(
                "account {} has insufficient bandwidth for {:?} contract of {} bytes",
                account.address,
                contract.contract_type(),
                bytes
            ),
        ))
    }

    /// A contract creates a new account iff it is a transfer whose
    /// recipient is absent from the account store. The recipient record
    /// itself is materialized by the transfer's executor, not here.
    fn contract_creates_new_account(rt: &mut impl Runtime, contract: &Contract) -> bool {
        let to_address = match &contract.payload {
            ContractPayload::Transfer(params) => &params.to_address,
            ContractPayload::TransferAsset(params) => &params.to_address,
            ContractPayload::AccountUpdate(_) => return false,
        };
        !rt.contains_account(to_address)
    }

    /// First-touch recipients cost the sender a synthetic byte surcharge
    /// from the staked bucket, charged before and on top of the byte
    /// charge. The write commits immediately; a later all-tier rejection
    /// does not undo it.
    fn consume_for_new_account(
        rt: &mut impl Runtime,
        account: &mut Account,
        now: Slot,
    ) -> Result<(), ProcessorError> {
        let cost = rt.policy().create_account_bandwidth_cost;
        let limit = logic::global_net_limit(
            rt.policy(),
            account.frozen_balance,
            rt.total_net_limit(),
            rt.total_net_weight(),
        )?;
        let usage =
            logic::increase(rt.policy(), account.net_usage, 0, account.latest_consume_time, now);
        if cost > limit - usage {
            debug!("account {} cannot cover the new-account surcharge", account.address);
            return Err(ProcessorError::unchecked(
                ERR_BANDWIDTH_INSUFFICIENT,
                format!(
                    "account {} has insufficient bandwidth for the {} byte new-account surcharge",
                    account.address, cost
                ),
            ));
        }
        account.net_usage = logic::increase(rt.policy(), usage, cost, now, now);
        account.latest_consume_time = now;
        account.latest_operation_time = rt.head_block_timestamp();
        rt.put_account(account.clone());
        Ok(())
    }

    /// Charges a third-party asset transfer against the asset's shared
    /// pool, the sender's per-asset free bucket and the issuer's staked
    /// bucket. All three decays and predicates run before any of the three
    /// writes; nothing fallible sits between them, so the step commits
    /// whole or not at all.
    fn use_asset_issue_net(
        rt: &mut impl Runtime,
        account: &mut Account,
        params: &TransferAssetParams,
        bytes: i64,
        now: Slot,
    ) -> Result<bool, ProcessorError> {
        let mut asset = rt.asset_issue(&params.asset_name).ok_or_else(
            || processor_error!(not_found; "asset {} does not exist", params.asset_name),
        )?;
        if asset.owner_address == account.address {
            // Senders moving their own issue pay from their staked bucket.
            return Ok(false);
        }

        let mut issuer = rt.account(&asset.owner_address).ok_or_else(|| {
            processor_error!(
                illegal_state;
                "issuer account {} of asset {} does not exist",
                asset.owner_address, params.asset_name
            )
        })?;

        let pool_usage = logic::increase(
            rt.policy(),
            asset.public_free_asset_net_usage,
            0,
            asset.public_latest_free_net_time,
            now,
        );
        let holder_usage = logic::increase(
            rt.policy(),
            account.asset_net_usage(&params.asset_name),
            0,
            account.asset_operation_time(&params.asset_name),
            now,
        );
        let issuer_limit = logic::global_net_limit(
            rt.policy(),
            issuer.frozen_balance,
            rt.total_net_limit(),
            rt.total_net_weight(),
        )?;
        let issuer_usage =
            logic::increase(rt.policy(), issuer.net_usage, 0, issuer.latest_consume_time, now);

        if bytes > asset.public_free_asset_net_limit - pool_usage {
            debug!("asset {} public free bandwidth is running out", params.asset_name);
            return Ok(false);
        }
        if bytes > asset.free_asset_net_limit - holder_usage {
            debug!(
                "account {} free bandwidth for asset {} is running out",
                account.address, params.asset_name
            );
            return Ok(false);
        }
        if bytes > issuer_limit - issuer_usage {
            debug!("issuer {} staked bandwidth is running out", issuer.address);
            return Ok(false);
        }

        let head_timestamp = rt.head_block_timestamp();
        asset.public_free_asset_net_usage =
            logic::increase(rt.policy(), pool_usage, bytes, now, now);
        asset.public_latest_free_net_time = now;
        let new_holder_usage = logic::increase(rt.policy(), holder_usage, bytes, now, now);
        account.set_asset_net_usage(&params.asset_name, new_holder_usage);
        account.set_asset_operation_time(&params.asset_name, now);
        account.latest_operation_time = head_timestamp;
        issuer.net_usage = logic::increase(rt.policy(), issuer_usage, bytes, now, now);
        issuer.latest_consume_time = now;
        rt.put_account(account.clone());
        rt.put_account(issuer);
        rt.put_asset_issue(asset);
        Ok(true)
    }

    /// Charges the sender's staked bucket.
    fn use_account_net(
        rt: &mut impl Runtime,
        account: &mut Account,
        bytes: i64,
        now: Slot,
    ) -> Result<bool, ProcessorError> {
        let limit = logic::global_net_limit(
            rt.policy(),
            account.frozen_balance,
            rt.total_net_limit(),
            rt.total_net_weight(),
        )?;
        let usage =
            logic::increase(rt.policy(), account.net_usage, 0, account.latest_consume_time, now);
        if bytes > limit - usage {
            debug!(
                "account {} staked bandwidth is running out: {} of {} used",
                account.address, usage, limit
            );
            return Ok(false);
        }
        account.net_usage = logic::increase(rt.policy(), usage, bytes, now, now);
        account.latest_consume_time = now;
        account.latest_operation_time = rt.head_block_timestamp();
        rt.put_account(account.clone());
        Ok(true)
    }

    /// Charges the sender's free bucket and the system public pool; both
    /// need headroom.
    fn use_free_net(
        rt: &mut impl Runtime,
        account: &mut Account,
        bytes: i64,
        now: Slot,
    ) -> Result<bool, ProcessorError> {
        let free_usage = logic::increase(
            rt.policy(),
            account.free_net_usage,
            0,
            account.latest_consume_free_time,
            now,
        );
        if bytes > rt.free_net_limit() - free_usage {
            debug!("account {} free bandwidth is running out", account.address);
            return Ok(false);
        }
        let public_usage =
            logic::increase(rt.policy(), rt.public_net_usage(), 0, rt.public_net_time(), now);
        if bytes > rt.public_net_limit() - public_usage {
            debug!("public bandwidth pool is running out");
            return Ok(false);
        }

        account.free_net_usage = logic::increase(rt.policy(), free_usage, bytes, now, now);
        account.latest_consume_free_time = now;
        account.latest_operation_time = rt.head_block_timestamp();
        let new_public_usage = logic::increase(rt.policy(), public_usage, bytes, now, now);
        rt.set_public_net_usage(new_public_usage);
        rt.set_public_net_time(now);
        rt.put_account(account.clone());
        Ok(true)
    }

    /// Re-applies decay to every usage bucket the account holds, in memory.
    /// Time fields stay untouched and nothing is persisted; read paths call
    /// this before reporting usage.
    pub fn refresh_usage(policy: &Policy, account: &mut Account, now: Slot) {
        account.net_usage =
            logic::increase(policy, account.net_usage, 0, account.latest_consume_time, now);
        account.free_net_usage = logic::increase(
            policy,
            account.free_net_usage,
            0,
            account.latest_consume_free_time,
            now,
        );
        let assets: Vec<String> = account.free_asset_net_usage.keys().cloned().collect();
        for asset in assets {
            let usage = logic::increase(
                policy,
                account.asset_net_usage(&asset),
                0,
                account.asset_operation_time(&asset),
                now,
            );
            account.set_asset_net_usage(&asset, usage);
        }
    }

    /// Read-only bandwidth report for `address`, decayed to the head slot.
    /// Writes nothing. Assets referenced by the account but unknown to the
    /// asset store are omitted.
    pub fn net_status(
        rt: &impl Runtime,
        address: &Address,
    ) -> Result<AccountNetStatus, ProcessorError> {
        let mut account = rt
            .account(address)
            .ok_or_else(|| processor_error!(not_found; "account {} does not exist", address))?;
        let now = rt.head_slot();
        Self::refresh_usage(rt.policy(), &mut account, now);

        let net_limit = logic::global_net_limit(
            rt.policy(),
            account.frozen_balance,
            rt.total_net_limit(),
            rt.total_net_weight(),
        )?;
        let mut asset_net = BTreeMap::new();
        for (name, usage) in &account.free_asset_net_usage {
            if let Some(asset) = rt.asset_issue(name) {
                asset_net.insert(
                    name.clone(),
                    AssetNetStatus { usage: *usage, limit: asset.free_asset_net_limit },
                );
            }
        }
        Ok(AccountNetStatus {
            net_usage: account.net_usage,
            net_limit,
            free_net_usage: account.free_net_usage,
            free_net_limit: rt.free_net_limit(),
            asset_net,
        })
    }
}
