// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::BTreeMap;

use ampere_chain_runtime::Address;
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Wire-level tag of a contract inside a transaction.
#[derive(FromPrimitive, Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum ContractType {
    Transfer = 1,
    TransferAsset = 2,
    AccountUpdate = 10,
}

/// Plain value transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferParams {
    pub to_address: Address,
    pub amount: i64,
}

/// Transfer of an issued asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAssetParams {
    pub asset_name: String,
    pub to_address: Address,
    pub amount: i64,
}

/// Profile update. Carries no bandwidth-specific handling; it stands for
/// every contract type charged purely from the sender's own buckets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateParams {
    pub account_name: String,
}

/// Typed parameter payload of a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractPayload {
    Transfer(TransferParams),
    TransferAsset(TransferAssetParams),
    AccountUpdate(AccountUpdateParams),
}

impl ContractPayload {
    pub fn contract_type(&self) -> ContractType {
        match self {
            ContractPayload::Transfer(_) => ContractType::Transfer,
            ContractPayload::TransferAsset(_) => ContractType::TransferAsset,
            ContractPayload::AccountUpdate(_) => ContractType::AccountUpdate,
        }
    }
}

/// One operation inside a transaction. `owner` is the sender whose buckets
/// pay for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub owner: Address,
    pub payload: ContractPayload,
}

impl Contract {
    pub fn contract_type(&self) -> ContractType {
        self.payload.contract_type()
    }
}

/// The slice of a transaction the bandwidth processor consumes. Wire
/// encoding, signatures and the rest of the container live elsewhere; only
/// the serialized size and the ordered contract list matter here.
pub trait Transaction {
    /// Serialized size of the whole transaction in bytes.
    fn serialized_size(&self) -> u64;

    /// Contracts in execution order.
    fn contracts(&self) -> &[Contract];
}

/// Read-only bandwidth report for one account, decayed to the head slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNetStatus {
    pub net_usage: i64,
    pub net_limit: i64,
    pub free_net_usage: i64,
    pub free_net_limit: i64,
    pub asset_net: BTreeMap<String, AssetNetStatus>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetNetStatus {
    pub usage: i64,
    pub limit: i64,
}
