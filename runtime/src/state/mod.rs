// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use self::account::Account;
pub use self::asset_issue::AssetIssue;
pub use self::dynamic_properties::DynamicProperties;

mod account;
mod asset_issue;
mod dynamic_properties;
