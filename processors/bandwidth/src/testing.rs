use std::collections::{HashMap, HashSet};

use ampere_chain_runtime::runtime::Policy;
use ampere_chain_runtime::{
    Account, Address, AssetIssue, DynamicProperties, MessageAccumulator, Slot,
};

use crate::logic;

pub struct StateSummary {
    pub account_count: usize,
    pub asset_count: usize,
    pub total_frozen_balance: i64,
}

/// Checks internal invariants of the bandwidth accounting state.
pub fn check_state_invariants(
    policy: &Policy,
    now: Slot,
    accounts: &[Account],
    assets: &[AssetIssue],
    props: &DynamicProperties,
) -> (StateSummary, MessageAccumulator) {
    let acc = MessageAccumulator::default();

    let mut total_frozen_balance = 0_i64;
    let addresses: HashSet<Address> = accounts.iter().map(|a| a.address).collect();
    let assets_by_name: HashMap<&str, &AssetIssue> =
        assets.iter().map(|a| (a.name.as_str(), a)).collect();

    for account in accounts {
        let acc = acc.with_prefix(format!("account {}: ", account.address));
        check_account_invariants(policy, account, now, props, &assets_by_name, &acc);
        total_frozen_balance += account.frozen_balance;
    }

    for asset in assets {
        let acc = acc.with_prefix(format!("asset {}: ", asset.name));
        check_asset_invariants(policy, asset, now, &acc);
        acc.require(
            addresses.contains(&asset.owner_address),
            format!("issuer account {} does not exist", asset.owner_address),
        );
    }

    check_dynamic_property_invariants(policy, now, props, &acc);

    acc.require(
        total_frozen_balance == 0 || props.total_net_weight > 0,
        format!(
            "total net weight is {} with {} frozen across accounts",
            props.total_net_weight, total_frozen_balance
        ),
    );

    let summary = StateSummary {
        account_count: accounts.len(),
        asset_count: assets.len(),
        total_frozen_balance,
    };
    (summary, acc)
}

fn check_account_invariants(
    policy: &Policy,
    account: &Account,
    now: Slot,
    props: &DynamicProperties,
    assets_by_name: &HashMap<&str, &AssetIssue>,
    acc: &MessageAccumulator,
) {
    acc.require(account.frozen_balance >= 0, "frozen balance is negative");
    acc.require(account.net_usage >= 0, format!("net usage {} is negative", account.net_usage));
    acc.require(
        account.free_net_usage >= 0,
        format!("free net usage {} is negative", account.free_net_usage),
    );
    acc.require(
        account.latest_consume_time <= now,
        format!("staked bucket time {} is past slot {now}", account.latest_consume_time),
    );
    acc.require(
        account.latest_consume_free_time <= now,
        format!("free bucket time {} is past slot {now}", account.latest_consume_free_time),
    );
    acc.require(
        account.latest_operation_time <= props.head_block_timestamp,
        format!(
            "operation time {} is past head timestamp {}",
            account.latest_operation_time, props.head_block_timestamp
        ),
    );

    // Admission keeps every decayed bucket within its limit; the ceil bias
    // of the meter can overshoot by a single byte.
    if account.latest_consume_time <= now {
        match logic::global_net_limit(
            policy,
            account.frozen_balance,
            props.total_net_limit,
            props.total_net_weight,
        ) {
            Ok(limit) => {
                let decayed =
                    logic::increase(policy, account.net_usage, 0, account.latest_consume_time, now);
                acc.require(
                    decayed <= limit + 1,
                    format!("decayed net usage {decayed} exceeds limit {limit}"),
                );
            }
            Err(err) => acc.add(format!("staked limit is uncomputable: {}", err.msg())),
        }
    }
    if account.latest_consume_free_time <= now {
        let decayed = logic::increase(
            policy,
            account.free_net_usage,
            0,
            account.latest_consume_free_time,
            now,
        );
        acc.require(
            decayed <= props.free_net_limit + 1,
            format!("decayed free net usage {decayed} exceeds limit {}", props.free_net_limit),
        );
    }

    for (asset_name, usage) in &account.free_asset_net_usage {
        acc.require(*usage >= 0, format!("usage {usage} for asset {asset_name} is negative"));
        acc.require(
            account.latest_asset_operation_time.contains_key(asset_name),
            format!("asset {asset_name} has a usage entry but no time entry"),
        );
        let time = account.asset_operation_time(asset_name);
        if time <= now {
            if let Some(issue) = assets_by_name.get(asset_name.as_str()) {
                let decayed = logic::increase(policy, *usage, 0, time, now);
                acc.require(
                    decayed <= issue.free_asset_net_limit + 1,
                    format!(
                        "decayed usage {decayed} for asset {asset_name} exceeds limit {}",
                        issue.free_asset_net_limit
                    ),
                );
            }
        }
    }
    for (asset_name, time) in &account.latest_asset_operation_time {
        acc.require(
            *time <= now,
            format!("bucket time {time} for asset {asset_name} is past slot {now}"),
        );
        acc.require(
            account.free_asset_net_usage.contains_key(asset_name),
            format!("asset {asset_name} has a time entry but no usage entry"),
        );
    }
}

fn check_asset_invariants(
    policy: &Policy,
    asset: &AssetIssue,
    now: Slot,
    acc: &MessageAccumulator,
) {
    acc.require(asset.free_asset_net_limit >= 0, "holder free limit is negative");
    acc.require(asset.public_free_asset_net_limit >= 0, "public free limit is negative");
    acc.require(
        asset.public_free_asset_net_usage >= 0,
        format!("public pool usage {} is negative", asset.public_free_asset_net_usage),
    );
    acc.require(
        asset.public_latest_free_net_time <= now,
        format!("public pool time {} is past slot {now}", asset.public_latest_free_net_time),
    );

    if asset.public_latest_free_net_time <= now {
        let decayed = logic::increase(
            policy,
            asset.public_free_asset_net_usage,
            0,
            asset.public_latest_free_net_time,
            now,
        );
        acc.require(
            decayed <= asset.public_free_asset_net_limit + 1,
            format!(
                "decayed public pool usage {decayed} exceeds limit {}",
                asset.public_free_asset_net_limit
            ),
        );
    }
}

fn check_dynamic_property_invariants(
    policy: &Policy,
    now: Slot,
    props: &DynamicProperties,
    acc: &MessageAccumulator,
) {
    acc.require(props.total_net_limit >= 0, "total net limit is negative");
    acc.require(props.total_net_weight >= 0, "total net weight is negative");
    acc.require(props.free_net_limit >= 0, "free net limit is negative");
    acc.require(props.public_net_usage >= 0, "public pool usage is negative");
    acc.require(
        props.public_net_time <= now,
        format!("public pool time {} is past slot {now}", props.public_net_time),
    );

    if props.public_net_time <= now {
        let decayed =
            logic::increase(policy, props.public_net_usage, 0, props.public_net_time, now);
        acc.require(
            decayed <= props.public_net_limit + 1,
            format!("decayed public pool usage {decayed} exceeds limit {}", props.public_net_limit),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Slot = 1_000;

    fn policy() -> Policy {
        Policy::default()
    }

    fn props() -> DynamicProperties {
        DynamicProperties {
            total_net_weight: 1_000,
            head_block_timestamp: 3_000_000,
            ..Default::default()
        }
    }

    fn staked_account(id: u64) -> Account {
        let mut account = Account::new(Address::new_id(id));
        account.frozen_balance = 1_000_000_000;
        account
    }

    fn run_check(
        accounts: &[Account],
        assets: &[AssetIssue],
        props: &DynamicProperties,
    ) -> MessageAccumulator {
        let (_, acc) = check_state_invariants(&policy(), NOW, accounts, assets, props);
        acc
    }

    fn assert_flagged(acc: &MessageAccumulator, fragment: &str) {
        assert!(
            acc.messages().iter().any(|m| m.contains(fragment)),
            "expected a message containing '{fragment}', got {:?}",
            acc.messages()
        );
    }

    #[test]
    fn clean_state_passes() {
        let issuer = staked_account(1);
        let mut holder = Account::new(Address::new_id(2));
        holder.set_asset_net_usage("volt", 500);
        holder.set_asset_operation_time("volt", NOW);
        let mut asset = AssetIssue::new("volt", issuer.address);
        asset.free_asset_net_limit = 2_000;
        asset.public_free_asset_net_limit = 10_000;

        let (summary, acc) = check_state_invariants(
            &policy(),
            NOW,
            &[issuer, holder],
            &[asset],
            &props(),
        );

        acc.assert_empty();
        assert_eq!(summary.account_count, 2);
        assert_eq!(summary.asset_count, 1);
        assert_eq!(summary.total_frozen_balance, 1_000_000_000);
    }

    #[test]
    fn negative_usage_is_flagged() {
        let mut account = staked_account(1);
        account.net_usage = -5;

        assert_flagged(&run_check(&[account], &[], &props()), "net usage -5 is negative");
    }

    #[test]
    fn bucket_time_past_the_head_slot_is_flagged() {
        let mut account = staked_account(1);
        account.latest_consume_free_time = NOW + 1;

        assert_flagged(&run_check(&[account], &[], &props()), "past slot 1000");
    }

    #[test]
    fn mismatched_asset_buckets_are_flagged() {
        let mut account = staked_account(1);
        account.free_asset_net_usage.insert("volt".to_string(), 10);
        account.latest_asset_operation_time.insert("watt".to_string(), 5);

        let acc = run_check(&[account], &[], &props());

        assert_flagged(&acc, "asset volt has a usage entry but no time entry");
        assert_flagged(&acc, "asset watt has a time entry but no usage entry");
    }

    #[test]
    fn stake_without_system_weight_is_flagged() {
        let account = staked_account(1);
        let mut props = props();
        props.total_net_weight = 0;

        assert_flagged(&run_check(&[account], &[], &props), "total net weight is 0");
    }

    #[test]
    fn missing_issuer_account_is_flagged() {
        let asset = AssetIssue::new("volt", Address::new_id(9));

        assert_flagged(&run_check(&[], &[asset], &props()), "issuer account");
    }

    #[test]
    fn staked_usage_beyond_the_limit_is_flagged() {
        // Usage with no stake backing it decays against a zero limit.
        let mut account = Account::new(Address::new_id(1));
        account.net_usage = 10_000;
        account.latest_consume_time = NOW;

        assert_flagged(
            &run_check(&[account], &[], &props()),
            "decayed net usage 10000 exceeds limit 0",
        );
    }

    #[test]
    fn free_usage_beyond_the_limit_is_flagged() {
        let mut account = staked_account(1);
        account.free_net_usage = 6_000;
        account.latest_consume_free_time = NOW;

        assert_flagged(
            &run_check(&[account], &[], &props()),
            "decayed free net usage 6000 exceeds limit 5000",
        );
    }

    #[test]
    fn holder_asset_usage_beyond_the_limit_is_flagged() {
        let issuer = staked_account(1);
        let mut asset = AssetIssue::new("volt", issuer.address);
        asset.free_asset_net_limit = 100;
        asset.public_free_asset_net_limit = 10_000;
        let mut holder = Account::new(Address::new_id(2));
        holder.set_asset_net_usage("volt", 500);
        holder.set_asset_operation_time("volt", NOW);

        assert_flagged(
            &run_check(&[issuer, holder], &[asset], &props()),
            "decayed usage 500 for asset volt exceeds limit 100",
        );
    }

    #[test]
    fn asset_pool_usage_beyond_the_limit_is_flagged() {
        let issuer = staked_account(1);
        let mut asset = AssetIssue::new("volt", issuer.address);
        asset.public_free_asset_net_limit = 100;
        asset.public_free_asset_net_usage = 500;
        asset.public_latest_free_net_time = NOW;

        assert_flagged(
            &run_check(&[issuer], &[asset], &props()),
            "decayed public pool usage 500 exceeds limit 100",
        );
    }

    #[test]
    fn system_pool_usage_beyond_the_limit_is_flagged() {
        let mut props = props();
        props.public_net_limit = 100;
        props.public_net_usage = 500;
        props.public_net_time = NOW;

        assert_flagged(
            &run_check(&[], &[], &props),
            "decayed public pool usage 500 exceeds limit 100",
        );
    }
}
