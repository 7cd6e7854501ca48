use ampere_bandwidth_processor::testing::check_state_invariants;
use ampere_bandwidth_processor::{
    AccountUpdateParams, Contract, ContractPayload, Transaction, TransferAssetParams,
    TransferParams,
};
use ampere_chain_runtime::test_utils::MockRuntime;
use ampere_chain_runtime::{Account, Address, AssetIssue, Slot};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref SENDER: Address = Address::new_id(101);
    pub static ref RECIPIENT: Address = Address::new_id(102);
    pub static ref ISSUER: Address = Address::new_id(201);
}

pub const ASSET: &str = "volt";

pub const HEAD_SLOT: Slot = 1_000;

pub struct TestTransaction {
    pub size: u64,
    pub contracts: Vec<Contract>,
}

impl Transaction for TestTransaction {
    fn serialized_size(&self) -> u64 {
        self.size
    }

    fn contracts(&self) -> &[Contract] {
        &self.contracts
    }
}

pub fn tx(size: u64, contracts: Vec<Contract>) -> TestTransaction {
    TestTransaction { size, contracts }
}

pub fn transfer(owner: Address, to_address: Address) -> Contract {
    Contract {
        owner,
        payload: ContractPayload::Transfer(TransferParams { to_address, amount: 10 }),
    }
}

pub fn asset_transfer(owner: Address, asset: &str, to_address: Address) -> Contract {
    Contract {
        owner,
        payload: ContractPayload::TransferAsset(TransferAssetParams {
            asset_name: asset.to_string(),
            to_address,
            amount: 10,
        }),
    }
}

pub fn account_update(owner: Address) -> Contract {
    Contract {
        owner,
        payload: ContractPayload::AccountUpdate(AccountUpdateParams {
            account_name: "renamed".to_string(),
        }),
    }
}

pub fn new_runtime() -> MockRuntime {
    let mut rt = MockRuntime::new();
    // Scenario defaults: no surcharge unless a test opts in, and a public
    // pool small enough that tests can exhaust it.
    rt.policy.create_account_bandwidth_cost = 0;
    rt.dynamic_properties.public_net_limit = 1_000_000;
    rt.set_head_slot(HEAD_SLOT);
    rt.set_head_block_timestamp(HEAD_SLOT * rt.policy.block_interval_ms);
    rt
}

pub fn setup() -> (Harness, MockRuntime) {
    (Harness, new_runtime())
}

pub struct Harness;

impl Harness {
    /// Puts an account with the given stake, keeping the system weight
    /// consistent with it.
    pub fn add_account(&self, rt: &mut MockRuntime, address: Address, frozen_balance: i64) {
        let mut account = Account::new(address);
        account.frozen_balance = frozen_balance;
        rt.add_account(account);
        rt.dynamic_properties.total_net_weight += frozen_balance / rt.policy.stake_divisor;
    }

    pub fn add_asset(
        &self,
        rt: &mut MockRuntime,
        name: &str,
        owner_address: Address,
        public_free_asset_net_limit: i64,
        free_asset_net_limit: i64,
    ) {
        let mut asset = AssetIssue::new(name, owner_address);
        asset.public_free_asset_net_limit = public_free_asset_net_limit;
        asset.free_asset_net_limit = free_asset_net_limit;
        rt.add_asset_issue(asset);
    }

    pub fn account(&self, rt: &MockRuntime, address: &Address) -> Account {
        rt.accounts.get(address).cloned().expect("account should exist")
    }

    pub fn asset(&self, rt: &MockRuntime, name: &str) -> AssetIssue {
        rt.asset_issues.get(name).cloned().expect("asset should exist")
    }

    pub fn check_state(&self, rt: &MockRuntime) {
        let accounts: Vec<Account> = rt.accounts.values().cloned().collect();
        let assets: Vec<AssetIssue> = rt.asset_issues.values().cloned().collect();
        let (_, acc) = check_state_invariants(
            &rt.policy,
            rt.head_slot,
            &accounts,
            &assets,
            &rt.dynamic_properties,
        );
        acc.assert_empty();
    }
}
