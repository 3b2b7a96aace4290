#![cfg(test)]

use super::*;
use soroban_sdk::{
    testutils::Address as _,
    token::{StellarAssetClient, TokenClient},
    Address, Env,
};

#[contract]
pub struct MockLendingPool;

#[contractimpl]
impl MockLendingPool {
    pub fn setup_pool(env: Env, token: Address, rate: u32) {
        env.storage().instance().set(&symbol_short!("token"), &token);
        env.storage().instance().set(&symbol_short!("rate"), &rate);
    }

    pub fn supply(env: Env, from: Address, amount: i128) {
        env.storage().instance().set(&symbol_short!("supplier"), &from);
        let credit = Self::balance_of(env.clone(), from.clone());
        env.storage().instance().set(&from, &(credit + amount));
    }

    pub fn withdraw(env: Env, to: Address, amount: i128) -> i128 {
        let supplier: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("supplier"))
            .unwrap();
        let credit = Self::balance_of(env.clone(), supplier.clone());
        let out = amount.min(credit);
        env.storage().instance().set(&supplier, &(credit - out));

        let token: Address = env.storage().instance().get(&symbol_short!("token")).unwrap();
        TokenClient::new(&env, &token).transfer(&env.current_contract_address(), &to, &out);
        out
    }

    pub fn balance_of(env: Env, account: Address) -> i128 {
        env.storage().instance().get(&account).unwrap_or(0)
    }

    pub fn supply_rate_bps(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&symbol_short!("rate"))
            .unwrap_or(0)
    }

    pub fn accrue(env: Env, account: Address, interest: i128) {
        let credit = Self::balance_of(env.clone(), account.clone());
        env.storage().instance().set(&account, &(credit + interest));
    }
}

struct Setup<'a> {
    env: Env,
    client: YieldAdapterContractClient<'a>,
    adapter: Address,
    owner: Address,
    token: TokenClient<'a>,
    token_admin: StellarAssetClient<'a>,
    pool: MockLendingPoolClient<'a>,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let owner = Address::generate(&env);
    let issuer = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(issuer);
    let token = TokenClient::new(&env, &sac.address());
    let token_admin = StellarAssetClient::new(&env, &sac.address());

    let pool_id = env.register_contract(None, MockLendingPool);
    let pool = MockLendingPoolClient::new(&env, &pool_id);
    pool.setup_pool(&sac.address(), &450);

    let adapter = env.register_contract(None, YieldAdapterContract);
    let client = YieldAdapterContractClient::new(&env, &adapter);
    client.initialize(&admin, &owner, &sac.address(), &pool_id);

    Setup {
        env,
        client,
        adapter,
        owner,
        token,
        token_admin,
        pool,
    }
}

fn push_and_deposit(s: &Setup, amount: i128) {
    s.token_admin.mint(&s.adapter, &amount);
    s.client.deposit(&amount);
}

#[test]
fn test_deposit_supplies_pool() {
    let s = setup();
    push_and_deposit(&s, 1_000);

    assert_eq!(s.token.balance(&s.pool.address), 1_000);
    assert_eq!(s.token.balance(&s.adapter), 0);
    assert_eq!(s.client.current_balance(), 1_000);
    assert_eq!(s.client.get_principal(), 1_000);
    assert_eq!(s.client.accrued_interest(), 0);
    assert_eq!(s.client.current_rate(), 450);
}

#[test]
fn test_withdraw_consumes_interest_first() {
    let s = setup();
    push_and_deposit(&s, 1_000);

    s.token_admin.mint(&s.pool.address, &50);
    s.pool.accrue(&s.adapter, &50);
    assert_eq!(s.client.accrued_interest(), 50);

    let recipient = Address::generate(&s.env);
    assert_eq!(s.client.withdraw(&30, &recipient), 30);
    assert_eq!(s.token.balance(&recipient), 30);
    assert_eq!(s.client.get_principal(), 1_000);
    assert_eq!(s.client.accrued_interest(), 20);

    assert_eq!(s.client.withdraw(&100, &recipient), 100);
    assert_eq!(s.client.get_principal(), 920);
    assert_eq!(s.client.accrued_interest(), 0);
}

#[test]
fn test_withdraw_is_capped_by_pool() {
    let s = setup();
    push_and_deposit(&s, 400);

    let recipient = Address::generate(&s.env);
    assert_eq!(s.client.withdraw(&1_000, &recipient), 400);
    assert_eq!(s.client.get_principal(), 0);
    assert_eq!(s.client.current_balance(), 0);
}

#[test]
fn test_rejects_bad_input() {
    let s = setup();
    assert_eq!(s.client.try_deposit(&0), Err(Ok(AdapterError::InvalidAmount)));

    let recipient = Address::generate(&s.env);
    assert_eq!(
        s.client.try_withdraw(&-5, &recipient),
        Err(Ok(AdapterError::InvalidAmount))
    );

    let other = Address::generate(&s.env);
    assert_eq!(
        s.client
            .try_initialize(&other, &s.owner, &s.token.address, &s.pool.address),
        Err(Ok(AdapterError::AlreadyInitialized))
    );
}

#[test]
fn test_deposit_requires_owner() {
    let s = setup();
    s.token_admin.mint(&s.adapter, &100);
    s.env.set_auths(&[]);
    assert!(s.client.try_deposit(&100).is_err());
}
