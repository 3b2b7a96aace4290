#![cfg(test)]

use super::*;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, Env,
};

fn setup<'a>() -> (Env, TierBadgeContractClient<'a>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths(); // minter and admin calls pass without real signatures

    let contract_id = env.register_contract(None, TierBadgeContract);
    let client = TierBadgeContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let minter = Address::generate(&env);
    client.initialize(&admin, &minter);

    (env, client, admin, minter)
}

#[test]
fn test_badge_lifecycle() {
    let (env, client, _, _) = setup();
    let user = Address::generate(&env);

    env.ledger().with_mut(|li| li.timestamp = 100);
    let token_id = client.issue(&user, &1);

    assert_eq!(token_id, 1u32);
    assert_eq!(client.total_supply(), 1u32);
    assert_eq!(client.owner_of(&token_id), user);
    assert_eq!(client.badge_of(&user), Some(token_id));

    // Upgrade keeps the same token.
    env.ledger().with_mut(|li| li.timestamp = 200);
    assert_eq!(client.issue(&user, &3), token_id);

    let badge = client.get_badge(&token_id);
    assert_eq!(badge.tier, 3);
    assert_eq!(badge.issued_at, 100);
    assert_eq!(badge.upgraded_at, 200);
    assert_eq!(client.total_supply(), 1u32);

    // Lower tier is a no-op.
    env.ledger().with_mut(|li| li.timestamp = 300);
    client.issue(&user, &2);
    let badge = client.get_badge(&token_id);
    assert_eq!(badge.tier, 3);
    assert_eq!(badge.upgraded_at, 200);
}

#[test]
fn test_one_badge_per_owner() {
    let (env, client, _, _) = setup();
    let a = Address::generate(&env);
    let b = Address::generate(&env);

    assert_eq!(client.issue(&a, &1), 1);
    assert_eq!(client.issue(&b, &2), 2);
    assert_eq!(client.issue(&a, &2), 1);
    assert_eq!(client.total_supply(), 2);
    assert_eq!(client.owner_of(&2), b);
}

#[test]
fn test_errors() {
    let (env, client, admin, minter) = setup();
    let user = Address::generate(&env);

    assert_eq!(client.try_issue(&user, &4), Err(Ok(BadgeError::InvalidTier)));
    assert_eq!(client.try_get_badge(&9), Err(Ok(BadgeError::NotFound)));
    assert_eq!(client.try_owner_of(&9), Err(Ok(BadgeError::NotFound)));
    assert_eq!(
        client.try_initialize(&admin, &minter),
        Err(Ok(BadgeError::AlreadyInitialized))
    );
    assert_eq!(
        client.try_set_minter(&user, &user),
        Err(Ok(BadgeError::Unauthorized))
    );
}

#[test]
fn test_issue_requires_minter() {
    let (env, client, admin, _) = setup();
    let user = Address::generate(&env);

    let new_minter = Address::generate(&env);
    client.set_minter(&admin, &new_minter);

    env.set_auths(&[]);
    assert!(client.try_issue(&user, &1).is_err());
    assert_eq!(client.badge_of(&user), None);
}
