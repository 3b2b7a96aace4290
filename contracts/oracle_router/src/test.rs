#![cfg(test)]
extern crate std;
use super::*;
use crate::codec::encode_report;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use soroban_sdk::{
    contract, contractimpl,
    testutils::{Address as _, Ledger},
    Env,
};

#[contract]
pub struct MockConsumer;

#[contractimpl]
impl MockConsumer {
    pub fn on_verification(
        env: Env,
        policy_id: u64,
        delay_occurred: bool,
        delay_minutes: u64,
    ) -> bool {
        let calls: u32 = env
            .storage()
            .instance()
            .get(&symbol_short!("calls"))
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&symbol_short!("calls"), &(calls + 1));
        env.storage().instance().set(
            &symbol_short!("last"),
            &(policy_id, delay_occurred, delay_minutes),
        );
        delay_occurred
    }

    pub fn calls(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&symbol_short!("calls"))
            .unwrap_or(0)
    }

    pub fn last_call(env: Env) -> Option<(u64, bool, u64)> {
        env.storage().instance().get(&symbol_short!("last"))
    }
}

struct Setup<'a> {
    env: Env,
    client: OracleRouterContractClient<'a>,
    contract_id: Address,
    admin: Address,
    consumer: MockConsumerClient<'a>,
    relay: SigningKey,
}

fn routing(env: &Env) -> RoutingParams {
    RoutingParams {
        subscription_id: 42,
        gas_limit: 300_000,
        don_id: BytesN::from_array(env, &[7u8; 32]),
    }
}

fn public_key(env: &Env, key: &SigningKey) -> BytesN<32> {
    BytesN::from_array(env, &VerifyingKey::from(key).to_bytes())
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| {
        li.timestamp = 1000;
    });

    let contract_id = env.register_contract(None, OracleRouterContract);
    let client = OracleRouterContractClient::new(&env, &contract_id);
    let consumer_id = env.register_contract(None, MockConsumer);
    let consumer = MockConsumerClient::new(&env, &consumer_id);
    let admin = Address::generate(&env);

    let mut csprng = OsRng;
    let relay = SigningKey::generate(&mut csprng);

    client.initialize(&admin, &consumer_id, &public_key(&env, &relay), &routing(&env));

    Setup {
        env,
        client,
        contract_id,
        admin,
        consumer,
        relay,
    }
}

fn sign(
    env: &Env,
    key: &SigningKey,
    contract_id: &Address,
    request_id: &BytesN<32>,
    response: &Bytes,
    error: &Bytes,
) -> BytesN<64> {
    let payload = (
        request_id.clone(),
        response.clone(),
        error.clone(),
        contract_id.clone(),
    )
        .to_xdr(env);

    let len = payload.len() as usize;
    let mut raw = std::vec![0u8; len];
    payload.copy_into_slice(&mut raw);

    BytesN::from_array(env, &key.sign(&raw).to_bytes())
}

fn payload(env: &Env) -> Bytes {
    Bytes::from_array(env, &[0xaa, 0xbb])
}

#[test]
fn test_initialize_once() {
    let s = setup();
    let config = s.client.get_config();
    assert_eq!(config.admin, s.admin);
    assert_eq!(config.consumer, s.consumer.address);
    assert_eq!(config.routing, routing(&s.env));
    assert!(!config.paused);

    let result = s.client.try_initialize(
        &s.admin,
        &s.consumer.address,
        &public_key(&s.env, &s.relay),
        &routing(&s.env),
    );
    assert_eq!(result, Err(Ok(RouterError::AlreadyInitialized)));
}

#[test]
fn test_send_request_records_entry() {
    let s = setup();

    let first = s.client.send_request(&1, &payload(&s.env));
    let second = s.client.send_request(&1, &payload(&s.env));
    assert_ne!(first, second);
    assert_eq!(s.client.get_request_count(), 2);

    let entry = s.client.get_request(&first).unwrap();
    assert_eq!(entry.policy_id, 1);
    assert_eq!(entry.sent_at, 1000);
    assert!(!entry.fulfilled);
}

#[test]
fn test_fulfill_forwards_decoded_report() {
    let s = setup();
    let request_id = s.client.send_request(&9, &payload(&s.env));

    s.env.ledger().with_mut(|li| {
        li.timestamp = 5000;
    });

    let response = encode_report(&s.env, true, 130);
    let error = Bytes::new(&s.env);
    let sig = sign(&s.env, &s.relay, &s.contract_id, &request_id, &response, &error);

    assert!(s.client.fulfill(&request_id, &response, &error, &sig));
    assert_eq!(s.consumer.calls(), 1);
    assert_eq!(s.consumer.last_call(), Some((9, true, 130)));

    let entry = s.client.get_request(&request_id).unwrap();
    assert!(entry.fulfilled);
    assert_eq!(entry.fulfilled_at, 5000);
}

#[test]
fn test_duplicate_and_unknown_fulfillment_are_ignored() {
    let s = setup();
    let request_id = s.client.send_request(&3, &payload(&s.env));
    let response = encode_report(&s.env, true, 300);
    let error = Bytes::new(&s.env);
    let sig = sign(&s.env, &s.relay, &s.contract_id, &request_id, &response, &error);

    assert!(s.client.fulfill(&request_id, &response, &error, &sig));
    assert!(!s.client.fulfill(&request_id, &response, &error, &sig));
    assert_eq!(s.consumer.calls(), 1);

    let unknown = BytesN::from_array(&s.env, &[1u8; 32]);
    let sig = sign(&s.env, &s.relay, &s.contract_id, &unknown, &response, &error);
    assert!(!s.client.fulfill(&unknown, &response, &error, &sig));
    assert_eq!(s.consumer.calls(), 1);
}

#[test]
fn test_fulfill_rejects_foreign_signature() {
    let s = setup();
    let request_id = s.client.send_request(&3, &payload(&s.env));
    let response = encode_report(&s.env, true, 300);
    let error = Bytes::new(&s.env);

    let mut csprng = OsRng;
    let impostor = SigningKey::generate(&mut csprng);
    let sig = sign(&s.env, &impostor, &s.contract_id, &request_id, &response, &error);

    assert!(s
        .client
        .try_fulfill(&request_id, &response, &error, &sig)
        .is_err());
    assert_eq!(s.consumer.calls(), 0);
    assert!(!s.client.get_request(&request_id).unwrap().fulfilled);
}

#[test]
fn test_error_or_garbage_means_no_delay() {
    let s = setup();

    let with_error = s.client.send_request(&4, &payload(&s.env));
    let response = encode_report(&s.env, true, 600);
    let error = Bytes::from_array(&s.env, &[1, 2, 3]);
    let sig = sign(&s.env, &s.relay, &s.contract_id, &with_error, &response, &error);
    assert!(s.client.fulfill(&with_error, &response, &error, &sig));
    assert_eq!(s.consumer.last_call(), Some((4, false, 0)));

    let garbage = s.client.send_request(&5, &payload(&s.env));
    let response = Bytes::from_array(&s.env, &[9, 9, 9]);
    let error = Bytes::new(&s.env);
    let sig = sign(&s.env, &s.relay, &s.contract_id, &garbage, &response, &error);
    assert!(s.client.fulfill(&garbage, &response, &error, &sig));
    assert_eq!(s.consumer.last_call(), Some((5, false, 0)));
}

#[test]
fn test_relay_key_rotation() {
    let s = setup();
    let request_id = s.client.send_request(&6, &payload(&s.env));
    let response = encode_report(&s.env, false, 0);
    let error = Bytes::new(&s.env);

    let mut csprng = OsRng;
    let rotated = SigningKey::generate(&mut csprng);
    s.client
        .set_relay_key(&s.admin, &public_key(&s.env, &rotated));

    let old_sig = sign(&s.env, &s.relay, &s.contract_id, &request_id, &response, &error);
    assert!(s
        .client
        .try_fulfill(&request_id, &response, &error, &old_sig)
        .is_err());

    let new_sig = sign(&s.env, &rotated, &s.contract_id, &request_id, &response, &error);
    assert!(s.client.fulfill(&request_id, &response, &error, &new_sig));
}

#[test]
fn test_pause_blocks_requests() {
    let s = setup();
    s.client.pause(&s.admin);
    assert_eq!(
        s.client.try_send_request(&1, &payload(&s.env)),
        Err(Ok(RouterError::Paused))
    );

    s.client.unpause(&s.admin);
    s.client.send_request(&1, &payload(&s.env));
    assert_eq!(s.client.get_request_count(), 1);
}

#[test]
fn test_prune_request() {
    let s = setup();
    let request_id = s.client.send_request(&8, &payload(&s.env));

    assert_eq!(
        s.client.try_prune_request(&request_id),
        Err(Ok(RouterError::RequestPending))
    );

    let response = encode_report(&s.env, false, 0);
    let error = Bytes::new(&s.env);
    let sig = sign(&s.env, &s.relay, &s.contract_id, &request_id, &response, &error);
    s.client.fulfill(&request_id, &response, &error, &sig);

    s.client.prune_request(&request_id);
    assert_eq!(s.client.get_request(&request_id), None);
    assert_eq!(
        s.client.try_prune_request(&request_id),
        Err(Ok(RouterError::NotFound))
    );
}

#[test]
fn test_admin_setters() {
    let s = setup();
    let stranger = Address::generate(&s.env);

    assert_eq!(
        s.client.try_pause(&stranger),
        Err(Ok(RouterError::Unauthorized))
    );

    let mut updated = routing(&s.env);
    updated.subscription_id = 77;
    s.client.set_routing(&s.admin, &updated);
    assert_eq!(s.client.get_config().routing.subscription_id, 77);

    updated.gas_limit = 0;
    assert_eq!(
        s.client.try_set_routing(&s.admin, &updated),
        Err(Ok(RouterError::InvalidRouting))
    );

    let new_consumer = Address::generate(&s.env);
    s.client.set_consumer(&s.admin, &new_consumer);
    assert_eq!(s.client.get_config().consumer, new_consumer);
}
