use crate::types::{Config, RequestEntry, RouterError};
use soroban_sdk::{symbol_short, BytesN, Env};

const DAY_IN_LEDGERS: u32 = 17_280;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const LIFETIME_THRESHOLD: u32 = BUMP_AMOUNT - DAY_IN_LEDGERS;

pub struct Storage;

impl Storage {
    pub fn has_config(env: &Env) -> bool {
        env.storage().instance().has(&symbol_short!("config"))
    }

    pub fn set_config(env: &Env, config: &Config) {
        env.storage()
            .instance()
            .set(&symbol_short!("config"), config);
    }

    pub fn get_config(env: &Env) -> Result<Config, RouterError> {
        env.storage()
            .instance()
            .get(&symbol_short!("config"))
            .ok_or(RouterError::NotInitialized)
    }

    pub fn next_nonce(env: &Env) -> u64 {
        let nonce: u64 = env
            .storage()
            .instance()
            .get(&symbol_short!("nonce"))
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&symbol_short!("nonce"), &(nonce + 1));
        nonce
    }

    pub fn request_count(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&symbol_short!("nonce"))
            .unwrap_or(0)
    }

    pub fn set_request(env: &Env, entry: &RequestEntry) {
        let key = (symbol_short!("req"), entry.request_id.clone());
        env.storage().persistent().set(&key, entry);
        env.storage()
            .persistent()
            .extend_ttl(&key, LIFETIME_THRESHOLD, BUMP_AMOUNT);
    }

    pub fn get_request(env: &Env, request_id: &BytesN<32>) -> Option<RequestEntry> {
        env.storage()
            .persistent()
            .get(&(symbol_short!("req"), request_id.clone()))
    }

    pub fn remove_request(env: &Env, request_id: &BytesN<32>) {
        env.storage()
            .persistent()
            .remove(&(symbol_short!("req"), request_id.clone()));
    }

    pub fn bump(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(LIFETIME_THRESHOLD, BUMP_AMOUNT);
    }
}
