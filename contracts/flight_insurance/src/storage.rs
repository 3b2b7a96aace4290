use crate::types::{Config, DataKey, InsuranceError, Policy, PolicyTier, TierConfig};
use soroban_sdk::{Address, BytesN, Env, Vec};

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const POLICY_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub(crate) const POLICY_LIFETIME_THRESHOLD: u32 = POLICY_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<Config, InsuranceError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(InsuranceError::NotInitialized)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_tier_config(env: &Env, tier: PolicyTier) -> Option<TierConfig> {
    env.storage().instance().get(&DataKey::TierConfig(tier))
}

pub fn set_tier_config(env: &Env, tier: PolicyTier, config: &TierConfig) {
    env.storage().instance().set(&DataKey::TierConfig(tier), config);
}

pub fn next_policy_id(env: &Env) -> u64 {
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::PolicyCounter)
        .unwrap_or(0);
    let next = current + 1;
    env.storage().instance().set(&DataKey::PolicyCounter, &next);
    next
}

pub fn get_policy_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::PolicyCounter)
        .unwrap_or(0)
}

pub fn get_policy(env: &Env, policy_id: u64) -> Option<Policy> {
    env.storage().persistent().get(&DataKey::Policy(policy_id))
}

pub fn set_policy(env: &Env, policy: &Policy) {
    let key = DataKey::Policy(policy.id);
    env.storage().persistent().set(&key, policy);
    bump_persistent(env, &key);

    // The uniqueness entry must live as long as the policy it guards.
    let index = DataKey::ActiveIndex(policy.holder.clone(), policy.flight_hash.clone());
    if env.storage().persistent().has(&index) {
        bump_persistent(env, &index);
    }
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, POLICY_LIFETIME_THRESHOLD, POLICY_BUMP_AMOUNT);
}

pub fn get_active_index(env: &Env, holder: &Address, flight_hash: &BytesN<32>) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::ActiveIndex(holder.clone(), flight_hash.clone()))
}

pub fn set_active_index(env: &Env, holder: &Address, flight_hash: &BytesN<32>, policy_id: u64) {
    let key = DataKey::ActiveIndex(holder.clone(), flight_hash.clone());
    env.storage().persistent().set(&key, &policy_id);
    bump_persistent(env, &key);
}

pub fn remove_active_index(env: &Env, holder: &Address, flight_hash: &BytesN<32>) {
    env.storage()
        .persistent()
        .remove(&DataKey::ActiveIndex(holder.clone(), flight_hash.clone()));
}

pub fn get_user_policies(env: &Env, user: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::UserPolicies(user.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn add_user_policy(env: &Env, user: &Address, policy_id: u64) {
    let mut policies = get_user_policies(env, user);
    policies.push_back(policy_id);
    let key = DataKey::UserPolicies(user.clone());
    env.storage().persistent().set(&key, &policies);
    bump_persistent(env, &key);
}

pub fn get_pool_balance(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::PoolBalance)
        .unwrap_or(0)
}

pub fn set_pool_balance(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::PoolBalance, &amount);
}

pub fn get_outstanding_liability(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::OutstandingLiability)
        .unwrap_or(0)
}

pub fn set_outstanding_liability(env: &Env, amount: i128) {
    env.storage()
        .instance()
        .set(&DataKey::OutstandingLiability, &amount);
}

pub fn get_active_policies(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ActivePolicies)
        .unwrap_or(0)
}

pub fn set_active_policies(env: &Env, count: u64) {
    env.storage().instance().set(&DataKey::ActivePolicies, &count);
}
