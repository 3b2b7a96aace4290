use crate::types::{Policy, PolicyTier};
use soroban_sdk::{symbol_short, Address, BytesN, Env};

pub fn policy_bought(env: &Env, policy: &Policy) {
    env.events().publish(
        (symbol_short!("policy"), symbol_short!("bought"), policy.holder.clone()),
        (policy.id, policy.tier, policy.premium, policy.subsidized),
    );
}

pub fn verification_requested(env: &Env, policy_id: u64, request_id: &BytesN<32>) {
    env.events().publish(
        (symbol_short!("policy"), symbol_short!("verify")),
        (policy_id, request_id.clone()),
    );
}

pub fn policy_paid(env: &Env, policy: &Policy) {
    env.events().publish(
        (symbol_short!("policy"), symbol_short!("paid"), policy.holder.clone()),
        (policy.id, policy.payout, policy.reported_delay_minutes),
    );
}

pub fn policy_expired(env: &Env, policy_id: u64) {
    env.events()
        .publish((symbol_short!("policy"), symbol_short!("expired")), policy_id);
}

pub fn tier_updated(env: &Env, tier: PolicyTier, active: bool) {
    env.events()
        .publish((symbol_short!("tier"), symbol_short!("updated")), (tier, active));
}

pub fn pool_changed(env: &Env, by: &Address, delta: i128, balance: i128) {
    env.events().publish(
        (symbol_short!("pool"), symbol_short!("changed"), by.clone()),
        (delta, balance),
    );
}
