use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env};

/// Outbound side of the oracle boundary.
#[contractclient(name = "OracleRouterClient")]
pub trait OracleRouter {
    /// Queue a verification request for `policy_id`, returning the opaque
    /// request id the fulfillment will carry.
    fn send_request(env: Env, policy_id: u64, payload: Bytes) -> BytesN<32>;
}

#[contractclient(name = "StakingLedgerClient")]
pub trait StakingLedger {
    fn has_free_claim(env: Env, user: Address) -> bool;

    /// Consume one free-policy entitlement. Returns the remaining count.
    fn register_insurance_claim(env: Env, user: Address) -> u32;
}

#[contractclient(name = "SubsidyPoolClient")]
pub trait SubsidyPool {
    /// Transfer `premium` of the payout asset to the calling ledger.
    /// Returns false when the pool cannot cover it.
    fn fund_policy(env: Env, staker: Address, premium: i128) -> bool;
}
